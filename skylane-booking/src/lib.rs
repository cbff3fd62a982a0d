pub mod breaker;
pub mod orchestrator;

pub use breaker::{BreakerConfig, CircuitBreaker, CircuitState};
pub use orchestrator::{BookingOrchestrator, CancellationPolicy};
