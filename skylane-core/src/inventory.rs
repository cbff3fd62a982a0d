use async_trait::async_trait;
use uuid::Uuid;

use crate::model::Flight;

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    /// The authority answered and the flight does not exist. This is a
    /// business response, not a transport failure.
    #[error("flight not found: {0}")]
    FlightNotFound(Uuid),

    #[error("not enough seats available: requested {requested}, available {available}")]
    InsufficientSeats { requested: i32, available: i32 },

    /// Transport-level failure: timeout, connection refused, malformed
    /// response. Counted against the circuit breaker.
    #[error("inventory authority unreachable: {0}")]
    Unavailable(String),
}

/// Client for the remote owner of per-flight seat counts.
///
/// Both operations are synchronous request/response from the caller's point
/// of view; the circuit breaker may short-circuit them before any network
/// attempt.
#[async_trait]
pub trait InventoryClient: Send + Sync {
    async fn flight_by_id(&self, flight_id: Uuid) -> Result<Flight, InventoryError>;

    /// Must fail, not clamp, when `count` exceeds current availability.
    async fn decrement_seats(&self, flight_id: Uuid, count: i32) -> Result<(), InventoryError>;
}
