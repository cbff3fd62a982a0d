use skylane_booking::BookingOrchestrator;
use skylane_inventory::FlightCatalog;
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<BookingOrchestrator>,
    pub catalog: Arc<FlightCatalog>,
    pub auth: AuthConfig,
}
