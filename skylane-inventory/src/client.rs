use async_trait::async_trait;
use skylane_core::inventory::{InventoryClient, InventoryError};
use skylane_core::model::Flight;
use std::sync::Arc;
use uuid::Uuid;

use crate::catalog::{CatalogError, FlightCatalog};

/// In-process adapter from the flight catalog to the inventory client seam.
///
/// Deployments that split the catalog into its own service swap this for a
/// network client; the orchestrator only ever sees the trait.
pub struct LocalInventoryClient {
    catalog: Arc<FlightCatalog>,
}

impl LocalInventoryClient {
    pub fn new(catalog: Arc<FlightCatalog>) -> Self {
        Self { catalog }
    }
}

impl From<CatalogError> for InventoryError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(id) => InventoryError::FlightNotFound(id),
            CatalogError::InsufficientSeats {
                requested,
                available,
            } => InventoryError::InsufficientSeats {
                requested,
                available,
            },
            other => InventoryError::Unavailable(other.to_string()),
        }
    }
}

#[async_trait]
impl InventoryClient for LocalInventoryClient {
    async fn flight_by_id(&self, flight_id: Uuid) -> Result<Flight, InventoryError> {
        Ok(self.catalog.flight(flight_id).await?)
    }

    async fn decrement_seats(&self, flight_id: Uuid, count: i32) -> Result<(), InventoryError> {
        Ok(self.catalog.reduce_seats(flight_id, count).await?)
    }
}
