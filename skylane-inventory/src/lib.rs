pub mod catalog;
pub mod client;

pub use catalog::{AddFlightRequest, CatalogError, FlightCatalog, SearchFlightRequest};
pub use client::LocalInventoryClient;
