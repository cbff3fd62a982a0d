use async_trait::async_trait;
use std::collections::HashSet;
use uuid::Uuid;

use crate::model::{NewReservation, Reservation};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("PNR already exists: {0}")]
    DuplicatePnr(String),

    #[error("reservation not found: {0}")]
    NotFound(Uuid),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Durable table of reservation records, owned exclusively by the booking
/// orchestrator.
///
/// Writes here have no transactional coupling to the inventory authority:
/// the insert and the remote seat decrement are independent operations with
/// no two-phase commit.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// First save: assigns the surrogate id and timestamps, enforces PNR
    /// uniqueness.
    async fn insert(&self, reservation: NewReservation) -> Result<Reservation, StoreError>;

    /// Subsequent save: status transitions only.
    async fn update(&self, reservation: &Reservation) -> Result<Reservation, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Reservation>, StoreError>;

    async fn find_by_pnr(&self, pnr: &str) -> Result<Option<Reservation>, StoreError>;

    /// All reservations for a contact email, in insertion order.
    async fn find_by_email(&self, email: &str) -> Result<Vec<Reservation>, StoreError>;

    /// Seat labels currently BOOKED on a flight. Advisory: the booking
    /// workflow does not consult this before persisting.
    async fn booked_seats(&self, flight_id: Uuid) -> Result<HashSet<String>, StoreError>;
}
