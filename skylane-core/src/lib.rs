pub mod inventory;
pub mod model;
pub mod notify;
pub mod pnr;
pub mod store;

use crate::store::StoreError;

/// Request-terminal error taxonomy for the booking workflows.
///
/// Business rejections are tagged variants rather than opaque failures so
/// callers have to handle each case explicitly. Nothing here is retried by
/// the orchestrator; the circuit breaker's probe cycle is the only built-in
/// resilience.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("not enough seats available: requested {requested}, available {available}")]
    InsufficientCapacity { requested: i32, available: i32 },

    /// Inventory authority unreachable or circuit open. Always surfaced as
    /// this single kind, masking the underlying cause.
    #[error("flight inventory service unavailable")]
    ServiceUnavailable,

    #[error("cannot cancel less than {cutoff_hours} hours before departure")]
    CancellationWindowExpired { cutoff_hours: i64 },

    #[error("reservation is already cancelled")]
    AlreadyCancelled,

    #[error("locator collision: PNR {0} already exists")]
    DuplicatePnr(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicatePnr(pnr) => BookingError::DuplicatePnr(pnr),
            StoreError::NotFound(id) => BookingError::NotFound(format!("reservation {}", id)),
            StoreError::Backend(msg) => BookingError::Internal(msg),
        }
    }
}

pub type BookingResult<T> = Result<T, BookingError>;
