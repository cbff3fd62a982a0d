use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use skylane_core::BookingError;
use skylane_inventory::CatalogError;

#[derive(Debug)]
pub enum AppError {
    Booking(BookingError),
    Catalog(CatalogError),
    AuthenticationError(String),
    Internal(anyhow::Error),
}

impl AppError {
    pub fn internal<E: Into<anyhow::Error>>(err: E) -> Self {
        Self::Internal(err.into())
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        Self::Booking(err)
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        Self::Catalog(err)
    }
}

fn booking_status(err: &BookingError) -> StatusCode {
    match err {
        BookingError::Validation(_) => StatusCode::BAD_REQUEST,
        BookingError::NotFound(_) => StatusCode::NOT_FOUND,
        BookingError::InsufficientCapacity { .. } => StatusCode::CONFLICT,
        BookingError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        BookingError::CancellationWindowExpired { .. } => StatusCode::CONFLICT,
        BookingError::AlreadyCancelled => StatusCode::CONFLICT,
        BookingError::DuplicatePnr(_) => StatusCode::CONFLICT,
        BookingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn catalog_status(err: &CatalogError) -> StatusCode {
    match err {
        CatalogError::DuplicateFlight(_) => StatusCode::CONFLICT,
        CatalogError::Validation(_) => StatusCode::BAD_REQUEST,
        CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
        CatalogError::InsufficientSeats { .. } => StatusCode::CONFLICT,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Booking(err) => {
                let status = booking_status(&err);
                if status == StatusCode::INTERNAL_SERVER_ERROR {
                    tracing::error!("Internal Server Error: {}", err);
                    (status, "Internal Server Error".to_string())
                } else {
                    (status, err.to_string())
                }
            }
            AppError::Catalog(err) => (catalog_status(&err), err.to_string()),
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Internal(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_errors_map_to_expected_statuses() {
        assert_eq!(
            booking_status(&BookingError::Validation("bad".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            booking_status(&BookingError::NotFound("flight x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            booking_status(&BookingError::InsufficientCapacity {
                requested: 10,
                available: 5
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            booking_status(&BookingError::ServiceUnavailable),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            booking_status(&BookingError::CancellationWindowExpired { cutoff_hours: 24 }),
            StatusCode::CONFLICT
        );
    }
}
