use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use skylane_core::model::{BookingRequest, Reservation};
use tracing::info;
use uuid::Uuid;

use crate::auth::verify_token;
use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", post(create_booking))
        .route("/v1/bookings/{id}", get(booking_by_id))
        .route("/v1/bookings/{id}/cancel", post(cancel_booking))
        .route("/v1/bookings/pnr/{pnr}", get(booking_by_pnr))
        .route("/v1/bookings/history/{email}", get(booking_history))
}

async fn create_booking(
    State(state): State<AppState>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
    Json(req): Json<BookingRequest>,
) -> Result<Json<Reservation>, AppError> {
    let claims = verify_token(&state, &bearer)?;

    let reservation = state.orchestrator.book_ticket(req).await?;
    info!(
        "Booking {} created for {} (PNR {})",
        reservation.id, claims.sub, reservation.pnr
    );
    Ok(Json(reservation))
}

async fn cancel_booking(
    State(state): State<AppState>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Reservation>, AppError> {
    verify_token(&state, &bearer)?;

    let reservation = state.orchestrator.cancel_booking(id).await?;
    info!("Booking {} cancelled", reservation.id);
    Ok(Json(reservation))
}

async fn booking_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Reservation>, AppError> {
    Ok(Json(state.orchestrator.reservation_by_id(id).await?))
}

async fn booking_by_pnr(
    State(state): State<AppState>,
    Path(pnr): Path<String>,
) -> Result<Json<Reservation>, AppError> {
    Ok(Json(state.orchestrator.reservation_by_pnr(&pnr).await?))
}

async fn booking_history(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<Reservation>>, AppError> {
    Ok(Json(state.orchestrator.reservations_by_email(&email).await?))
}
