use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use serde_json::json;
use skylane_core::model::Flight;
use skylane_core::BookingError;
use skylane_inventory::{AddFlightRequest, SearchFlightRequest};
use uuid::Uuid;

use crate::auth::verify_token;
use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/flights", post(add_flight).get(list_flights))
        .route("/v1/flights/search", post(search_flights))
        .route("/v1/flights/{id}", get(flight_by_id))
        .route("/v1/flights/{id}/booked-seats", get(booked_seats))
}

async fn add_flight(
    State(state): State<AppState>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
    Json(req): Json<AddFlightRequest>,
) -> Result<Json<Flight>, AppError> {
    verify_token(&state, &bearer)?;
    let flight = state.catalog.add_flight(req).await?;
    Ok(Json(flight))
}

async fn list_flights(State(state): State<AppState>) -> Json<Vec<Flight>> {
    Json(state.catalog.all_flights().await)
}

async fn flight_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Flight>, AppError> {
    let flight = state.catalog.flight(id).await?;
    Ok(Json(flight))
}

async fn search_flights(
    State(state): State<AppState>,
    Json(req): Json<SearchFlightRequest>,
) -> Result<Json<Vec<Flight>>, AppError> {
    let flights = state.catalog.search(&req).await;
    if flights.is_empty() {
        return Err(BookingError::NotFound(format!(
            "flights from {} to {} on {}",
            req.from_city, req.to_city, req.travel_date
        ))
        .into());
    }
    Ok(Json(flights))
}

async fn booked_seats(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let mut seats: Vec<String> = state
        .orchestrator
        .booked_seats(id)
        .await?
        .into_iter()
        .collect();
    seats.sort();
    Ok(Json(json!({ "flight_id": id, "booked_seats": seats })))
}
