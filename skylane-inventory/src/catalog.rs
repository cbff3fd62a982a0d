use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use skylane_core::model::Flight;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct AddFlightRequest {
    pub flight_number: String,
    pub from_city: String,
    pub to_city: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub cost_amount: i32,
    pub cost_currency: String,
    pub seats_available: i32,
}

#[derive(Debug, Deserialize)]
pub struct SearchFlightRequest {
    pub from_city: String,
    pub to_city: String,
    pub travel_date: NaiveDate,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("flight already exists: {0}")]
    DuplicateFlight(String),

    #[error("invalid flight: {0}")]
    Validation(String),

    #[error("flight not found: {0}")]
    NotFound(Uuid),

    #[error("not enough seats available: requested {requested}, available {available}")]
    InsufficientSeats { requested: i32, available: i32 },
}

/// Authoritative owner of per-flight seat counts.
///
/// `reduce_seats` is the only place seat-count correctness is enforced:
/// concurrent bookings race on their snapshot reads, and the floor check
/// here is what rejects over-subscription.
pub struct FlightCatalog {
    flights: RwLock<HashMap<Uuid, Flight>>,
}

impl FlightCatalog {
    pub fn new() -> Self {
        Self {
            flights: RwLock::new(HashMap::new()),
        }
    }

    pub async fn add_flight(&self, req: AddFlightRequest) -> Result<Flight, CatalogError> {
        if req.from_city.eq_ignore_ascii_case(&req.to_city) {
            return Err(CatalogError::Validation(
                "from city and to city cannot be the same".to_string(),
            ));
        }
        if req.departure_time < Utc::now() {
            return Err(CatalogError::Validation(
                "departure time cannot be in the past".to_string(),
            ));
        }
        if req.arrival_time < req.departure_time {
            return Err(CatalogError::Validation(
                "arrival time must be after departure time".to_string(),
            ));
        }
        if req.seats_available < 0 {
            return Err(CatalogError::Validation(
                "seat count cannot be negative".to_string(),
            ));
        }

        let mut flights = self.flights.write().await;
        if flights
            .values()
            .any(|f| f.flight_number == req.flight_number)
        {
            return Err(CatalogError::DuplicateFlight(req.flight_number));
        }

        let flight = Flight {
            id: Uuid::new_v4(),
            flight_number: req.flight_number,
            from_city: req.from_city,
            to_city: req.to_city,
            departure_time: req.departure_time,
            arrival_time: req.arrival_time,
            cost_amount: req.cost_amount,
            cost_currency: req.cost_currency,
            seats_available: req.seats_available,
        };
        flights.insert(flight.id, flight.clone());
        info!("Flight {} added: {}", flight.flight_number, flight.id);
        Ok(flight)
    }

    pub async fn flight(&self, id: Uuid) -> Result<Flight, CatalogError> {
        self.flights
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(CatalogError::NotFound(id))
    }

    pub async fn all_flights(&self) -> Vec<Flight> {
        let mut all: Vec<Flight> = self.flights.read().await.values().cloned().collect();
        all.sort_by_key(|f| f.departure_time);
        all
    }

    /// Case-insensitive city-pair search, restricted to departures within the
    /// travel day.
    pub async fn search(&self, req: &SearchFlightRequest) -> Vec<Flight> {
        let mut matches: Vec<Flight> = self
            .flights
            .read()
            .await
            .values()
            .filter(|f| {
                f.from_city.eq_ignore_ascii_case(&req.from_city)
                    && f.to_city.eq_ignore_ascii_case(&req.to_city)
                    && f.departure_time.date_naive() == req.travel_date
            })
            .cloned()
            .collect();
        matches.sort_by_key(|f| f.departure_time);
        matches
    }

    /// Decrement availability. Fails, never clamps, when the request exceeds
    /// the remaining seats.
    pub async fn reduce_seats(&self, id: Uuid, count: i32) -> Result<(), CatalogError> {
        let mut flights = self.flights.write().await;
        let flight = flights.get_mut(&id).ok_or(CatalogError::NotFound(id))?;

        if flight.seats_available < count {
            return Err(CatalogError::InsufficientSeats {
                requested: count,
                available: flight.seats_available,
            });
        }

        flight.seats_available -= count;
        info!(
            "Flight {} seats reduced by {}: {} remaining",
            flight.flight_number, count, flight.seats_available
        );
        Ok(())
    }
}

impl Default for FlightCatalog {
    fn default() -> Self {
        Self::new()
    }
}
