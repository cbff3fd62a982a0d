use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Durable unit of work for the booking workflow.
///
/// Everything except `status` and `updated_at` is immutable after creation.
/// The PNR is generated once and never regenerated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub flight_id: Uuid,
    pub passenger_name: String,
    pub age: i32,
    pub gender: String,
    pub meal: String,
    pub email: String,
    pub seat_number: String,
    pub ticket_count: i32,
    pub pnr: String,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Pre-insert shape of a reservation: the store assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub flight_id: Uuid,
    pub passenger_name: String,
    pub age: i32,
    pub gender: String,
    pub meal: String,
    pub email: String,
    pub seat_number: String,
    pub ticket_count: i32,
    pub pnr: String,
    pub status: ReservationStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReservationStatus {
    BOOKED,
    CANCELLED,
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReservationStatus::BOOKED => write!(f, "BOOKED"),
            ReservationStatus::CANCELLED => write!(f, "CANCELLED"),
        }
    }
}

impl std::str::FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BOOKED" => Ok(ReservationStatus::BOOKED),
            "CANCELLED" => Ok(ReservationStatus::CANCELLED),
            other => Err(format!("unknown reservation status: {}", other)),
        }
    }
}

/// Snapshot of a flight as reported by the inventory authority.
///
/// `seats_available` is a point-in-time read; it can be stale by the time a
/// decrement executes, so it is never treated as authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flight {
    pub id: Uuid,
    pub flight_number: String,
    pub from_city: String,
    pub to_city: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub cost_amount: i32,
    pub cost_currency: String,
    pub seats_available: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    pub flight_id: Uuid,
    pub passenger_name: String,
    pub age: i32,
    pub gender: String,
    pub meal: String,
    pub email: String,
    pub seat_number: String,
    pub ticket_count: i32,
}

impl BookingRequest {
    /// Shape checks performed before any remote call is attempted.
    pub fn validate(&self) -> Result<(), String> {
        if self.ticket_count < 1 {
            return Err("ticket count must be at least 1".to_string());
        }
        if self.passenger_name.trim().is_empty() {
            return Err("passenger name is required".to_string());
        }
        if self.email.trim().is_empty() {
            return Err("contact email is required".to_string());
        }
        if self.seat_number.trim().is_empty() {
            return Err("seat number is required".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> BookingRequest {
        BookingRequest {
            flight_id: Uuid::new_v4(),
            passenger_name: "Ada Lovelace".to_string(),
            age: 36,
            gender: "F".to_string(),
            meal: "VEG".to_string(),
            email: "ada@example.com".to_string(),
            seat_number: "12A".to_string(),
            ticket_count: 1,
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn zero_tickets_rejected() {
        let mut req = request();
        req.ticket_count = 0;
        assert!(req.validate().is_err());
    }

    #[test]
    fn blank_seat_rejected() {
        let mut req = request();
        req.seat_number = "  ".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn status_round_trips_through_strings() {
        let parsed: ReservationStatus = "CANCELLED".parse().unwrap();
        assert_eq!(parsed, ReservationStatus::CANCELLED);
        assert_eq!(ReservationStatus::BOOKED.to_string(), "BOOKED");
        assert!("EXPIRED".parse::<ReservationStatus>().is_err());
    }
}
