use async_trait::async_trait;
use chrono::{DateTime, Utc};
use skylane_core::model::{NewReservation, Reservation, ReservationStatus};
use skylane_core::store::{ReservationStore, StoreError};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::collections::HashSet;
use uuid::Uuid;

/// Postgres-backed reservation store.
///
/// The `pnr` column carries a unique index; a generator collision surfaces
/// here as `DuplicatePnr` rather than being pre-checked.
pub struct PgReservationStore {
    pool: PgPool,
}

impl PgReservationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_row(row: &PgRow) -> Result<Reservation, StoreError> {
    let status: String = row
        .try_get("status")
        .map_err(|e| StoreError::Backend(e.to_string()))?;
    let status: ReservationStatus = status.parse().map_err(StoreError::Backend)?;

    let get_str = |name: &str| -> Result<String, StoreError> {
        row.try_get(name)
            .map_err(|e| StoreError::Backend(e.to_string()))
    };
    let get_i32 = |name: &str| -> Result<i32, StoreError> {
        row.try_get(name)
            .map_err(|e| StoreError::Backend(e.to_string()))
    };
    let get_uuid = |name: &str| -> Result<Uuid, StoreError> {
        row.try_get(name)
            .map_err(|e| StoreError::Backend(e.to_string()))
    };
    let get_time = |name: &str| -> Result<DateTime<Utc>, StoreError> {
        row.try_get(name)
            .map_err(|e| StoreError::Backend(e.to_string()))
    };

    Ok(Reservation {
        id: get_uuid("id")?,
        flight_id: get_uuid("flight_id")?,
        passenger_name: get_str("passenger_name")?,
        age: get_i32("age")?,
        gender: get_str("gender")?,
        meal: get_str("meal")?,
        email: get_str("email")?,
        seat_number: get_str("seat_number")?,
        ticket_count: get_i32("ticket_count")?,
        pnr: get_str("pnr")?,
        status,
        created_at: get_time("created_at")?,
        updated_at: get_time("updated_at")?,
    })
}

fn map_sqlx_error(err: sqlx::Error, pnr: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::DuplicatePnr(pnr.to_string());
        }
    }
    StoreError::Backend(err.to_string())
}

#[async_trait]
impl ReservationStore for PgReservationStore {
    async fn insert(&self, reservation: NewReservation) -> Result<Reservation, StoreError> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO reservations
                (id, flight_id, passenger_name, age, gender, meal, email,
                 seat_number, ticket_count, pnr, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(id)
        .bind(reservation.flight_id)
        .bind(&reservation.passenger_name)
        .bind(reservation.age)
        .bind(&reservation.gender)
        .bind(&reservation.meal)
        .bind(&reservation.email)
        .bind(&reservation.seat_number)
        .bind(reservation.ticket_count)
        .bind(&reservation.pnr)
        .bind(reservation.status.to_string())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, &reservation.pnr))?;

        Ok(Reservation {
            id,
            flight_id: reservation.flight_id,
            passenger_name: reservation.passenger_name,
            age: reservation.age,
            gender: reservation.gender,
            meal: reservation.meal,
            email: reservation.email,
            seat_number: reservation.seat_number,
            ticket_count: reservation.ticket_count,
            pnr: reservation.pnr,
            status: reservation.status,
            created_at: now,
            updated_at: now,
        })
    }

    async fn update(&self, reservation: &Reservation) -> Result<Reservation, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE reservations SET status = $1, updated_at = $2 WHERE id = $3
            "#,
        )
        .bind(reservation.status.to_string())
        .bind(reservation.updated_at)
        .bind(reservation.id)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(reservation.id));
        }
        Ok(reservation.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Reservation>, StoreError> {
        let row = sqlx::query("SELECT * FROM reservations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        row.as_ref().map(map_row).transpose()
    }

    async fn find_by_pnr(&self, pnr: &str) -> Result<Option<Reservation>, StoreError> {
        let row = sqlx::query("SELECT * FROM reservations WHERE pnr = $1")
            .bind(pnr)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        row.as_ref().map(map_row).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Vec<Reservation>, StoreError> {
        let rows =
            sqlx::query("SELECT * FROM reservations WHERE email = $1 ORDER BY created_at ASC")
                .bind(email)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?;

        rows.iter().map(map_row).collect()
    }

    async fn booked_seats(&self, flight_id: Uuid) -> Result<HashSet<String>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT seat_number FROM reservations
            WHERE flight_id = $1 AND status = 'BOOKED' AND seat_number <> ''
            "#,
        )
        .bind(flight_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        rows.iter()
            .map(|row| {
                row.try_get::<String, _>("seat_number")
                    .map_err(|e| StoreError::Backend(e.to_string()))
            })
            .collect()
    }
}
