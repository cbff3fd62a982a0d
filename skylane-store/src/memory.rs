use async_trait::async_trait;
use chrono::Utc;
use skylane_core::model::{NewReservation, Reservation, ReservationStatus};
use skylane_core::store::{ReservationStore, StoreError};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

struct Inner {
    rows: HashMap<Uuid, Reservation>,
    // insertion order, for find_by_email
    order: Vec<Uuid>,
    pnr_index: HashMap<String, Uuid>,
}

/// In-memory reservation store for tests and development wiring.
pub struct InMemoryReservationStore {
    inner: RwLock<Inner>,
}

impl InMemoryReservationStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                rows: HashMap::new(),
                order: Vec::new(),
                pnr_index: HashMap::new(),
            }),
        }
    }
}

impl Default for InMemoryReservationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReservationStore for InMemoryReservationStore {
    async fn insert(&self, reservation: NewReservation) -> Result<Reservation, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.pnr_index.contains_key(&reservation.pnr) {
            return Err(StoreError::DuplicatePnr(reservation.pnr));
        }

        let now = Utc::now();
        let stored = Reservation {
            id: Uuid::new_v4(),
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
        };

        inner.pnr_index.insert(stored.pnr.clone(), stored.id);
        inner.order.push(stored.id);
        inner.rows.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, reservation: &Reservation) -> Result<Reservation, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.rows.contains_key(&reservation.id) {
            return Err(StoreError::NotFound(reservation.id));
        }
        inner.rows.insert(reservation.id, reservation.clone());
        Ok(reservation.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Reservation>, StoreError> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn find_by_pnr(&self, pnr: &str) -> Result<Option<Reservation>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .pnr_index
            .get(pnr)
            .and_then(|id| inner.rows.get(id))
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Vec<Reservation>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.rows.get(id))
            .filter(|r| r.email == email)
            .cloned()
            .collect())
    }

    async fn booked_seats(&self, flight_id: Uuid) -> Result<HashSet<String>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .rows
            .values()
            .filter(|r| {
                r.flight_id == flight_id
                    && r.status == ReservationStatus::BOOKED
                    && !r.seat_number.is_empty()
            })
            .map(|r| r.seat_number.clone())
            .collect())
    }
}
