use chrono::Utc;
use skylane_core::inventory::{InventoryClient, InventoryError};
use skylane_core::model::{BookingRequest, Flight, NewReservation, Reservation, ReservationStatus};
use skylane_core::notify::NotificationChannel;
use skylane_core::pnr;
use skylane_core::store::ReservationStore;
use skylane_core::{BookingError, BookingResult};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::breaker::CircuitBreaker;

/// Time-to-departure gate for cancellations, checked against inventory
/// state at cancellation time, not booking time.
#[derive(Debug, Clone)]
pub struct CancellationPolicy {
    pub cutoff_hours: i64,
}

impl Default for CancellationPolicy {
    fn default() -> Self {
        Self { cutoff_hours: 24 }
    }
}

/// The booking workflow engine.
///
/// Stateless per request: every booking or cancellation runs as an
/// independent unit of work against the shared reservation store and the
/// remote inventory authority. The store write and the remote seat
/// decrement are NOT atomic; the reservation is persisted first so that a
/// partial failure leaves a held seat rather than an unbacked decrement.
pub struct BookingOrchestrator {
    store: Arc<dyn ReservationStore>,
    inventory: Arc<dyn InventoryClient>,
    notifier: Arc<dyn NotificationChannel>,
    breaker: Arc<CircuitBreaker>,
    policy: CancellationPolicy,
}

impl BookingOrchestrator {
    pub fn new(
        store: Arc<dyn ReservationStore>,
        inventory: Arc<dyn InventoryClient>,
        notifier: Arc<dyn NotificationChannel>,
        breaker: Arc<CircuitBreaker>,
        policy: CancellationPolicy,
    ) -> Self {
        Self {
            store,
            inventory,
            notifier,
            breaker,
            policy,
        }
    }

    pub async fn book_ticket(&self, request: BookingRequest) -> BookingResult<Reservation> {
        request.validate().map_err(BookingError::Validation)?;

        let flight = self.guarded_flight_lookup(request.flight_id).await?;

        // Advisory snapshot check. The authority's own decrement is what
        // ultimately rejects over-subscription under concurrency.
        if request.ticket_count > flight.seats_available {
            return Err(BookingError::InsufficientCapacity {
                requested: request.ticket_count,
                available: flight.seats_available,
            });
        }

        let reservation = self
            .store
            .insert(NewReservation {
                flight_id: request.flight_id,
                passenger_name: request.passenger_name.clone(),
                age: request.age,
                gender: request.gender.clone(),
                meal: request.meal.clone(),
                email: request.email.clone(),
                seat_number: request.seat_number.clone(),
                ticket_count: request.ticket_count,
                pnr: pnr::generate(),
                status: ReservationStatus::BOOKED,
            })
            .await?;

        // Past this point the booking is reported successful: a failed
        // decrement or notification leaves a documented inconsistency
        // window, it does not roll the reservation back.
        if let Err(err) = self
            .guarded_decrement(request.flight_id, request.ticket_count)
            .await
        {
            warn!(
                "Seat decrement failed after reservation {} was persisted: {}",
                reservation.id, err
            );
        }

        let payload = format!(
            "Booking confirmed!\nPNR: {}\nPassenger: {}\nSeat: {}\nEmail: {}",
            reservation.pnr, reservation.passenger_name, reservation.seat_number, reservation.email
        );
        if let Err(err) = self.notifier.publish(&payload).await {
            warn!(
                "Notification publish failed for reservation {}: {}",
                reservation.id, err
            );
        }

        info!(
            "Reservation {} booked with PNR {} on flight {}",
            reservation.id, reservation.pnr, reservation.flight_id
        );
        Ok(reservation)
    }

    pub async fn cancel_booking(&self, reservation_id: Uuid) -> BookingResult<Reservation> {
        let mut reservation = self
            .store
            .find_by_id(reservation_id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("reservation {}", reservation_id)))?;

        if reservation.status == ReservationStatus::CANCELLED {
            return Err(BookingError::AlreadyCancelled);
        }

        let flight = self.guarded_flight_lookup(reservation.flight_id).await?;

        let hours_to_departure = (flight.departure_time - Utc::now()).num_hours();
        if hours_to_departure < self.policy.cutoff_hours {
            return Err(BookingError::CancellationWindowExpired {
                cutoff_hours: self.policy.cutoff_hours,
            });
        }

        // One-way gate. Seats are not restored to the authority.
        reservation.status = ReservationStatus::CANCELLED;
        reservation.updated_at = Utc::now();
        let updated = self.store.update(&reservation).await?;

        info!("Reservation {} cancelled (PNR {})", updated.id, updated.pnr);
        Ok(updated)
    }

    pub async fn reservation_by_id(&self, id: Uuid) -> BookingResult<Reservation> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("reservation {}", id)))
    }

    pub async fn reservation_by_pnr(&self, pnr: &str) -> BookingResult<Reservation> {
        self.store
            .find_by_pnr(pnr)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("PNR {}", pnr)))
    }

    pub async fn reservations_by_email(&self, email: &str) -> BookingResult<Vec<Reservation>> {
        Ok(self.store.find_by_email(email).await?)
    }

    /// Seat labels currently booked on a flight. Advisory for seat maps;
    /// `book_ticket` does not consult it.
    pub async fn booked_seats(&self, flight_id: Uuid) -> BookingResult<HashSet<String>> {
        Ok(self.store.booked_seats(flight_id).await?)
    }

    /// Flight lookup through the circuit breaker. A definitive not-found
    /// answer is a business response and does not count against the
    /// breaker; everything else surfaces as the single
    /// `ServiceUnavailable` kind, masking the underlying cause.
    async fn guarded_flight_lookup(&self, flight_id: Uuid) -> BookingResult<Flight> {
        if !self.breaker.try_acquire().await {
            return Err(BookingError::ServiceUnavailable);
        }
        match self.inventory.flight_by_id(flight_id).await {
            Ok(flight) => {
                self.breaker.record_success().await;
                Ok(flight)
            }
            Err(InventoryError::FlightNotFound(id)) => {
                self.breaker.record_success().await;
                Err(BookingError::NotFound(format!("flight {}", id)))
            }
            Err(err) => {
                self.breaker.record_failure().await;
                warn!("Flight lookup failed for {}: {}", flight_id, err);
                Err(BookingError::ServiceUnavailable)
            }
        }
    }

    async fn guarded_decrement(&self, flight_id: Uuid, count: i32) -> Result<(), InventoryError> {
        if !self.breaker.try_acquire().await {
            return Err(InventoryError::Unavailable("circuit open".to_string()));
        }
        match self.inventory.decrement_seats(flight_id, count).await {
            Ok(()) => {
                self.breaker.record_success().await;
                Ok(())
            }
            Err(err @ InventoryError::Unavailable(_)) => {
                self.breaker.record_failure().await;
                Err(err)
            }
            // The authority answered; its rejection is not a breaker failure.
            Err(err) => {
                self.breaker.record_success().await;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breaker::{BreakerConfig, CircuitState};
    use async_trait::async_trait;
    use chrono::Duration;
    use skylane_core::notify::NotifyError;
    use skylane_inventory::{AddFlightRequest, FlightCatalog, LocalInventoryClient};
    use skylane_store::memory::InMemoryReservationStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct RecordingChannel {
        messages: Mutex<Vec<String>>,
    }

    impl RecordingChannel {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                messages: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl NotificationChannel for RecordingChannel {
        async fn publish(&self, payload: &str) -> Result<(), NotifyError> {
            self.messages.lock().unwrap().push(payload.to_string());
            Ok(())
        }
    }

    struct FailingChannel;

    #[async_trait]
    impl NotificationChannel for FailingChannel {
        async fn publish(&self, _payload: &str) -> Result<(), NotifyError> {
            Err(NotifyError::Publish("broker down".to_string()))
        }
    }

    /// Authority that never answers, with a call counter so tests can
    /// observe short-circuiting.
    struct DownInventory {
        calls: AtomicUsize,
    }

    impl DownInventory {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl InventoryClient for DownInventory {
        async fn flight_by_id(&self, _flight_id: Uuid) -> Result<Flight, InventoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(InventoryError::Unavailable("connection refused".to_string()))
        }

        async fn decrement_seats(
            &self,
            _flight_id: Uuid,
            _count: i32,
        ) -> Result<(), InventoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(InventoryError::Unavailable("connection refused".to_string()))
        }
    }

    /// Authority whose reads succeed but whose decrement always fails.
    struct DecrementFailsInventory {
        flight: Flight,
    }

    #[async_trait]
    impl InventoryClient for DecrementFailsInventory {
        async fn flight_by_id(&self, _flight_id: Uuid) -> Result<Flight, InventoryError> {
            Ok(self.flight.clone())
        }

        async fn decrement_seats(
            &self,
            _flight_id: Uuid,
            _count: i32,
        ) -> Result<(), InventoryError> {
            Err(InventoryError::Unavailable("write timeout".to_string()))
        }
    }

    fn breaker() -> Arc<CircuitBreaker> {
        Arc::new(CircuitBreaker::new(
            "inventory",
            BreakerConfig {
                failure_rate_threshold: 50.0,
                sliding_window_size: 2,
                wait_duration: std::time::Duration::from_secs(3600),
                half_open_max_calls: 1,
            },
        ))
    }

    async fn catalog_with_flight(hours_to_departure: i64, seats: i32) -> (Arc<FlightCatalog>, Flight) {
        let catalog = Arc::new(FlightCatalog::new());
        let flight = catalog
            .add_flight(AddFlightRequest {
                flight_number: "F101".to_string(),
                from_city: "Delhi".to_string(),
                to_city: "Mumbai".to_string(),
                departure_time: Utc::now() + Duration::hours(hours_to_departure),
                arrival_time: Utc::now() + Duration::hours(hours_to_departure + 2),
                cost_amount: 20000,
                cost_currency: "INR".to_string(),
                seats_available: seats,
            })
            .await
            .unwrap();
        (catalog, flight)
    }

    fn orchestrator(
        inventory: Arc<dyn InventoryClient>,
        notifier: Arc<dyn NotificationChannel>,
    ) -> (BookingOrchestrator, Arc<InMemoryReservationStore>) {
        let store = Arc::new(InMemoryReservationStore::new());
        let orch = BookingOrchestrator::new(
            store.clone(),
            inventory,
            notifier,
            breaker(),
            CancellationPolicy::default(),
        );
        (orch, store)
    }

    fn request(flight_id: Uuid, tickets: i32) -> BookingRequest {
        BookingRequest {
            flight_id,
            passenger_name: "Ada Lovelace".to_string(),
            age: 36,
            gender: "F".to_string(),
            meal: "VEG".to_string(),
            email: "ada@example.com".to_string(),
            seat_number: "12A".to_string(),
            ticket_count: tickets,
        }
    }

    #[tokio::test]
    async fn booking_persists_decrements_and_notifies() {
        let (catalog, flight) = catalog_with_flight(48, 50).await;
        let channel = RecordingChannel::new();
        let (orch, _store) = orchestrator(
            Arc::new(LocalInventoryClient::new(catalog.clone())),
            channel.clone(),
        );

        let reservation = orch.book_ticket(request(flight.id, 2)).await.unwrap();

        assert_eq!(reservation.status, ReservationStatus::BOOKED);
        assert_eq!(reservation.pnr.len(), 8);
        assert!(reservation
            .pnr
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));

        let by_pnr = orch.reservation_by_pnr(&reservation.pnr).await.unwrap();
        assert_eq!(by_pnr.id, reservation.id);
        assert_eq!(by_pnr.status, ReservationStatus::BOOKED);

        assert_eq!(catalog.flight(flight.id).await.unwrap().seats_available, 48);

        let messages = channel.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains(&reservation.pnr));
        assert!(messages[0].contains("12A"));
    }

    #[tokio::test]
    async fn insufficient_capacity_leaves_store_unchanged() {
        let (catalog, flight) = catalog_with_flight(48, 5).await;
        let (orch, _store) = orchestrator(
            Arc::new(LocalInventoryClient::new(catalog.clone())),
            RecordingChannel::new(),
        );

        let err = orch.book_ticket(request(flight.id, 10)).await.unwrap_err();
        assert!(matches!(
            err,
            BookingError::InsufficientCapacity {
                requested: 10,
                available: 5
            }
        ));

        assert!(orch
            .reservations_by_email("ada@example.com")
            .await
            .unwrap()
            .is_empty());
        assert_eq!(catalog.flight(flight.id).await.unwrap().seats_available, 5);
    }

    #[tokio::test]
    async fn inventory_outage_creates_no_reservation() {
        let (orch, _store) = orchestrator(DownInventory::new(), RecordingChannel::new());

        let err = orch
            .book_ticket(request(Uuid::new_v4(), 1))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::ServiceUnavailable));
        assert!(orch
            .reservations_by_email("ada@example.com")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn unknown_flight_is_not_found_and_does_not_trip_breaker() {
        let catalog = Arc::new(FlightCatalog::new());
        let (orch, _store) = orchestrator(
            Arc::new(LocalInventoryClient::new(catalog)),
            RecordingChannel::new(),
        );

        // More misses than the window holds; not-found answers never trip.
        for _ in 0..4 {
            let err = orch
                .book_ticket(request(Uuid::new_v4(), 1))
                .await
                .unwrap_err();
            assert!(matches!(err, BookingError::NotFound(_)));
        }
        assert_eq!(orch.breaker.state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn open_breaker_short_circuits_without_a_network_attempt() {
        let inventory = DownInventory::new();
        let (orch, _store) = orchestrator(inventory.clone(), RecordingChannel::new());

        // Two failures fill the window and trip the breaker.
        for _ in 0..2 {
            let err = orch
                .book_ticket(request(Uuid::new_v4(), 1))
                .await
                .unwrap_err();
            assert!(matches!(err, BookingError::ServiceUnavailable));
        }
        assert_eq!(orch.breaker.state().await, CircuitState::Open);
        let calls_before = inventory.calls.load(Ordering::SeqCst);

        let err = orch
            .book_ticket(request(Uuid::new_v4(), 1))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::ServiceUnavailable));
        assert_eq!(inventory.calls.load(Ordering::SeqCst), calls_before);
    }

    #[tokio::test]
    async fn decrement_failure_does_not_fail_the_booking() {
        let (_, flight) = catalog_with_flight(48, 50).await;
        let inventory = Arc::new(DecrementFailsInventory {
            flight: flight.clone(),
        });
        let (orch, _store) = orchestrator(inventory, RecordingChannel::new());

        let reservation = orch.book_ticket(request(flight.id, 2)).await.unwrap();
        assert_eq!(reservation.status, ReservationStatus::BOOKED);

        // The inconsistency window is accepted: seat held, decrement lost.
        let lookup = orch.reservation_by_id(reservation.id).await.unwrap();
        assert_eq!(lookup.status, ReservationStatus::BOOKED);
    }

    #[tokio::test]
    async fn notification_failure_does_not_fail_the_booking() {
        let (catalog, flight) = catalog_with_flight(48, 50).await;
        let (orch, _store) = orchestrator(
            Arc::new(LocalInventoryClient::new(catalog)),
            Arc::new(FailingChannel),
        );

        let reservation = orch.book_ticket(request(flight.id, 1)).await.unwrap();
        assert_eq!(reservation.status, ReservationStatus::BOOKED);
    }

    #[tokio::test]
    async fn cancellation_outside_cutoff_succeeds() {
        let (catalog, flight) = catalog_with_flight(48, 50).await;
        let (orch, _store) = orchestrator(
            Arc::new(LocalInventoryClient::new(catalog.clone())),
            RecordingChannel::new(),
        );

        let reservation = orch.book_ticket(request(flight.id, 1)).await.unwrap();
        let cancelled = orch.cancel_booking(reservation.id).await.unwrap();
        assert_eq!(cancelled.status, ReservationStatus::CANCELLED);

        let lookup = orch.reservation_by_id(reservation.id).await.unwrap();
        assert_eq!(lookup.status, ReservationStatus::CANCELLED);

        // One-directional: no seats are restored.
        assert_eq!(catalog.flight(flight.id).await.unwrap().seats_available, 49);
    }

    #[tokio::test]
    async fn cancellation_inside_cutoff_is_rejected() {
        let (catalog, flight) = catalog_with_flight(1, 50).await;
        let (orch, _store) = orchestrator(
            Arc::new(LocalInventoryClient::new(catalog)),
            RecordingChannel::new(),
        );

        let reservation = orch.book_ticket(request(flight.id, 1)).await.unwrap();
        let err = orch.cancel_booking(reservation.id).await.unwrap_err();
        assert!(matches!(
            err,
            BookingError::CancellationWindowExpired { cutoff_hours: 24 }
        ));

        let lookup = orch.reservation_by_id(reservation.id).await.unwrap();
        assert_eq!(lookup.status, ReservationStatus::BOOKED);
    }

    #[tokio::test]
    async fn cancelling_twice_is_rejected() {
        let (catalog, flight) = catalog_with_flight(48, 50).await;
        let (orch, _store) = orchestrator(
            Arc::new(LocalInventoryClient::new(catalog)),
            RecordingChannel::new(),
        );

        let reservation = orch.book_ticket(request(flight.id, 1)).await.unwrap();
        orch.cancel_booking(reservation.id).await.unwrap();

        let err = orch.cancel_booking(reservation.id).await.unwrap_err();
        assert!(matches!(err, BookingError::AlreadyCancelled));
    }

    #[tokio::test]
    async fn cancelling_unknown_reservation_is_not_found() {
        let (catalog, _) = catalog_with_flight(48, 50).await;
        let (orch, _store) = orchestrator(
            Arc::new(LocalInventoryClient::new(catalog)),
            RecordingChannel::new(),
        );

        let err = orch.cancel_booking(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, BookingError::NotFound(_)));
    }

    #[tokio::test]
    async fn cancellation_during_outage_leaves_reservation_unchanged() {
        let (catalog, flight) = catalog_with_flight(48, 50).await;
        let store = Arc::new(InMemoryReservationStore::new());
        let healthy = BookingOrchestrator::new(
            store.clone(),
            Arc::new(LocalInventoryClient::new(catalog)),
            RecordingChannel::new(),
            breaker(),
            CancellationPolicy::default(),
        );
        let reservation = healthy.book_ticket(request(flight.id, 1)).await.unwrap();

        // Same store, authority now dark.
        let degraded = BookingOrchestrator::new(
            store,
            DownInventory::new(),
            RecordingChannel::new(),
            breaker(),
            CancellationPolicy::default(),
        );
        let err = degraded.cancel_booking(reservation.id).await.unwrap_err();
        assert!(matches!(err, BookingError::ServiceUnavailable));

        let lookup = degraded.reservation_by_id(reservation.id).await.unwrap();
        assert_eq!(lookup.status, ReservationStatus::BOOKED);
    }

    #[tokio::test]
    async fn booked_seats_reflect_only_active_reservations() {
        let (catalog, flight) = catalog_with_flight(48, 50).await;
        let (orch, _store) = orchestrator(
            Arc::new(LocalInventoryClient::new(catalog)),
            RecordingChannel::new(),
        );

        let first = orch.book_ticket(request(flight.id, 1)).await.unwrap();
        let mut second_req = request(flight.id, 1);
        second_req.seat_number = "14C".to_string();
        second_req.email = "grace@example.com".to_string();
        orch.book_ticket(second_req).await.unwrap();

        orch.cancel_booking(first.id).await.unwrap();

        let seats = orch.booked_seats(flight.id).await.unwrap();
        assert_eq!(seats, HashSet::from(["14C".to_string()]));
    }

    #[tokio::test]
    async fn history_by_email_is_insertion_ordered() {
        let (catalog, flight) = catalog_with_flight(48, 50).await;
        let (orch, _store) = orchestrator(
            Arc::new(LocalInventoryClient::new(catalog)),
            RecordingChannel::new(),
        );

        let first = orch.book_ticket(request(flight.id, 1)).await.unwrap();
        let mut second_req = request(flight.id, 1);
        second_req.seat_number = "14C".to_string();
        let second = orch.book_ticket(second_req).await.unwrap();

        let history = orch.reservations_by_email("ada@example.com").await.unwrap();
        assert_eq!(
            history.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![first.id, second.id]
        );
    }

    #[tokio::test]
    async fn zero_tickets_rejected_before_any_remote_call() {
        let inventory = DownInventory::new();
        let (orch, _store) = orchestrator(inventory.clone(), RecordingChannel::new());

        let err = orch
            .book_ticket(request(Uuid::new_v4(), 0))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));
        assert_eq!(inventory.calls.load(Ordering::SeqCst), 0);
    }
}
