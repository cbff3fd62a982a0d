use skylane_api::{
    app,
    state::{AppState, AuthConfig},
};
use skylane_booking::{BookingOrchestrator, BreakerConfig, CancellationPolicy, CircuitBreaker};
use skylane_inventory::{FlightCatalog, LocalInventoryClient};
use skylane_store::{DbClient, KafkaNotifier, PgReservationStore};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skylane_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = skylane_store::Config::load().expect("Failed to load config");
    tracing::info!("Starting Skylane API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");
    let store = Arc::new(PgReservationStore::new(db.pool.clone()));

    let notifier = Arc::new(
        KafkaNotifier::new(&config.kafka.brokers, &config.kafka.booking_topic)
            .expect("Failed to create Kafka producer"),
    );

    let catalog = Arc::new(FlightCatalog::new());
    let inventory = Arc::new(LocalInventoryClient::new(catalog.clone()));

    let breaker = Arc::new(CircuitBreaker::new(
        "inventory",
        BreakerConfig {
            failure_rate_threshold: config.breaker.failure_rate_threshold,
            sliding_window_size: config.breaker.sliding_window_size,
            wait_duration: Duration::from_secs(config.breaker.wait_duration_seconds),
            half_open_max_calls: config.breaker.half_open_max_calls,
        },
    ));

    let orchestrator = Arc::new(BookingOrchestrator::new(
        store,
        inventory,
        notifier,
        breaker,
        CancellationPolicy {
            cutoff_hours: config.booking.cancellation_cutoff_hours,
        },
    ));

    let app_state = AppState {
        orchestrator,
        catalog,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
