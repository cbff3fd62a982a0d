pub mod app_config;
pub mod database;
pub mod memory;
pub mod notifier;
pub mod postgres;

pub use app_config::Config;
pub use database::DbClient;
pub use memory::InMemoryReservationStore;
pub use notifier::KafkaNotifier;
pub use postgres::PgReservationStore;
