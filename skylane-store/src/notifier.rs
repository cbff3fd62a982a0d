use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use skylane_core::notify::{NotificationChannel, NotifyError};
use std::time::Duration;
use tracing::{error, info};

/// Kafka-backed notification channel.
///
/// Delivery is fire-and-forget from the orchestrator's point of view:
/// failures are reported to the caller, who logs and moves on. Redelivery
/// is the broker's concern.
#[derive(Clone)]
pub struct KafkaNotifier {
    producer: FutureProducer,
    topic: String,
}

impl KafkaNotifier {
    pub fn new(brokers: &str, topic: &str) -> Result<Self, rdkafka::error::KafkaError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()?;

        Ok(Self {
            producer,
            topic: topic.to_string(),
        })
    }
}

#[async_trait]
impl NotificationChannel for KafkaNotifier {
    async fn publish(&self, payload: &str) -> Result<(), NotifyError> {
        let record = FutureRecord::<(), str>::to(&self.topic).payload(payload);

        match self
            .producer
            .send(record, Timeout::After(Duration::from_secs(0)))
            .await
        {
            Ok(delivery) => {
                info!(
                    "Notification sent to {}: partition {} offset {}",
                    self.topic, delivery.partition, delivery.offset
                );
                Ok(())
            }
            Err((e, _msg)) => {
                error!("Failed to publish notification to {}: {}", self.topic, e);
                Err(NotifyError::Publish(e.to_string()))
            }
        }
    }
}
