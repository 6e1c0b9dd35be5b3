use std::time::Duration;

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::FutureProducer;
use rdkafka::producer::FutureRecord;
use rdkafka::util::Timeout;

use crate::config::KafkaConfig;
use crate::domain::auth::errors::NotifierError;
use crate::domain::auth::events::AuthEvent;
use crate::domain::auth::ports::EventNotifier;
use crate::outbound::events::messages::AuthEventMessage;

pub struct KafkaEventNotifier {
    producer: FutureProducer,
    topic: String,
    timeout: Duration,
}

impl KafkaEventNotifier {
    /// Create a Kafka notifier with "at least once" delivery semantics.
    ///
    /// # Notes:
    /// - `acks=all`: Wait for all in-sync replicas to acknowledge
    /// - `enable.idempotence=true`: Prevents duplicate messages during retries
    /// - `max.in.flight.requests.per.connection=5`: Allows pipelining with ordering guarantees
    pub fn new(brokers: &str, config: &KafkaConfig) -> Result<Self, anyhow::Error> {
        tracing::info!(
            "Initializing Kafka producer for auth events: brokers={}, topic={}",
            brokers,
            &config.topic
        );

        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "30000")
            .set("queue.buffering.max.messages", "10000")
            .set("batch.num.messages", "100")
            .set("compression.type", "gzip")
            .set("enable.idempotence", "true")
            .set("acks", "all")
            .set("retries", "10")
            .set("max.in.flight.requests.per.connection", "5")
            .set("retry.backoff.ms", "100")
            .create()?;

        tracing::info!("Kafka producer initialized successfully");

        Ok(Self {
            producer,
            topic: config.topic.clone(),
            timeout: Duration::from_secs(30),
        })
    }
}

#[async_trait]
impl EventNotifier for KafkaEventNotifier {
    /// Hand the event to the producer and return without waiting for the
    /// broker. Delivery failures are logged by the background task.
    async fn notify(&self, event: &AuthEvent) -> Result<(), NotifierError> {
        let payload = serde_json::to_string(&AuthEventMessage::from(event))
            .map_err(|e| NotifierError::SerializationFailed(e.to_string()))?;

        let producer = self.producer.clone();
        let topic = self.topic.clone();
        let timeout = self.timeout;
        // Partition by user_id for per-user ordering
        let key = event.user_id().to_string();
        let event_type = event.event_type();

        tokio::spawn(async move {
            let record = FutureRecord::to(&topic)
                .key(key.as_str())
                .payload(payload.as_str());

            match producer.send(record, Timeout::After(timeout)).await {
                Ok(_) => tracing::debug!(
                    "Published {} event to topic '{}' for user {}",
                    event_type,
                    topic,
                    key
                ),
                Err((err, _)) => tracing::error!(
                    "Failed to publish {} event for user {}: {}",
                    event_type,
                    key,
                    err
                ),
            }
        });

        Ok(())
    }
}
