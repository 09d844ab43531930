//! Synchronous scan result publishing.

use async_trait::async_trait;
use ipcheck_core::{ScanResult, SCAN_RESULT_TOPIC};
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;
use std::time::Duration;
use tracing::{error, info};

use crate::{BrokerError, BrokerResult};

/// How long `close` waits for in-flight messages
const FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

/// How long librdkafka keeps retrying an undelivered message before failing it
pub const DEFAULT_MESSAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the broker stored an acknowledged message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub partition: i32,
    pub offset: i64,
}

/// Sends one scan result and waits for the broker to acknowledge it.
#[async_trait]
pub trait Publish: Send + Sync {
    /// Publish exactly one message. Calling twice with the same result sends two messages.
    async fn publish(&self, result: &ScanResult) -> BrokerResult<Delivery>;
}

/// Serialize a scan result into the message value.
pub fn encode(result: &ScanResult) -> BrokerResult<Vec<u8>> {
    serde_json::to_vec(result).map_err(BrokerError::Encode)
}

/// Kafka producer handle, opened once at startup and shared by all requests.
#[derive(Clone)]
pub struct KafkaPublisher {
    producer: FutureProducer,
    topic: String,
}

impl KafkaPublisher {
    /// Create a producer for `broker` writing to the scan result topic.
    ///
    /// Undelivered messages fail after [`DEFAULT_MESSAGE_TIMEOUT`].
    pub fn new(broker: &str) -> BrokerResult<Self> {
        Self::with_message_timeout(broker, DEFAULT_MESSAGE_TIMEOUT)
    }

    /// Create a producer whose undelivered messages fail after `timeout`.
    ///
    /// The send itself never times out locally, so this bounds how long a publish can wait
    /// on an unreachable broker.
    pub fn with_message_timeout(broker: &str, timeout: Duration) -> BrokerResult<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", broker)
            .set("message.timeout.ms", timeout.as_millis().to_string())
            .create()?;
        Ok(Self {
            producer,
            topic: SCAN_RESULT_TOPIC.to_string(),
        })
    }

    /// Topic this publisher writes to
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Flush anything still queued. Call once on shutdown.
    pub fn close(&self) -> BrokerResult<()> {
        self.producer.flush(Timeout::After(FLUSH_TIMEOUT))?;
        info!(topic = %self.topic, "publisher flushed");
        Ok(())
    }
}

#[async_trait]
impl Publish for KafkaPublisher {
    async fn publish(&self, result: &ScanResult) -> BrokerResult<Delivery> {
        let payload = match encode(result) {
            Ok(payload) => payload,
            Err(e) => {
                error!(ip = %result.ip, error = %e, "failed to serialize scan result");
                return Err(e);
            }
        };

        // No key: partition assignment is left to the broker's partitioner.
        let record = FutureRecord::<(), [u8]>::to(&self.topic).payload(&payload);

        match self.producer.send(record, Timeout::Never).await {
            Ok((partition, offset)) => {
                info!(
                    topic = %self.topic,
                    partition,
                    offset,
                    "scan result published"
                );
                Ok(Delivery { partition, offset })
            }
            Err((e, _message)) => {
                error!(ip = %result.ip, error = %e, "failed to publish scan result");
                Err(BrokerError::Kafka(e))
            }
        }
    }
}
