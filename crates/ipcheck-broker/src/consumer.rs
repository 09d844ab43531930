//! Scan result consumer.
//!
//! Reads partition 0 of the scan result topic from the oldest retained offset and logs
//! every verdict. Nothing is committed, so every restart replays the retained history.

use futures_util::{Stream, StreamExt};
use ipcheck_core::{ScanResult, SCAN_RESULT_TOPIC};
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::{BorrowedMessage, Message};
use rdkafka::{Offset, TopicPartitionList};
use std::future::Future;
use std::time::Duration;
use tracing::{error, info};

use crate::{BrokerError, BrokerResult};

/// The only partition that is ever read
pub const CONSUMED_PARTITION: i32 = 0;

/// How long startup waits for topic metadata
const METADATA_TIMEOUT: Duration = Duration::from_secs(10);

/// A message detached from the consumer that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumedMessage {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub payload: Option<Vec<u8>>,
}

impl ConsumedMessage {
    fn from_borrowed(message: &BorrowedMessage<'_>) -> Self {
        Self {
            topic: message.topic().to_string(),
            partition: message.partition(),
            offset: message.offset(),
            payload: message.payload().map(<[u8]>::to_vec),
        }
    }

    /// Decode the value as a scan result
    pub fn decode(&self) -> BrokerResult<ScanResult> {
        let payload = self.payload.as_deref().ok_or(BrokerError::EmptyPayload)?;
        serde_json::from_slice(payload).map_err(BrokerError::Decode)
    }
}

/// What the event loop did before it stopped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerStats {
    /// Messages decoded and logged
    pub decoded: u64,
    /// Messages whose value was not a scan result
    pub rejected: u64,
    /// Errors reported by the consumer itself
    pub errors: u64,
}

/// Decode and log one message. Failures are logged with the raw payload.
pub fn handle_message(message: &ConsumedMessage) -> BrokerResult<ScanResult> {
    match message.decode() {
        Ok(result) => {
            info!(
                ip = %result.ip,
                status = %result.status,
                timestamp = %result.timestamp.to_rfc3339(),
                source = %result.source,
                topic = %message.topic,
                partition = message.partition,
                offset = message.offset,
                "scan result received"
            );
            Ok(result)
        }
        Err(e) => {
            let raw = message
                .payload
                .as_deref()
                .map(String::from_utf8_lossy)
                .unwrap_or_default();
            error!(
                error = %e,
                payload = %raw,
                topic = %message.topic,
                partition = message.partition,
                offset = message.offset,
                "failed to decode scan result"
            );
            Err(e)
        }
    }
}

/// Run the event loop until `shutdown` resolves or `messages` ends.
///
/// The shutdown future is polled before the stream on every turn, so once it fires no
/// further message is handled.
pub async fn consume<S, F>(messages: S, shutdown: F) -> ConsumerStats
where
    S: Stream<Item = BrokerResult<ConsumedMessage>>,
    F: Future<Output = ()>,
{
    tokio::pin!(messages);
    tokio::pin!(shutdown);

    let mut stats = ConsumerStats::default();

    loop {
        tokio::select! {
            biased;

            () = &mut shutdown => {
                info!("shutdown signal received, stopping consumer");
                break;
            }

            next = messages.next() => match next {
                Some(Ok(message)) => match handle_message(&message) {
                    Ok(_) => stats.decoded += 1,
                    Err(_) => stats.rejected += 1,
                },
                Some(Err(e)) => {
                    error!(error = %e, "consumer error");
                    stats.errors += 1;
                }
                None => {
                    info!("message stream ended");
                    break;
                }
            },
        }
    }

    stats
}

/// Kafka consumer attached to partition 0 of the scan result topic
pub struct ScanResultConsumer {
    consumer: StreamConsumer,
    topic: String,
}

impl ScanResultConsumer {
    /// Connect to `broker`, verify the partition exists and assign it at the oldest offset.
    ///
    /// Blocks on a metadata round trip; any failure here is meant to be fatal.
    pub fn connect(broker: &str) -> BrokerResult<Self> {
        let topic = SCAN_RESULT_TOPIC;

        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", broker)
            // Required by librdkafka; no group coordination happens because we assign().
            .set("group.id", "ipcheck-alert")
            .set("enable.auto.commit", "false")
            .set("enable.auto.offset.store", "false")
            .set("enable.partition.eof", "false")
            .create()?;

        let metadata = consumer.fetch_metadata(Some(topic), METADATA_TIMEOUT)?;
        let topic_meta = metadata
            .topics()
            .iter()
            .find(|t| t.name() == topic)
            .ok_or_else(|| BrokerError::Startup(format!("topic {topic} not found")))?;

        if let Some(err) = topic_meta.error() {
            return Err(BrokerError::Startup(format!(
                "topic {topic} unavailable: {err:?}"
            )));
        }
        if !topic_meta
            .partitions()
            .iter()
            .any(|p| p.id() == CONSUMED_PARTITION)
        {
            return Err(BrokerError::Startup(format!(
                "topic {topic} has no partition {CONSUMED_PARTITION}"
            )));
        }

        let mut assignment = TopicPartitionList::new();
        assignment.add_partition_offset(topic, CONSUMED_PARTITION, Offset::Beginning)?;
        consumer.assign(&assignment)?;

        info!(
            broker,
            topic,
            partition = CONSUMED_PARTITION,
            "consumer attached at oldest offset"
        );

        Ok(Self {
            consumer,
            topic: topic.to_string(),
        })
    }

    /// Topic being read
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Consume until `shutdown` resolves.
    pub async fn run<F>(&self, shutdown: F) -> ConsumerStats
    where
        F: Future<Output = ()>,
    {
        let messages = self.consumer.stream().map(|next| {
            next.map(|message| ConsumedMessage::from_borrowed(&message))
                .map_err(BrokerError::Kafka)
        });
        consume(messages, shutdown).await
    }
}
