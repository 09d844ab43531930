use rdkafka::error::KafkaError;
use thiserror::Error;

/// Result type alias for broker operations
pub type BrokerResult<T> = std::result::Result<T, BrokerError>;

/// Errors raised while talking to the broker
#[derive(Error, Debug)]
pub enum BrokerError {
    /// Client creation, send, or consume failure reported by librdkafka
    #[error("kafka error: {0}")]
    Kafka(#[from] KafkaError),

    /// Event could not be serialized; nothing was sent
    #[error("failed to encode scan result: {0}")]
    Encode(#[source] serde_json::Error),

    /// Message value is not a valid scan result
    #[error("failed to decode scan result: {0}")]
    Decode(#[source] serde_json::Error),

    /// Message carried no value
    #[error("message has no payload")]
    EmptyPayload,

    /// Consumer could not attach to its partition
    #[error("consumer startup failed: {0}")]
    Startup(String),
}
