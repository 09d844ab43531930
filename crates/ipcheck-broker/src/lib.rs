//! Kafka plumbing for scan results.
//!
//! - [`publisher`]: the [`Publish`] contract and its Kafka implementation
//! - [`consumer`]: partition-0 reader and the signal-aware event loop
//! - [`shutdown`]: SIGINT/SIGTERM future shared by both binaries

pub mod consumer;
mod error;
pub mod publisher;
pub mod shutdown;

pub use consumer::{ConsumedMessage, ConsumerStats, ScanResultConsumer};
pub use error::{BrokerError, BrokerResult};
pub use publisher::{Delivery, KafkaPublisher, Publish};
