use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Verdict;

/// Service name stamped on every event produced by the submission API
pub const SCAN_RESULT_SOURCE: &str = "ip-submission-service";

/// Verdict event published to the broker for one submitted IP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    /// The submitted address, passed through untouched
    pub ip: String,

    /// Classification derived from the reputation lookup
    pub status: Verdict,

    /// When the verdict was constructed (not when the lookup ran)
    pub timestamp: DateTime<Utc>,

    /// Service that produced the event
    pub source: String,
}

impl ScanResult {
    /// Build a verdict event stamped with the current time and the submission service name
    #[must_use]
    pub fn new(ip: impl Into<String>, status: Verdict) -> Self {
        Self::at(ip, status, Utc::now())
    }

    /// Build a verdict event with an explicit timestamp
    #[must_use]
    pub fn at(ip: impl Into<String>, status: Verdict, timestamp: DateTime<Utc>) -> Self {
        Self {
            ip: ip.into(),
            status,
            timestamp,
            source: SCAN_RESULT_SOURCE.to_string(),
        }
    }
}
