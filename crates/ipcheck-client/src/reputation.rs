//! Reputation lookup contract and the VirusTotal response shape.

use async_trait::async_trait;
use ipcheck_core::{AnalysisStats, Result, Verdict};
use serde::{Deserialize, Deserializer};

/// Anything that can turn an IP into a verdict.
///
/// The submission API holds one of these behind an `Arc<dyn ReputationCheck>`.
#[async_trait]
pub trait ReputationCheck: Send + Sync {
    /// Look up `ip` and classify it. No retries are attempted.
    async fn check(&self, ip: &str) -> Result<Verdict>;
}

/// Body of `GET /api/v3/ip_addresses/{ip}`, reduced to the fields we read.
///
/// Any level that is absent or `null` decodes as empty, so a sparse report is `clean`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IpAddressReport {
    #[serde(default, deserialize_with = "null_as_default")]
    data: ReportData,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ReportData {
    #[serde(default, deserialize_with = "null_as_default")]
    attributes: ReportAttributes,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ReportAttributes {
    #[serde(default, deserialize_with = "null_as_default")]
    last_analysis_stats: AnalysisStats,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl IpAddressReport {
    /// Engine counts from the most recent analysis
    #[must_use]
    pub const fn stats(&self) -> &AnalysisStats {
        &self.data.attributes.last_analysis_stats
    }

    /// Verdict derived from [`Self::stats`]
    #[must_use]
    pub const fn verdict(&self) -> Verdict {
        self.data.attributes.last_analysis_stats.verdict()
    }
}
