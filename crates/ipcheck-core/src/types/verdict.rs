use serde::{Deserialize, Deserializer, Serialize};

/// Classification of an IP address derived from reputation statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// At least one engine flagged the address as malicious
    Malicious,
    /// No malicious flags, but at least one engine found it suspicious
    Suspicious,
    /// Neither malicious nor suspicious flags
    Clean,
}

impl Verdict {
    /// Wire representation, as used in events and HTTP responses
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Malicious => "malicious",
            Self::Suspicious => "suspicious",
            Self::Clean => "clean",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Absent and `null` counts both read as zero
fn count_or_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or_default())
}

/// Per-engine counts from the latest reputation analysis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisStats {
    /// Engines that flagged the address as malicious
    #[serde(default, deserialize_with = "count_or_zero")]
    pub malicious: u32,

    /// Engines that flagged the address as suspicious
    #[serde(default, deserialize_with = "count_or_zero")]
    pub suspicious: u32,

    /// Engines that considered the address harmless.
    /// Decoded for completeness; it never influences the verdict.
    #[serde(default, deserialize_with = "count_or_zero")]
    pub harmless: u32,
}

impl AnalysisStats {
    /// Reduce the counts to a verdict. Malicious wins over suspicious, anything else is clean.
    #[must_use]
    pub const fn verdict(&self) -> Verdict {
        if self.malicious > 0 {
            Verdict::Malicious
        } else if self.suspicious > 0 {
            Verdict::Suspicious
        } else {
            Verdict::Clean
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(malicious: u32, suspicious: u32, harmless: u32) -> AnalysisStats {
        AnalysisStats {
            malicious,
            suspicious,
            harmless,
        }
    }

    #[test]
    fn test_malicious_wins() {
        assert_eq!(stats(2, 0, 50).verdict(), Verdict::Malicious);
        assert_eq!(stats(1, 7, 0).verdict(), Verdict::Malicious);
        assert_eq!(stats(u32::MAX, u32::MAX, u32::MAX).verdict(), Verdict::Malicious);
    }

    #[test]
    fn test_suspicious_without_malicious() {
        assert_eq!(stats(0, 3, 10).verdict(), Verdict::Suspicious);
        assert_eq!(stats(0, 1, 0).verdict(), Verdict::Suspicious);
    }

    #[test]
    fn test_clean_ignores_harmless() {
        assert_eq!(stats(0, 0, 70).verdict(), Verdict::Clean);
        assert_eq!(stats(0, 0, 0).verdict(), Verdict::Clean);
        assert_eq!(stats(0, 0, u32::MAX).verdict(), Verdict::Clean);
    }

    #[test]
    fn test_missing_counts_default_to_zero() {
        let parsed: AnalysisStats = serde_json::from_str(r#"{"suspicious": 4}"#).unwrap();
        assert_eq!(parsed, stats(0, 4, 0));
        assert_eq!(parsed.verdict(), Verdict::Suspicious);
    }

    #[test]
    fn test_null_counts_read_as_zero() {
        let parsed: AnalysisStats =
            serde_json::from_str(r#"{"malicious": null, "suspicious": 1, "harmless": null}"#)
                .unwrap();
        assert_eq!(parsed, stats(0, 1, 0));
        assert_eq!(parsed.verdict(), Verdict::Suspicious);

        let parsed: AnalysisStats = serde_json::from_str(r#"{"malicious": null}"#).unwrap();
        assert_eq!(parsed.verdict(), Verdict::Clean);
    }

    #[test]
    fn test_negative_count_is_rejected() {
        assert!(serde_json::from_str::<AnalysisStats>(r#"{"malicious": -1}"#).is_err());
    }

    #[test]
    fn test_verdict_wire_format() {
        assert_eq!(serde_json::to_string(&Verdict::Clean).unwrap(), "\"clean\"");
        assert_eq!(
            serde_json::from_str::<Verdict>("\"malicious\"").unwrap(),
            Verdict::Malicious
        );
        assert!(serde_json::from_str::<Verdict>("\"MALICIOUS\"").is_err());
        assert_eq!(Verdict::Suspicious.to_string(), "suspicious");
    }
}
