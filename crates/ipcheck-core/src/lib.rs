//! Core types for the ipcheck services.
//!
//! This crate provides the foundational pieces shared by the submission API and the
//! alert consumer:
//!
//! - **Types**: the [`ScanResult`] event, the [`Verdict`] classification and the
//!   reputation statistics it is derived from
//! - **Errors**: [`IpCheckError`] and the crate [`Result`] alias
//! - **Configuration**: [`Config`], loaded once at startup and passed down explicitly
//! - **Logging**: [`logging::init`], the subscriber bootstrap used by both binaries
//!
//! # Example
//!
//! ```rust,ignore
//! use ipcheck_core::{AnalysisStats, ScanResult, Verdict};
//!
//! let stats = AnalysisStats { malicious: 0, suspicious: 3, harmless: 10 };
//! assert_eq!(stats.verdict(), Verdict::Suspicious);
//!
//! let result = ScanResult::new("8.8.8.8", stats.verdict());
//! println!("{}", serde_json::to_string(&result)?);
//! ```

pub mod config;
mod error;
pub mod logging;
pub mod types;

pub use config::Config;
pub use error::{IpCheckError, Result};
pub use types::*;

/// Topic carrying [`ScanResult`] events from the submission API to the consumer.
pub const SCAN_RESULT_TOPIC: &str = "ip_scan_result";
