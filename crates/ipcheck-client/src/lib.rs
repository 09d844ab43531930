//! HTTP client for the VirusTotal IP reputation API.
//!
//! This crate provides [`VirusTotalClient`], which looks up one address and reduces the
//! engine statistics to a [`Verdict`](ipcheck_core::Verdict), and the [`ReputationCheck`]
//! trait the submission API depends on.

mod client;
mod reputation;

pub use client::{VirusTotalClient, VirusTotalClientBuilder};
pub use ipcheck_core::{IpCheckError, Result};
pub use reputation::{IpAddressReport, ReputationCheck};
