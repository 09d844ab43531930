//! Configuration shared by the ipcheck binaries.
//!
//! Values come from a TOML file and can be overridden through environment variables:
//!
//! | Key                          | Environment variable  | Default                      |
//! |------------------------------|-----------------------|------------------------------|
//! | `server.port`                | `SERVER_PORT`         | `3000`                       |
//! | `virustotal.api_key`         | `VIRUSTOTAL_API_KEY`  | empty                        |
//! | `virustotal.base_url`        | `VIRUSTOTAL_BASE_URL` | `https://www.virustotal.com` |
//! | `virustotal.timeout_secs`    |                       | `10`                         |
//! | `kafka.broker`               | `KAFKA_BROKER`        | `localhost:9092`             |
//! | `kafka.message_timeout_secs` |                       | `10`                         |
//! | `log.level`                  | `LOG_LEVEL`           | `info`                       |

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{IpCheckError, Result};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Reputation API settings.
    #[serde(default)]
    pub virustotal: VirusTotalSection,

    /// Broker settings.
    #[serde(default)]
    pub kafka: KafkaSection,

    /// Logging settings.
    #[serde(default)]
    pub log: LogSection,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    /// Port the submission API listens on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Reputation API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirusTotalSection {
    /// API key sent in the `x-apikey` header.
    #[serde(default)]
    pub api_key: String,

    /// Scheme and host of the API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Broker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KafkaSection {
    /// Bootstrap broker address (`host:port`).
    #[serde(default = "default_broker")]
    pub broker: String,

    /// Seconds a published message may stay undelivered before the publish fails.
    #[serde(default = "default_message_timeout_secs")]
    pub message_timeout_secs: u64,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSection {
    /// Minimum level: `debug`, `info`, `warn` or `error`.
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl Default for VirusTotalSection {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for KafkaSection {
    fn default() -> Self {
        Self {
            broker: default_broker(),
            message_timeout_secs: default_message_timeout_secs(),
        }
    }
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl Config {
    /// Load config from a TOML file, falling back to defaults when the file is absent,
    /// then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse the TOML file only. A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content).map_err(|e| IpCheckError::Config(e.to_string()))
        } else {
            Ok(Self::default())
        }
    }

    /// Override file values with whatever `lookup` returns for the known variable names.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("SERVER_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| IpCheckError::Config(format!("invalid SERVER_PORT: {port}")))?;
        }
        if let Some(key) = lookup("VIRUSTOTAL_API_KEY") {
            self.virustotal.api_key = key;
        }
        if let Some(url) = lookup("VIRUSTOTAL_BASE_URL") {
            self.virustotal.base_url = url;
        }
        if let Some(broker) = lookup("KAFKA_BROKER") {
            self.kafka.broker = broker;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log.level = level;
        }
        Ok(())
    }

    /// Checks needed before the submission API can start.
    pub fn validate_api(&self) -> Result<()> {
        if self.virustotal.api_key.trim().is_empty() {
            return Err(IpCheckError::Config(
                "virustotal.api_key is empty (set VIRUSTOTAL_API_KEY)".into(),
            ));
        }
        if self.virustotal.timeout_secs == 0 {
            return Err(IpCheckError::Config(
                "virustotal.timeout_secs must be greater than zero".into(),
            ));
        }
        if self.kafka.message_timeout_secs == 0 {
            return Err(IpCheckError::Config(
                "kafka.message_timeout_secs must be greater than zero".into(),
            ));
        }
        self.validate_broker()
    }

    /// Checks needed before anything talks to the broker.
    pub fn validate_broker(&self) -> Result<()> {
        if self.kafka.broker.trim().is_empty() {
            return Err(IpCheckError::Config(
                "kafka.broker is empty (set KAFKA_BROKER)".into(),
            ));
        }
        Ok(())
    }
}

// Default value functions for serde.
const fn default_port() -> u16 {
    3000
}

fn default_base_url() -> String {
    String::from("https://www.virustotal.com")
}

const fn default_timeout_secs() -> u64 {
    10
}

fn default_broker() -> String {
    String::from("localhost:9092")
}

const fn default_message_timeout_secs() -> u64 {
    10
}

fn default_level() -> String {
    String::from("info")
}
