//! Client configuration.
//!
//! Loaded from a JSON file, with `TOMBOLA_`-prefixed environment variables
//! taking precedence over file values. Validation rejects values the rest of
//! the client cannot operate with (empty agency id, zero batch size).

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Result, TombolaError};

/// Default bets per batch.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Default initial poll backoff, in seconds.
pub const DEFAULT_BACKOFF_BASE_SECS: u64 = 1;

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_backoff_base_secs() -> u64 {
    DEFAULT_BACKOFF_BASE_SECS
}

/// Configuration used by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Agency identifier, embedded in every bet and in the poll request.
    /// Must parse as a 32-bit integer at poll time.
    pub agency_id: String,
    /// Authority address, `host:port`.
    pub server_address: String,
    /// Maximum bets per batch (positive).
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Path to the delimited bet records file.
    pub records_path: PathBuf,
    /// Strict confirmation mode: also validate the echoed bet number.
    #[serde(default)]
    pub strict_confirmation: bool,
    /// Initial poll backoff in seconds (doubles after every Wait).
    #[serde(default = "default_backoff_base_secs")]
    pub backoff_base_secs: u64,
    /// Optional cap on the poll backoff, in seconds. Unset means the
    /// doubling is unbounded.
    #[serde(default)]
    pub backoff_cap_secs: Option<u64>,
}

impl ClientConfig {
    /// Load configuration from a JSON file, then apply environment
    /// overrides.
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await?;
        let mut config: ClientConfig = serde_json::from_str(&raw)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Override file values with `TOMBOLA_*` environment variables:
    /// `TOMBOLA_AGENCY_ID`, `TOMBOLA_SERVER_ADDRESS`, `TOMBOLA_BATCH_SIZE`,
    /// `TOMBOLA_RECORDS_PATH`.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(v) = std::env::var("TOMBOLA_AGENCY_ID") {
            self.agency_id = v;
        }
        if let Ok(v) = std::env::var("TOMBOLA_SERVER_ADDRESS") {
            self.server_address = v;
        }
        if let Ok(v) = std::env::var("TOMBOLA_BATCH_SIZE") {
            self.batch_size = v
                .parse()
                .map_err(|_| TombolaError::Config(format!("TOMBOLA_BATCH_SIZE: {:?}", v)))?;
        }
        if let Ok(v) = std::env::var("TOMBOLA_RECORDS_PATH") {
            self.records_path = PathBuf::from(v);
        }
        Ok(())
    }

    /// Reject configurations the client cannot operate with.
    pub fn validate(&self) -> Result<()> {
        if self.agency_id.is_empty() {
            return Err(TombolaError::Config("agency_id must not be empty".into()));
        }
        if self.server_address.is_empty() {
            return Err(TombolaError::Config(
                "server_address must not be empty".into(),
            ));
        }
        if self.batch_size == 0 {
            return Err(TombolaError::Config("batch_size must be positive".into()));
        }
        if self.backoff_base_secs == 0 {
            return Err(TombolaError::Config(
                "backoff_base_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Initial poll backoff as a duration.
    pub fn backoff_base(&self) -> Duration {
        Duration::from_secs(self.backoff_base_secs)
    }

    /// Optional poll backoff cap as a duration.
    pub fn backoff_cap(&self) -> Option<Duration> {
        self.backoff_cap_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ClientConfig {
        serde_json::from_str(
            r#"{
                "agency_id": "1",
                "server_address": "127.0.0.1:12345",
                "records_path": "agency-1.csv"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let config = sample();
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.backoff_base_secs, DEFAULT_BACKOFF_BASE_SECS);
        assert!(!config.strict_confirmation);
        assert!(config.backoff_cap_secs.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_explicit_values_parsed() {
        let config: ClientConfig = serde_json::from_str(
            r#"{
                "agency_id": "3",
                "server_address": "authority:9090",
                "batch_size": 50,
                "records_path": "bets.csv",
                "strict_confirmation": true,
                "backoff_base_secs": 2,
                "backoff_cap_secs": 60
            }"#,
        )
        .unwrap();

        assert_eq!(config.batch_size, 50);
        assert!(config.strict_confirmation);
        assert_eq!(config.backoff_base(), Duration::from_secs(2));
        assert_eq!(config.backoff_cap(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_validate_rejects_zero_batch_size() {
        let mut config = sample();
        config.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_agency() {
        let mut config = sample();
        config.agency_id.clear();
        assert!(config.validate().is_err());
    }
}
