//! Client entry point.
//!
//! Ties the pieces together for one agency run: a submission session over
//! the configured record source, then (separately) the winner poll. The two
//! phases run sequentially, never concurrently, and share only the agency
//! id and the server address.

use crate::config::ClientConfig;
use crate::error::Result;
use crate::poll::WinnerPollClient;
use crate::records::{BetSource, CsvBetSource};
use crate::session::{SubmissionReport, SubmissionSession};

/// Lottery client for one agency.
pub struct Client {
    config: ClientConfig,
}

impl Client {
    /// Create a client from a validated configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Load configuration from a JSON file (with environment overrides) and
    /// create the client.
    pub async fn from_config_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let config = ClientConfig::load(path).await?;
        Ok(Self { config })
    }

    /// The active configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Submit every bet from the configured records file.
    ///
    /// Opens one connection for the whole run and closes it on every exit
    /// path. A confirmation failure aborts the run; nothing is retried.
    pub async fn submit_bets(&self) -> Result<SubmissionReport> {
        let mut source = CsvBetSource::open(&self.config.records_path).await?;
        self.submit_from(&mut source).await
    }

    /// Submit every bet from an arbitrary source.
    pub async fn submit_from(&self, source: &mut impl BetSource) -> Result<SubmissionReport> {
        let session = SubmissionSession::connect(&self.config).await?;
        session.run(source).await
    }

    /// Poll the authority until this agency's winners are available.
    ///
    /// Each attempt uses a fresh connection; AWAIT responses back off with
    /// doubling delays.
    pub async fn poll_winners(&self) -> Result<Vec<String>> {
        let mut poll = WinnerPollClient::new(&self.config);
        poll.poll_until_done().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_invalid_config() {
        let config: ClientConfig = serde_json::from_str(
            r#"{
                "agency_id": "1",
                "server_address": "127.0.0.1:12345",
                "batch_size": 0,
                "records_path": "x.csv"
            }"#,
        )
        .unwrap();

        assert!(Client::new(config).is_err());
    }

    #[test]
    fn test_new_accepts_valid_config() {
        let config: ClientConfig = serde_json::from_str(
            r#"{
                "agency_id": "1",
                "server_address": "127.0.0.1:12345",
                "records_path": "x.csv"
            }"#,
        )
        .unwrap();

        let client = Client::new(config).unwrap();
        assert_eq!(client.config().agency_id, "1");
    }
}
