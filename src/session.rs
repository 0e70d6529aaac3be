//! Batch submission session.
//!
//! Lifecycle: connect once, then for each batch pulled from the record
//! source encode and send it as one BATCH message (a single logical write)
//! and block for exactly one confirmation. After the source is exhausted any
//! partial batch is flushed, a FINISH marker is sent, and the connection is
//! closed. The close runs on every exit path, success or failure.
//!
//! Any confirmation failure (wrong marker, transport error, mismatched echo
//! in strict mode) is fatal to the run; no batch is ever retried.

use tokio::io::{AsyncRead, AsyncWrite};

use crate::config::ClientConfig;
use crate::error::{Result, TombolaError};
use crate::protocol::{encode_batch, encode_finish, tags, Bet, MAX_FIELD_SIZE};
use crate::records::BetSource;
use crate::transport::{connect, Connection, TcpConnection};

/// Summary of a completed submission run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionReport {
    /// Batches sent and confirmed.
    pub batches: usize,
    /// Total bets submitted.
    pub bets: usize,
}

/// One submission run over one connection.
pub struct SubmissionSession<S> {
    conn: Connection<S>,
    agency_id: String,
    batch_size: usize,
    strict_confirmation: bool,
}

impl SubmissionSession<tokio::net::TcpStream> {
    /// Dial the authority and open a session for the whole run.
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        let conn: TcpConnection = connect(&config.server_address).await?;
        tracing::debug!(addr = %config.server_address, "submission session connected");
        Ok(Self::over(
            conn,
            config.agency_id.clone(),
            config.batch_size,
            config.strict_confirmation,
        ))
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> SubmissionSession<S> {
    /// Build a session over an already-connected stream.
    pub fn over(
        conn: Connection<S>,
        agency_id: String,
        batch_size: usize,
        strict_confirmation: bool,
    ) -> Self {
        Self {
            conn,
            agency_id,
            batch_size,
            strict_confirmation,
        }
    }

    /// Submit every bet from `source`, then send FINISH and close.
    ///
    /// The connection is closed unconditionally, even when submission or
    /// FINISH fails; the first error wins.
    pub async fn run(mut self, source: &mut impl BetSource) -> Result<SubmissionReport> {
        let outcome = self.submit_all(source).await;
        let closed = self.conn.close().await;

        let report = outcome?;
        closed?;
        tracing::info!(
            batches = report.batches,
            bets = report.bets,
            "submission finished"
        );
        Ok(report)
    }

    async fn submit_all(&mut self, source: &mut impl BetSource) -> Result<SubmissionReport> {
        let mut report = SubmissionReport { batches: 0, bets: 0 };
        let mut buffer: Vec<Bet> = Vec::with_capacity(self.batch_size);

        while let Some(bet) = source.next_bet().await? {
            buffer.push(bet);
            if buffer.len() == self.batch_size {
                self.submit_batch(&buffer, &mut report).await?;
                buffer.clear();
            }
        }

        // Final batch of the run may be smaller than batch_size.
        if !buffer.is_empty() {
            self.submit_batch(&buffer, &mut report).await?;
        }

        self.conn.send_all(&encode_finish()).await?;
        Ok(report)
    }

    /// Send one batch as a single logical write, then block for exactly one
    /// confirmation.
    async fn submit_batch(&mut self, batch: &[Bet], report: &mut SubmissionReport) -> Result<()> {
        let data = encode_batch(&self.agency_id, batch);
        self.conn.send_all(&data).await?;

        let last_number = batch.last().map(|b| b.number.as_str()).unwrap_or_default();
        self.wait_confirmation(last_number).await?;

        report.batches += 1;
        report.bets += batch.len();
        tracing::debug!(
            batch = report.batches,
            size = batch.len(),
            "batch confirmed"
        );
        Ok(())
    }

    /// Read one confirmation. The first byte must be OK; in strict mode an
    /// echoed Number field follows and must match the last sent bet's
    /// number.
    async fn wait_confirmation(&mut self, expected_number: &str) -> Result<()> {
        let status = self.conn.read_byte().await?;
        if status != tags::OK {
            return Err(TombolaError::Confirmation(format!(
                "Expected OK, got {:#04x}",
                status
            )));
        }

        if self.strict_confirmation {
            let echoed = self.read_number_echo().await?;
            if echoed != expected_number {
                return Err(TombolaError::Confirmation(format!(
                    "Echoed number {:?} does not match sent {:?}",
                    echoed, expected_number
                )));
            }
        }

        Ok(())
    }

    async fn read_number_echo(&mut self) -> Result<String> {
        let tag = self.conn.read_byte().await?;
        if tag != tags::NUMBER {
            return Err(TombolaError::Protocol(format!(
                "Unexpected tag {:#04x} in confirmation echo, expected NUMBER",
                tag
            )));
        }
        let len = self.conn.read_u32_be().await?;
        if len > MAX_FIELD_SIZE {
            return Err(TombolaError::Protocol(format!(
                "Echo field length {} exceeds maximum {}",
                len, MAX_FIELD_SIZE
            )));
        }
        let raw = self.conn.read_exact(len as usize).await?;
        String::from_utf8(raw)
            .map_err(|e| TombolaError::Protocol(format!("Invalid UTF-8 in echo field: {}", e)))
    }
}
