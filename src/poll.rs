//! Winner-poll client.
//!
//! Each attempt opens a brand-new connection, sends a POLL request and reads
//! the response: AWAIT closes the connection and sleeps for the current
//! backoff before the next attempt, WINNERS returns the document list, and
//! anything else terminates the loop with a protocol error. Connections are
//! never reused across attempts.
//!
//! The backoff starts at the configured base and doubles after every AWAIT,
//! without jitter. It is unbounded unless `backoff_cap` is set.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::config::ClientConfig;
use crate::error::{Result, TombolaError};
use crate::protocol::{encode_poll, tags, MAX_FIELD_SIZE};
use crate::transport::{connect, Connection};

/// Upper bound on the winner-list reservation made from a wire-supplied
/// count.
///
/// The count byte comes straight off the network; a corrupt value must fail
/// on the field reads that follow, not size an allocation. Lists longer than
/// this still decode, they just grow the vector as fields arrive.
const MAX_WINNERS_PREALLOC: usize = 1024;

/// Doubling backoff schedule for AWAIT outcomes.
#[derive(Debug, Clone)]
pub struct Backoff {
    current: Duration,
    cap: Option<Duration>,
}

impl Backoff {
    /// Create a schedule starting at `base`, optionally clamped at `cap`.
    pub fn new(base: Duration, cap: Option<Duration>) -> Self {
        Self { current: base, cap }
    }

    /// Delay to apply before the next attempt. Doubles on every call.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        let doubled = self.current.saturating_mul(2);
        self.current = match self.cap {
            Some(cap) => doubled.min(cap),
            None => doubled,
        };
        delay
    }
}

/// Client that polls the authority until winners are available.
pub struct WinnerPollClient {
    agency_id: String,
    server_address: String,
    backoff: Backoff,
}

impl WinnerPollClient {
    /// Build a poll client from the shared configuration.
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            agency_id: config.agency_id.clone(),
            server_address: config.server_address.clone(),
            backoff: Backoff::new(config.backoff_base(), config.backoff_cap()),
        }
    }

    /// Poll until the authority reports winners.
    ///
    /// Terminates on winners or on the first error; an AWAIT response is not
    /// an error, it schedules the next attempt.
    pub async fn poll_until_done(&mut self) -> Result<Vec<String>> {
        // An unparseable agency id fails before any connection is opened.
        let request = encode_poll(&self.agency_id)?;

        loop {
            let mut conn = connect(&self.server_address).await?;
            let outcome = Self::poll_once(&mut conn, &request).await;
            let closed = conn.close().await;

            match outcome? {
                Some(winners) => {
                    closed?;
                    tracing::info!(count = winners.len(), "winners received");
                    return Ok(winners);
                }
                None => {
                    closed?;
                    let delay = self.backoff.next_delay();
                    tracing::debug!(delay_secs = delay.as_secs_f64(), "drawing not ready");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Run one poll attempt over `conn`.
    ///
    /// Returns `Ok(None)` for AWAIT and `Ok(Some(winners))` for WINNERS.
    /// Exposed to the loop so the connection can be closed on every exit
    /// path before the result is inspected.
    async fn poll_once<S: AsyncRead + AsyncWrite + Unpin>(
        conn: &mut Connection<S>,
        request: &[u8],
    ) -> Result<Option<Vec<String>>> {
        conn.send_all(request).await?;

        match conn.read_byte().await? {
            tags::AWAIT => Ok(None),
            tags::WINNERS => Ok(Some(Self::read_winners(conn).await?)),
            other => Err(TombolaError::Protocol(format!(
                "Unknown poll status byte {:#04x}",
                other
            ))),
        }
    }

    /// Read the count-prefixed Document fields of a WINNERS response.
    async fn read_winners<S: AsyncRead + AsyncWrite + Unpin>(
        conn: &mut Connection<S>,
    ) -> Result<Vec<String>> {
        let count = conn.read_u32_be().await?;
        let mut winners = Vec::with_capacity((count as usize).min(MAX_WINNERS_PREALLOC));

        for _ in 0..count {
            let tag = conn.read_byte().await?;
            if tag != tags::DOCUMENT {
                return Err(TombolaError::Protocol(format!(
                    "Unexpected tag {:#04x} in winner list, expected DOCUMENT",
                    tag
                )));
            }
            let len = conn.read_u32_be().await?;
            if len > MAX_FIELD_SIZE {
                return Err(TombolaError::Protocol(format!(
                    "Winner field length {} exceeds maximum {}",
                    len, MAX_FIELD_SIZE
                )));
            }
            let raw = conn.read_exact(len as usize).await?;
            let document = String::from_utf8(raw).map_err(|e| {
                TombolaError::Protocol(format!("Invalid UTF-8 in winner document: {}", e))
            })?;
            winners.push(document);
        }

        Ok(winners)
    }
}
