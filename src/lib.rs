//! # tombola-client
//!
//! Client agent for a national lottery authority. Submits batches of betting
//! records over a persistent TCP connection using a length-prefixed binary
//! (TLV) protocol, then separately polls the authority until winner results
//! become available, backing off exponentially between attempts.
//!
//! ## Architecture
//!
//! - **Protocol** (pure): TLV codec between bet/batch/winner values and wire
//!   bytes, all integers Big Endian.
//! - **Transport**: byte-exact send/receive over a stream socket, hiding
//!   partial-read and partial-write anomalies.
//! - **Session**: one connection per submission run; per-batch confirmation
//!   handshake, FINISH marker, unconditional close.
//! - **Poll**: one fresh connection per attempt; AWAIT doubles the backoff,
//!   WINNERS terminates the loop.
//!
//! ## Example
//!
//! ```ignore
//! use tombola_client::Client;
//!
//! #[tokio::main]
//! async fn main() -> tombola_client::Result<()> {
//!     let client = Client::from_config_file("config.json").await?;
//!     let report = client.submit_bets().await?;
//!     println!("submitted {} bets in {} batches", report.bets, report.batches);
//!
//!     let winners = client.poll_winners().await?;
//!     println!("winners: {:?}", winners);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod poll;
pub mod protocol;
pub mod records;
pub mod session;
pub mod transport;

mod client;

pub use client::Client;
pub use config::ClientConfig;
pub use error::{Result, TombolaError};
pub use protocol::{Bet, PollOutcome};
pub use session::SubmissionReport;
