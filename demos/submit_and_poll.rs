//! Submit an agency's bet file and poll for the winners.
//!
//! Usage:
//!   cargo run --example submit_and_poll -- config.json
//!
//! Configuration values can be overridden with TOMBOLA_* environment
//! variables (e.g. TOMBOLA_AGENCY_ID, TOMBOLA_SERVER_ADDRESS).

use tombola_client::Client;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tombola_client=debug".into()),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.json".to_string());

    let client = Client::from_config_file(&config_path).await?;

    let report = client.submit_bets().await?;
    tracing::info!(
        batches = report.batches,
        bets = report.bets,
        "all bets submitted"
    );

    let winners = client.poll_winners().await?;
    tracing::info!(count = winners.len(), "drawing complete");
    for document in winners {
        println!("{}", document);
    }

    Ok(())
}
