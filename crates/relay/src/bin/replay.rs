//! Alarm Relay Replay
//!
//! Runs a captured SNS event through the same pipeline the Lambda uses,
//! without the Lambda runtime. Handy for re-sending an alarm that failed to
//! deliver, or for checking how a message renders in a test channel.
//!
//! ## Usage
//!
//! ```bash
//! # Event from a file
//! DISCORD_WEBHOOK_URL="https://discord.com/api/webhooks/..." cargo run --bin replay -- event.json
//!
//! # Event from stdin, webhook URL from Secrets Manager
//! DISCORD_SECRET_ARN="arn:aws:secretsmanager:..." cargo run --bin replay < event.json
//! ```

use std::io::Read;

use anyhow::Context;

use alarm_relay::build_relay;
use alarm_relay_common::config::RelayConfig;
use alarm_relay_common::types::SnsEvent;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "alarm_relay=debug,alarm_relay_notifier=debug".into()),
        )
        .init();

    let raw = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read event file {path}"))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read event from stdin")?;
            buf
        }
    };

    let event: SnsEvent = serde_json::from_str(&raw).context("Event is not a valid SNS event")?;
    tracing::info!(records = event.records.len(), "Replaying SNS event");

    let config = RelayConfig::from_env()?;
    let relay = build_relay(&config).await?;
    let summary = relay.handle(event).await?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
