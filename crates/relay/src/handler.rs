//! Per-invocation pipeline: resolve the endpoint, then build and deliver one
//! Discord message per SNS record, in order.

use serde::{Deserialize, Serialize};

use alarm_relay_common::error::RelayError;
use alarm_relay_common::types::SnsEvent;
use alarm_relay_notifier::{DiscordClient, build_payload};

use crate::resolver::EndpointResolver;

/// Outcome of one invocation, returned as the Lambda response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelaySummary {
    pub delivered: usize,
    pub skipped: usize,
}

/// Long-lived relay state, built once per process.
#[derive(Debug)]
pub struct Relay {
    resolver: EndpointResolver,
    client: DiscordClient,
}

impl Relay {
    pub fn new(resolver: EndpointResolver, client: DiscordClient) -> Self {
        Self { resolver, client }
    }

    /// Relay every record of `event` to Discord.
    ///
    /// The first failed delivery aborts the batch: later records are not
    /// attempted and earlier ones stay delivered.
    pub async fn handle(&self, event: SnsEvent) -> Result<RelaySummary, RelayError> {
        let endpoint = self.resolver.resolve_endpoint().await?;
        let mut summary = RelaySummary::default();

        for (index, record) in event.records.iter().enumerate() {
            let Some(message) = record.sns.message.as_deref().filter(|m| !m.is_empty()) else {
                tracing::debug!(index, "Skipping SNS record without a message");
                summary.skipped += 1;
                continue;
            };

            let payload = build_payload(message);
            if let Err(e) = self.client.deliver(&endpoint, &payload).await {
                tracing::debug!(
                    index,
                    delivered = summary.delivered,
                    message_id = record.sns.message_id.as_deref().unwrap_or("-"),
                    topic_arn = record.sns.topic_arn.as_deref().unwrap_or("-"),
                    error = %e,
                    "Aborting batch after failed delivery"
                );
                return Err(e);
            }

            tracing::debug!(
                index,
                message_id = record.sns.message_id.as_deref().unwrap_or("-"),
                topic_arn = record.sns.topic_arn.as_deref().unwrap_or("-"),
                "Delivered SNS record"
            );
            summary.delivered += 1;
        }

        tracing::info!(
            records = event.records.len(),
            delivered = summary.delivered,
            skipped = summary.skipped,
            "Relayed SNS batch to Discord"
        );

        Ok(summary)
    }
}
