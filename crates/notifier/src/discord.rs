//! Discord webhook delivery.
//!
//! One POST per message, no retries. Any status >= 300 is a failure; the
//! rejecting response is logged as a structured `ERROR` record before the
//! error is returned.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::redirect::Policy;

use alarm_relay_common::config::RelayConfig;
use alarm_relay_common::error::RelayError;

use crate::payload::{DiscordMessage, truncate_chars};

/// How much of a rejecting response body goes into the diagnostic record.
pub const RESPONSE_EXCERPT_LIMIT: usize = 512;

/// Most bytes read from a rejecting response body.
pub const RESPONSE_BODY_LIMIT: usize = 8 * 1024;

/// HTTP client for Discord incoming webhooks.
#[derive(Debug, Clone)]
pub struct DiscordClient {
    client: reqwest::Client,
}

impl DiscordClient {
    /// Build a client with a total request timeout and the given User-Agent.
    ///
    /// Redirects are not followed, so a 3xx answer surfaces as a rejection.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .redirect(Policy::none())
            .build()?;

        Ok(Self { client })
    }

    pub fn from_config(config: &RelayConfig) -> Result<Self, RelayError> {
        Self::new(config.http_timeout, &config.user_agent)
    }

    /// POST `message` to `endpoint`.
    pub async fn deliver(&self, endpoint: &str, message: &DiscordMessage) -> Result<(), RelayError> {
        let body = serde_json::to_vec(message)?;

        let response = self
            .client
            .post(endpoint)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status < 300 {
            tracing::debug!(status, "Discord webhook accepted message");
            return Ok(());
        }

        let body = read_body_bounded(response, RESPONSE_BODY_LIMIT).await;

        tracing::error!(
            status,
            response = %truncate_chars(&body, RESPONSE_EXCERPT_LIMIT),
            "Discord webhook rejected request"
        );

        Err(RelayError::Delivery { status, body })
    }
}

/// Read at most `limit` bytes of the body, decoding lossily.
async fn read_body_bounded(mut response: reqwest::Response, limit: usize) -> String {
    let mut buf: Vec<u8> = Vec::new();
    while buf.len() < limit {
        match response.chunk().await {
            Ok(Some(chunk)) => buf.extend_from_slice(&chunk),
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read Discord error response body");
                break;
            }
        }
    }
    buf.truncate(limit);
    String::from_utf8_lossy(&buf).into_owned()
}
