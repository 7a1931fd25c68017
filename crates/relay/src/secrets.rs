//! Secret storage access.
//!
//! [`SecretSource`] is the seam between the endpoint resolver and AWS Secrets
//! Manager, so the resolver can be exercised without AWS.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::timeout::TimeoutConfig;
use aws_sdk_secretsmanager::Client as SecretsManagerClient;
use aws_sdk_secretsmanager::error::DisplayErrorContext;

use alarm_relay_common::error::RelayError;

/// Raw secret value as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretPayload {
    Text(String),
    Binary(Vec<u8>),
}

impl SecretPayload {
    /// Decode the payload to text, rejecting empty values.
    pub fn into_text(self) -> Result<String, RelayError> {
        let text = match self {
            SecretPayload::Text(text) => text,
            SecretPayload::Binary(bytes) => String::from_utf8(bytes).map_err(|e| {
                RelayError::SecretAccess {
                    message: "Discord webhook secret is not valid UTF-8".to_string(),
                    source: Some(Box::new(e)),
                }
            })?,
        };

        if text.is_empty() {
            return Err(RelayError::secret_access("Discord webhook secret is empty"));
        }

        Ok(text)
    }
}

/// Keyed read access to a secret store.
#[async_trait]
pub trait SecretSource: Send + Sync {
    /// Fetch the current value of `secret_id`.
    async fn get_secret(&self, secret_id: &str) -> Result<SecretPayload, RelayError>;
}

/// AWS Secrets Manager backed [`SecretSource`].
#[derive(Debug, Clone)]
pub struct AwsSecretSource {
    client: SecretsManagerClient,
}

impl AwsSecretSource {
    /// Build a client from the default credential chain and region.
    ///
    /// `operation_timeout` bounds the whole `GetSecretValue` call, retries included.
    pub async fn from_env(operation_timeout: Duration) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(operation_timeout)
                    .build(),
            )
            .load()
            .await;

        Self::new(SecretsManagerClient::new(&sdk_config))
    }

    pub fn new(client: SecretsManagerClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretSource for AwsSecretSource {
    async fn get_secret(&self, secret_id: &str) -> Result<SecretPayload, RelayError> {
        let response = self
            .client
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|e| RelayError::SecretAccess {
                message: format!(
                    "Failed to retrieve Discord webhook secret: {}",
                    DisplayErrorContext(&e)
                ),
                source: Some(Box::new(aws_sdk_secretsmanager::Error::from(e))),
            })?;

        Ok(payload_from_parts(
            response.secret_string(),
            response.secret_binary().map(|blob| blob.as_ref()),
        ))
    }
}

/// Prefer the string form; fall back to the binary form when the string is
/// absent or empty. Neither present yields an empty text payload.
fn payload_from_parts(string: Option<&str>, binary: Option<&[u8]>) -> SecretPayload {
    match (string.filter(|s| !s.is_empty()), binary) {
        (Some(text), _) => SecretPayload::Text(text.to_string()),
        (None, Some(bytes)) => SecretPayload::Binary(bytes.to_vec()),
        (None, None) => SecretPayload::Text(String::new()),
    }
}
