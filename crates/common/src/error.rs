use thiserror::Error;

/// Boxed underlying cause kept for diagnostics.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Common error types used across the relay.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Neither a static webhook URL nor a secret identifier is configured.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The secret could not be fetched, or its value is unusable.
    #[error("Secret access error: {message}")]
    SecretAccess {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The webhook answered with a status >= 300. `body` is capped at
    /// `RESPONSE_BODY_LIMIT` bytes by the delivery client.
    #[error("Discord webhook failed with status {status}: {body}")]
    Delivery { status: u16, body: String },

    /// The webhook could not be reached at all.
    #[error("Discord webhook transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RelayError {
    /// Shorthand for a `SecretAccess` error without an underlying cause.
    pub fn secret_access(message: impl Into<String>) -> Self {
        RelayError::SecretAccess {
            message: message.into(),
            source: None,
        }
    }
}
