use std::time::Duration;

/// Default total timeout for the webhook POST (seconds).
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Default operation timeout for the Secrets Manager lookup (seconds).
const DEFAULT_SECRET_TIMEOUT_SECS: u64 = 5;

/// Relay configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Static Discord webhook URL. Takes precedence over the secret.
    pub webhook_url: Option<String>,

    /// ARN (or name) of the Secrets Manager secret holding the webhook URL
    pub secret_arn: Option<String>,

    /// Total timeout applied to each webhook POST
    pub http_timeout: Duration,

    /// Operation timeout applied to the Secrets Manager call
    pub secret_timeout: Duration,

    /// User-Agent sent with every webhook POST
    pub user_agent: String,
}

impl RelayConfig {
    /// Load configuration from environment variables.
    ///
    /// Whether an endpoint source is configured at all is not checked here; the
    /// endpoint resolver reports that on first use.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key → value lookup. Empty values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let secs = |key: &str, default: u64| -> anyhow::Result<Duration> {
            let value = match var(key) {
                Some(raw) => raw
                    .parse()
                    .map_err(|_| anyhow::anyhow!("{key} must be a valid u64"))?,
                None => default,
            };
            Ok(Duration::from_secs(value))
        };

        Ok(Self {
            webhook_url: var("DISCORD_WEBHOOK_URL"),
            secret_arn: var("DISCORD_SECRET_ARN"),
            http_timeout: secs("HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?,
            secret_timeout: secs("SECRET_TIMEOUT_SECS", DEFAULT_SECRET_TIMEOUT_SECS)?,
            user_agent: var("USER_AGENT").unwrap_or_else(default_user_agent),
        })
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            secret_arn: None,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            secret_timeout: Duration::from_secs(DEFAULT_SECRET_TIMEOUT_SECS),
            user_agent: default_user_agent(),
        }
    }
}

/// `alarm-relay/<version>`
pub fn default_user_agent() -> String {
    format!("alarm-relay/{}", env!("CARGO_PKG_VERSION"))
}
