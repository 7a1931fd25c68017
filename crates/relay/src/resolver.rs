//! Webhook endpoint resolution.
//!
//! The endpoint comes from the first [`ResolutionStep`] in [`RESOLUTION_ORDER`]
//! that yields a value:
//! 1. `Static` — `DISCORD_WEBHOOK_URL`, used as-is
//! 2. `Cached` — a value already fetched by this resolver
//! 3. `SecretStore` — fetched once from the secret store, then cached
//!
//! The cache lives on the resolver instance, which is built once per process
//! and shared by every invocation. A successful fetch is never repeated; a
//! failed one leaves the cache empty.

use std::sync::Arc;

use tokio::sync::OnceCell;

use alarm_relay_common::config::RelayConfig;
use alarm_relay_common::error::RelayError;

use crate::secrets::SecretSource;

/// One way of obtaining the webhook endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStep {
    Static,
    Cached,
    SecretStore,
}

/// Precedence of the resolution steps, highest first.
pub const RESOLUTION_ORDER: [ResolutionStep; 3] = [
    ResolutionStep::Static,
    ResolutionStep::Cached,
    ResolutionStep::SecretStore,
];

/// Resolves and caches the Discord webhook URL.
pub struct EndpointResolver {
    static_endpoint: Option<String>,
    secret_id: Option<String>,
    secrets: Arc<dyn SecretSource>,
    cache: OnceCell<String>,
}

impl std::fmt::Debug for EndpointResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The endpoint embeds the webhook token; never print it.
        f.debug_struct("EndpointResolver")
            .field("has_static_endpoint", &self.static_endpoint.is_some())
            .field("secret_id", &self.secret_id)
            .field("cached", &self.cache.initialized())
            .finish_non_exhaustive()
    }
}

impl EndpointResolver {
    pub fn new(
        static_endpoint: Option<String>,
        secret_id: Option<String>,
        secrets: Arc<dyn SecretSource>,
    ) -> Self {
        Self {
            static_endpoint,
            secret_id,
            secrets,
            cache: OnceCell::new(),
        }
    }

    pub fn from_config(config: &RelayConfig, secrets: Arc<dyn SecretSource>) -> Self {
        Self::new(config.webhook_url.clone(), config.secret_arn.clone(), secrets)
    }

    /// Return the webhook endpoint, fetching it from the secret store on first use.
    pub async fn resolve_endpoint(&self) -> Result<String, RelayError> {
        for step in RESOLUTION_ORDER {
            if let Some(endpoint) = self.try_step(step).await? {
                tracing::debug!(?step, "Resolved Discord webhook endpoint");
                return Ok(endpoint);
            }
        }

        Err(RelayError::Configuration(
            "Discord webhook is not configured. Set DISCORD_SECRET_ARN or DISCORD_WEBHOOK_URL."
                .to_string(),
        ))
    }

    /// Run a single step. `Ok(None)` means "not applicable, try the next one".
    pub async fn try_step(&self, step: ResolutionStep) -> Result<Option<String>, RelayError> {
        match step {
            ResolutionStep::Static => Ok(self.static_endpoint.clone()),
            ResolutionStep::Cached => Ok(self.cache.get().cloned()),
            ResolutionStep::SecretStore => {
                let Some(secret_id) = self.secret_id.as_deref() else {
                    return Ok(None);
                };
                let endpoint = self
                    .cache
                    .get_or_try_init(|| self.fetch(secret_id))
                    .await?;
                Ok(Some(endpoint.clone()))
            }
        }
    }

    async fn fetch(&self, secret_id: &str) -> Result<String, RelayError> {
        tracing::info!(secret_id, "Fetching Discord webhook URL from secret store");
        self.secrets.get_secret(secret_id).await?.into_text()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::secrets::SecretPayload;

    const STATIC_URL: &str = "https://discord.com/api/webhooks/1/static";
    const SECRET_URL: &str = "https://discord.com/api/webhooks/2/secret";
    const SECRET_ARN: &str = "arn:aws:secretsmanager:ap-northeast-1:123456789012:secret:discord";

    /// Secret store double that counts calls and can fail the first N of them.
    struct CountingSecrets {
        payload: SecretPayload,
        calls: AtomicUsize,
        failures: usize,
    }

    impl CountingSecrets {
        fn new(payload: SecretPayload) -> Arc<Self> {
            Arc::new(Self {
                payload,
                calls: AtomicUsize::new(0),
                failures: 0,
            })
        }

        fn failing_first(failures: usize) -> Arc<Self> {
            Arc::new(Self {
                payload: SecretPayload::Text(SECRET_URL.to_string()),
                calls: AtomicUsize::new(0),
                failures,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SecretSource for CountingSecrets {
        async fn get_secret(&self, _secret_id: &str) -> Result<SecretPayload, RelayError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            if call < self.failures {
                return Err(RelayError::secret_access("ThrottlingException"));
            }
            Ok(self.payload.clone())
        }
    }

    #[tokio::test]
    async fn test_static_endpoint_wins() {
        let secrets = CountingSecrets::new(SecretPayload::Text(SECRET_URL.to_string()));
        let resolver = EndpointResolver::new(
            Some(STATIC_URL.to_string()),
            Some(SECRET_ARN.to_string()),
            secrets.clone(),
        );

        assert_eq!(resolver.resolve_endpoint().await.unwrap(), STATIC_URL);
        assert_eq!(resolver.resolve_endpoint().await.unwrap(), STATIC_URL);
        assert_eq!(secrets.calls(), 0);
    }

    #[tokio::test]
    async fn test_secret_fetched_once() {
        let secrets = CountingSecrets::new(SecretPayload::Text(SECRET_URL.to_string()));
        let resolver = EndpointResolver::new(None, Some(SECRET_ARN.to_string()), secrets.clone());

        for _ in 0..3 {
            assert_eq!(resolver.resolve_endpoint().await.unwrap(), SECRET_URL);
        }
        assert_eq!(secrets.calls(), 1);
        assert_eq!(
            resolver.try_step(ResolutionStep::Cached).await.unwrap().as_deref(),
            Some(SECRET_URL)
        );
    }

    #[tokio::test]
    async fn test_concurrent_first_use_fetches_once() {
        let secrets = CountingSecrets::new(SecretPayload::Text(SECRET_URL.to_string()));
        let resolver = EndpointResolver::new(None, Some(SECRET_ARN.to_string()), secrets.clone());

        let (a, b) = tokio::join!(resolver.resolve_endpoint(), resolver.resolve_endpoint());
        assert_eq!(a.unwrap(), SECRET_URL);
        assert_eq!(b.unwrap(), SECRET_URL);
        assert_eq!(secrets.calls(), 1);
    }

    #[tokio::test]
    async fn test_binary_secret() {
        let secrets = CountingSecrets::new(SecretPayload::Binary(SECRET_URL.as_bytes().to_vec()));
        let resolver = EndpointResolver::new(None, Some(SECRET_ARN.to_string()), secrets);

        assert_eq!(resolver.resolve_endpoint().await.unwrap(), SECRET_URL);
    }

    #[tokio::test]
    async fn test_nothing_configured() {
        let secrets = CountingSecrets::new(SecretPayload::Text(SECRET_URL.to_string()));
        let resolver = EndpointResolver::new(None, None, secrets.clone());

        let err = resolver.resolve_endpoint().await.unwrap_err();
        assert!(matches!(err, RelayError::Configuration(_)));
        assert!(err.to_string().contains("DISCORD_SECRET_ARN"));
        assert_eq!(secrets.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_secret_is_not_cached() {
        let secrets = CountingSecrets::new(SecretPayload::Text(String::new()));
        let resolver = EndpointResolver::new(None, Some(SECRET_ARN.to_string()), secrets.clone());

        for _ in 0..2 {
            let err = resolver.resolve_endpoint().await.unwrap_err();
            assert!(matches!(err, RelayError::SecretAccess { .. }));
        }
        assert_eq!(secrets.calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_retried_next_time() {
        let secrets = CountingSecrets::failing_first(1);
        let resolver = EndpointResolver::new(None, Some(SECRET_ARN.to_string()), secrets.clone());

        let err = resolver.resolve_endpoint().await.unwrap_err();
        assert!(err.to_string().contains("ThrottlingException"));
        assert_eq!(resolver.try_step(ResolutionStep::Cached).await.unwrap(), None);

        assert_eq!(resolver.resolve_endpoint().await.unwrap(), SECRET_URL);
        assert_eq!(resolver.resolve_endpoint().await.unwrap(), SECRET_URL);
        assert_eq!(secrets.calls(), 2);
    }

    #[tokio::test]
    async fn test_steps_in_isolation() {
        let secrets = CountingSecrets::new(SecretPayload::Text(SECRET_URL.to_string()));
        let resolver = EndpointResolver::new(Some(STATIC_URL.to_string()), None, secrets);

        assert_eq!(
            resolver.try_step(ResolutionStep::Static).await.unwrap().as_deref(),
            Some(STATIC_URL)
        );
        assert_eq!(resolver.try_step(ResolutionStep::Cached).await.unwrap(), None);
        assert_eq!(resolver.try_step(ResolutionStep::SecretStore).await.unwrap(), None);
    }

    #[test]
    fn test_debug_hides_endpoint() {
        let secrets = CountingSecrets::new(SecretPayload::Text(SECRET_URL.to_string()));
        let resolver = EndpointResolver::new(Some(STATIC_URL.to_string()), None, secrets);
        assert!(!format!("{resolver:?}").contains("webhooks"));
    }
}
