pub mod handler;
pub mod resolver;
pub mod secrets;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

use alarm_relay_common::config::RelayConfig;
use alarm_relay_notifier::DiscordClient;

use crate::handler::Relay;
use crate::resolver::EndpointResolver;
use crate::secrets::AwsSecretSource;

/// Wire up a [`Relay`] backed by AWS Secrets Manager.
///
/// No AWS call is made here; the secret is fetched on the first invocation.
pub async fn build_relay(config: &RelayConfig) -> anyhow::Result<Relay> {
    let secrets = Arc::new(AwsSecretSource::from_env(config.secret_timeout).await);
    let resolver = EndpointResolver::from_config(config, secrets);
    let client = DiscordClient::from_config(config)?;

    tracing::info!(
        static_endpoint = config.webhook_url.is_some(),
        secret_configured = config.secret_arn.is_some(),
        http_timeout_ms = config.http_timeout.as_millis() as u64,
        "Relay initialised"
    );

    Ok(Relay::new(resolver, client))
}

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "alarm_relay=info,alarm_relay_notifier=info";

/// JSON subscriber installed by the Lambda binary.
///
/// One flattened object per event (`level`, `message`, then the event's
/// fields). CloudWatch adds the ingestion time, so no timestamp, target or span.
pub fn lambda_log_subscriber<W>(make_writer: W) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_target(false)
        .without_time()
        .with_writer(make_writer)
        .finish()
}
