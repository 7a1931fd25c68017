//! Lambda entrypoint: SNS (CloudWatch alarms) → Discord webhook.

use std::sync::Arc;

use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use tracing_subscriber::util::SubscriberInitExt;

use alarm_relay::{build_relay, lambda_log_subscriber};
use alarm_relay::handler::RelaySummary;
use alarm_relay_common::config::RelayConfig;
use alarm_relay_common::types::SnsEvent;

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_log_subscriber(std::io::stdout).init();

    let config = RelayConfig::from_env()?;
    let relay = Arc::new(build_relay(&config).await?);

    run(service_fn(move |event: LambdaEvent<SnsEvent>| {
        let relay = Arc::clone(&relay);
        async move {
            tracing::debug!(request_id = %event.context.request_id, "Invocation started");
            let summary: RelaySummary = relay.handle(event.payload).await?;
            Ok::<_, Error>(summary)
        }
    }))
    .await
}
