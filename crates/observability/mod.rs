mod alerts;
mod config;
mod discord;
mod layer;
mod redaction;

use std::sync::Arc;

use alerts::AlertDispatcher;
use anyhow::Result;
use config::ObservabilityConfig;
use discord::DiscordAlertSink;
use layer::AlertLayer;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Installs the global subscriber: `RUST_LOG` filtered fmt output plus the
/// optional Discord alert sink. Must run inside a tokio runtime.
pub fn init_observability(component: &str) -> Result<()> {
    let mut config = ObservabilityConfig::from_env(component);

    let alert_layer = match config.discord.as_ref() {
        Some(discord) => match DiscordAlertSink::new(discord.webhook_url.clone()) {
            Ok(sink) => {
                let dispatcher = AlertDispatcher::spawn(vec![Arc::new(sink)], discord.queue_capacity);
                Some(
                    AlertLayer::new(dispatcher, config.service_context.clone())
                        .with_filter(LevelFilter::from_level(discord.min_level)),
                )
            }
            Err(err) => {
                config
                    .warnings
                    .push(format!("Discord alert sink unavailable: {err}"));
                None
            }
        },
        None => None,
    };
    let alerts_enabled = alert_layer.is_some();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339());

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(alert_layer)
        .with(env_filter)
        .try_init()?;

    for warning in &config.warnings {
        warn!(
            service = %config.service_context.service_name,
            environment = %config.service_context.environment,
            component = %config.service_context.component,
            warning = %warning,
            "observability: config warning"
        );
    }

    info!(
        service = %config.service_context.service_name,
        environment = %config.service_context.environment,
        component = %config.service_context.component,
        alerts_enabled,
        "observability: initialized"
    );

    Ok(())
}
