mod alerts;

use alerts::{AlertContext, OpsWebhookLayer};
use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt,
};
use url::Url;

/// Initializes tracing for a binary: an `EnvFilter` honoring RUST_LOG with
/// an `info` default, RFC3339 local timestamps, and an optional webhook sink
/// that forwards error-level events to the ops channel.
pub fn init_observability(component: &str) -> Result<()> {
    let context = AlertContext::from_env(component);
    let (webhook_url, config_warning) = ops_webhook_from_env();

    let alert_layer = webhook_url.clone().map(|url| {
        OpsWebhookLayer::new(url, context.clone())
            .with_filter(tracing_subscriber::filter::LevelFilter::ERROR)
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Local time so operators see timestamps in the deployment timezone.
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339());

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(alert_layer)
        .with(env_filter)
        .try_init()?;

    if let Some(warning) = config_warning {
        warn!(
            service = %context.service_name,
            component = %context.component,
            warning = %warning,
            "Observability config warning"
        );
    }

    if webhook_url.is_some() {
        info!(
            service = %context.service_name,
            environment = %context.environment,
            component = %context.component,
            "Ops error alerts enabled"
        );
    } else {
        info!(
            service = %context.service_name,
            environment = %context.environment,
            component = %context.component,
            "Ops error alerts disabled"
        );
    }

    Ok(())
}

fn ops_webhook_from_env() -> (Option<Url>, Option<String>) {
    let raw = match std::env::var("OPS_ALERT_WEBHOOK_URL") {
        Ok(value) if !value.trim().is_empty() => value,
        _ => return (None, None),
    };

    match Url::parse(raw.trim()) {
        Ok(url) => (Some(url), None),
        // Keep the raw URL out of logs; webhook URLs embed secrets.
        Err(err) => (
            None,
            Some(format!(
                "OPS_ALERT_WEBHOOK_URL is set but invalid; ops alerts disabled (parse error: {err})"
            )),
        ),
    }
}
