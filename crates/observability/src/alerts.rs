use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde_json::json;
use std::collections::BTreeMap;
use std::env;
use tokio::sync::mpsc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber, warn};
use tracing_subscriber::{Layer, layer::Context, registry::LookupSpan};
use url::Url;

#[derive(Clone)]
pub(crate) struct AlertContext {
    pub(crate) service_name: String,
    pub(crate) environment: String,
    pub(crate) component: String,
}

impl AlertContext {
    pub(crate) fn from_env(component: &str) -> Self {
        let component = component.trim().to_string();

        let service_name = env::var("SERVICE_NAME")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| component.clone());

        let environment = env::var("STAGE")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "unknown".to_string());

        Self {
            service_name,
            environment,
            component,
        }
    }
}

#[derive(Debug)]
struct OpsAlert {
    timestamp: DateTime<Utc>,
    target: String,
    message: Option<String>,
    fields: BTreeMap<String, String>,
}

/// Forwards error-level events to an ops webhook. Events go through a
/// bounded queue drained by a background task; when the queue is full the
/// alert is dropped rather than blocking the caller.
pub(crate) struct OpsWebhookLayer {
    tx: mpsc::Sender<OpsAlert>,
}

impl OpsWebhookLayer {
    pub(crate) fn new(webhook_url: Url, context: AlertContext) -> Self {
        let (tx, mut rx) = mpsc::channel::<OpsAlert>(256);

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(3))
            .build()
            .expect("reqwest client must build");

        tokio::spawn(async move {
            while let Some(alert) = rx.recv().await {
                let payload = json!({
                    "service": context.service_name,
                    "environment": context.environment,
                    "component": context.component,
                    "level": "error",
                    "timestamp": alert.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
                    "target": alert.target,
                    "message": alert.message,
                    "fields": alert.fields,
                });

                let sent = client.post(webhook_url.clone()).json(&payload).send().await;
                match sent {
                    Ok(response) if response.status().is_success() => {}
                    Ok(response) => {
                        warn!(status = %response.status(), "Ops alert webhook returned non-success status");
                    }
                    Err(error) => {
                        let reason = if error.is_timeout() {
                            "timed out"
                        } else if error.is_connect() {
                            "connection failed"
                        } else {
                            "request failed"
                        };
                        warn!(reason, "Ops alert webhook dispatch failed");
                    }
                }
            }
        });

        Self { tx }
    }
}

#[derive(Default)]
struct FieldMapVisitor {
    values: BTreeMap<String, String>,
}

impl Visit for FieldMapVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.values
            .insert(field.name().to_string(), redact(field.name(), format!("{value:?}")));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.values
            .insert(field.name().to_string(), redact(field.name(), value.to_string()));
    }
}

impl<S> Layer<S> for OpsWebhookLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != Level::ERROR {
            return;
        }

        let mut visitor = FieldMapVisitor::default();
        event.record(&mut visitor);

        let message = visitor
            .values
            .remove("message")
            .map(|raw| unquote_debug_string(&raw));

        let alert = OpsAlert {
            timestamp: Utc::now(),
            target: event.metadata().target().to_string(),
            message,
            fields: visitor.values,
        };

        if self.tx.try_send(alert).is_err() {
            warn!("Ops alert queue full or closed; dropping alert");
        }
    }
}

fn unquote_debug_string(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        return trimmed[1..trimmed.len() - 1].to_string();
    }
    trimmed.to_string()
}

fn redact(field_name: &str, value: String) -> String {
    let field = field_name.to_ascii_lowercase();
    let sensitive = field.contains("webhook")
        || field.contains("secret")
        || field.contains("password")
        || field.contains("token")
        || field.contains("authorization");

    if sensitive {
        return "[REDACTED]".to_string();
    }
    value
}
