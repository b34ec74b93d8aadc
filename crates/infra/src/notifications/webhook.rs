use anyhow::{Result, anyhow};
use async_trait::async_trait;
use domain::{
    entities::app_users::AppUserEntity, repositories::expiry_notifications::ExpiryNotifier,
};
use reqwest::Client;
use serde_json::json;
use tracing::debug;
use url::Url;

/// Posts renewal reminders to a webhook (typically bridged to the mailer).
/// One short-timeout attempt per call; the caller decides what a failure
/// means.
pub struct WebhookExpiryNotifier {
    webhook_url: Url,
    client: Client,
}

impl WebhookExpiryNotifier {
    pub fn new(webhook_url: Url) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(3))
            .build()
            .expect("reqwest client must build");

        Self {
            webhook_url,
            client,
        }
    }
}

#[async_trait]
impl ExpiryNotifier for WebhookExpiryNotifier {
    async fn notify_expiring_soon(&self, user: AppUserEntity, days_left: i64) -> Result<()> {
        let payload = json!({
            "kind": "subscription_expiring_soon",
            "user_id": user.id,
            "email": user.email,
            "plan_id": user.current_plan_id,
            "expires_at": user.plan_expires_at,
            "days_left": days_left,
        });

        let response = self
            .client
            .post(self.webhook_url.clone())
            .json(&payload)
            .send()
            .await
            .map_err(sanitize_reqwest_error)?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(anyhow!(
            "reminder webhook returned non-success status: {}",
            response.status()
        ))
    }
}

/// Used when no reminder webhook is configured: reminders are logged and
/// counted as delivered.
pub struct NoopExpiryNotifier;

#[async_trait]
impl ExpiryNotifier for NoopExpiryNotifier {
    async fn notify_expiring_soon(&self, user: AppUserEntity, days_left: i64) -> Result<()> {
        debug!(
            user_id = %user.id,
            days_left,
            "reminder webhook not configured; dropping renewal reminder"
        );
        Ok(())
    }
}

fn sanitize_reqwest_error(error: reqwest::Error) -> anyhow::Error {
    if error.is_timeout() {
        return anyhow!("reminder webhook request timed out");
    }
    if error.is_connect() {
        return anyhow!("reminder webhook connection failed");
    }
    anyhow!("reminder webhook request failed")
}
