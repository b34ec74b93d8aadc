use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::entities::app_users::AppUserEntity;

/// Outbound renewal reminder. One attempt per user per run; a failed
/// dispatch is reported to the caller and never retried here.
#[automock]
#[async_trait]
pub trait ExpiryNotifier {
    async fn notify_expiring_soon(&self, user: AppUserEntity, days_left: i64) -> Result<()>;
}
