use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::entities::app_users::AppUserEntity;
use crate::value_objects::subscriptions::{PlanAssignment, SubscriptionOverview};

#[automock]
#[async_trait]
pub trait SubscriptionRepository {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<AppUserEntity>>;

    /// Users on a monthly or yearly plan whose expiry is in the past. Free
    /// and lifetime plans never match; they carry no expiry.
    async fn list_expired_paid_users(
        &self,
        now: DateTime<Utc>,
        limit: Option<i64>,
    ) -> Result<Vec<AppUserEntity>>;

    async fn list_expiring_within(
        &self,
        now: DateTime<Utc>,
        threshold_days: i64,
    ) -> Result<Vec<AppUserEntity>>;

    /// The sole write path for a user's plan fields.
    async fn apply_plan(&self, user_id: Uuid, assignment: PlanAssignment) -> Result<()>;

    /// Explicit "remove plan": resets all three plan fields to null.
    async fn clear_plan(&self, user_id: Uuid) -> Result<()>;

    async fn subscription_overview(&self, now: DateTime<Utc>) -> Result<SubscriptionOverview>;
}
