use anyhow::{Context, Result};
use domain::{
    entities::{app_users::AppUserEntity, plans::PlanEntity},
    repositories::{plans::PlanRepository, subscriptions::SubscriptionRepository},
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Resolves the effective plan for a user: the assigned plan when it still
/// references an active catalog entry, otherwise the free plan. A user with
/// no plan, a deleted plan, or a deactivated plan is treated as free.
pub struct PlanResolver<P, S>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    plan_repo: Arc<P>,
    subscription_repo: Arc<S>,
}

impl<P, S> PlanResolver<P, S>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    pub fn new(plan_repo: Arc<P>, subscription_repo: Arc<S>) -> Self {
        Self {
            plan_repo,
            subscription_repo,
        }
    }

    pub async fn resolve_effective_plan_for_user(&self, user_id: Uuid) -> Result<PlanEntity> {
        let user = self
            .subscription_repo
            .find_user(user_id)
            .await?
            .with_context(|| format!("user {} not found", user_id))?;
        self.resolve_effective_plan(&user).await
    }

    pub async fn resolve_effective_plan(&self, user: &AppUserEntity) -> Result<PlanEntity> {
        if let Some(plan_id) = user.current_plan_id {
            if let Some(plan) = self.plan_repo.find_active_by_id(plan_id).await? {
                debug!(
                    user_id = %user.id,
                    plan_id = %plan.id,
                    "plan_resolver: using assigned plan"
                );
                return Ok(plan);
            }

            debug!(
                user_id = %user.id,
                %plan_id,
                "plan_resolver: assigned plan missing or inactive, falling back to free plan"
            );
        } else {
            debug!(user_id = %user.id, "plan_resolver: no plan assigned, falling back to free plan");
        }

        self.plan_repo
            .find_free_plan()
            .await?
            .context("free plan is not configured")
    }
}
