use anyhow::{Context, Result};
use chrono::Utc;
use domain::repositories::{
    expiry_notifications::ExpiryNotifier, plans::PlanRepository,
    subscriptions::SubscriptionRepository,
};
use domain::value_objects::subscriptions::{
    EXPIRING_SOON_THRESHOLD_DAYS, PlanAssignment, SubscriptionOverview, SubscriptionState,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct HandleExpiredSubscriptionsParams {
    pub notify: bool,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct HandleExpiredSubscriptionsResult {
    pub total: usize,
    pub downgraded: usize,
    pub failed: usize,
    pub notified: usize,
    pub notify_failed: usize,
    pub overview: SubscriptionOverview,
    pub downgraded_ids: Vec<Uuid>,
    pub failed_ids: Vec<Uuid>,
}

/// Scans for users whose paid subscription has run out and moves each onto
/// the free plan. One user failing never stops the run; the result carries
/// the aggregated counters with `downgraded + failed == total`.
pub struct HandleExpiredSubscriptionsUseCase {
    subscription_repo: Arc<dyn SubscriptionRepository + Send + Sync>,
    plan_repo: Arc<dyn PlanRepository + Send + Sync>,
    notifier: Arc<dyn ExpiryNotifier + Send + Sync>,
}

impl HandleExpiredSubscriptionsUseCase {
    pub fn new(
        subscription_repo: Arc<dyn SubscriptionRepository + Send + Sync>,
        plan_repo: Arc<dyn PlanRepository + Send + Sync>,
        notifier: Arc<dyn ExpiryNotifier + Send + Sync>,
    ) -> Self {
        Self {
            subscription_repo,
            plan_repo,
            notifier,
        }
    }

    pub async fn run(
        &self,
        params: HandleExpiredSubscriptionsParams,
    ) -> Result<HandleExpiredSubscriptionsResult> {
        let now = Utc::now();

        // Without a downgrade target the run cannot do anything safely.
        let free_plan = self
            .plan_repo
            .find_free_plan()
            .await?
            .context("cannot process expired subscriptions: free plan is not configured")?;

        // Snapshot the analytics before touching any user row so the numbers
        // stay consistent with the candidate set.
        let overview = self.subscription_repo.subscription_overview(now).await?;

        let candidates = self
            .subscription_repo
            .list_expired_paid_users(now, params.limit)
            .await?;

        let mut result = HandleExpiredSubscriptionsResult {
            total: candidates.len(),
            overview,
            ..Default::default()
        };

        for user in &candidates {
            let assignment = PlanAssignment::free(&free_plan, now);
            match self.subscription_repo.apply_plan(user.id, assignment).await {
                Ok(()) => {
                    info!(
                        user_id = %user.id,
                        expired_plan_id = ?user.current_plan_id,
                        expired_at = ?user.plan_expires_at,
                        "handle_expired: downgraded user to free plan"
                    );
                    result.downgraded += 1;
                    if result.downgraded_ids.len() < 20 {
                        result.downgraded_ids.push(user.id);
                    }
                }
                Err(err) => {
                    error!(
                        user_id = %user.id,
                        error = ?err,
                        "handle_expired: failed to downgrade user; skipping"
                    );
                    result.failed += 1;
                    if result.failed_ids.len() < 20 {
                        result.failed_ids.push(user.id);
                    }
                }
            }
        }

        if params.notify {
            self.send_renewal_reminders(now, &mut result).await;
        }

        info!(
            total = result.total,
            downgraded = result.downgraded,
            failed = result.failed,
            notified = result.notified,
            notify_failed = result.notify_failed,
            active_paid = result.overview.active_paid,
            expiring_within_7_days = result.overview.expiring_within_7_days,
            "handle_expired: completed"
        );

        Ok(result)
    }

    /// Best-effort: one attempt per user, failures counted, no retries. A
    /// failing reminder never blocks the others, and a failing listing query
    /// only skips the pass (the downgrades above are already applied).
    async fn send_renewal_reminders(
        &self,
        now: chrono::DateTime<Utc>,
        result: &mut HandleExpiredSubscriptionsResult,
    ) {
        let expiring = match self
            .subscription_repo
            .list_expiring_within(now, EXPIRING_SOON_THRESHOLD_DAYS)
            .await
        {
            Ok(users) => users,
            Err(err) => {
                error!(
                    error = ?err,
                    "handle_expired: failed to list expiring subscriptions; skipping reminders"
                );
                return;
            }
        };

        for user in expiring {
            let days_left = SubscriptionState::of(&user)
                .days_until_expiry(now)
                .unwrap_or(0);

            match self
                .notifier
                .notify_expiring_soon(user.clone(), days_left)
                .await
            {
                Ok(()) => result.notified += 1,
                Err(err) => {
                    warn!(
                        user_id = %user.id,
                        days_left,
                        error = ?err,
                        "handle_expired: renewal reminder dispatch failed"
                    );
                    result.notify_failed += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::plan_resolver::tests::{sample_plan, sample_user};
    use chrono::{Duration, TimeZone};
    use domain::repositories::{
        expiry_notifications::MockExpiryNotifier, plans::MockPlanRepository,
        subscriptions::MockSubscriptionRepository,
    };
    use domain::value_objects::{
        enums::billing_periods::BillingPeriod, plans::FREE_PLAN_SLUG,
    };
    use mockall::predicate::eq;

    fn usecase(
        subscription_repo: MockSubscriptionRepository,
        plan_repo: MockPlanRepository,
        notifier: MockExpiryNotifier,
    ) -> HandleExpiredSubscriptionsUseCase {
        HandleExpiredSubscriptionsUseCase::new(
            Arc::new(subscription_repo),
            Arc::new(plan_repo),
            Arc::new(notifier),
        )
    }

    fn expired_user(plan_id: Uuid) -> domain::entities::app_users::AppUserEntity {
        let mut user = sample_user(Uuid::new_v4(), Some(plan_id));
        user.plan_started_at = Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        user.plan_expires_at = Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        user
    }

    fn default_params() -> HandleExpiredSubscriptionsParams {
        HandleExpiredSubscriptionsParams {
            notify: false,
            limit: None,
        }
    }

    #[tokio::test]
    async fn downgrades_expired_user_to_free_plan() {
        let free_plan_id = Uuid::new_v4();
        let paid_plan_id = Uuid::new_v4();
        let user = expired_user(paid_plan_id);
        let user_id = user.id;

        let mut plan_repo = MockPlanRepository::new();
        let free_plan = sample_plan(free_plan_id, FREE_PLAN_SLUG, BillingPeriod::Free);
        plan_repo
            .expect_find_free_plan()
            .returning(move || Ok(Some(free_plan.clone())));

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_subscription_overview()
            .returning(|_| Ok(SubscriptionOverview::default()));
        subscription_repo
            .expect_list_expired_paid_users()
            .returning(move |_, _| Ok(vec![user.clone()]));
        subscription_repo
            .expect_apply_plan()
            .withf(move |id, assignment| {
                *id == user_id
                    && assignment.plan_id == free_plan_id
                    && assignment.expires_at.is_none()
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let result = usecase(subscription_repo, plan_repo, MockExpiryNotifier::new())
            .run(default_params())
            .await
            .unwrap();

        assert_eq!(result.total, 1);
        assert_eq!(result.downgraded, 1);
        assert_eq!(result.failed, 0);
        assert_eq!(result.downgraded_ids, vec![user_id]);
    }

    #[tokio::test]
    async fn one_failing_user_does_not_stop_the_run() {
        let free_plan_id = Uuid::new_v4();
        let paid_plan_id = Uuid::new_v4();
        let failing = expired_user(paid_plan_id);
        let succeeding = expired_user(paid_plan_id);
        let failing_id = failing.id;

        let mut plan_repo = MockPlanRepository::new();
        let free_plan = sample_plan(free_plan_id, FREE_PLAN_SLUG, BillingPeriod::Free);
        plan_repo
            .expect_find_free_plan()
            .returning(move || Ok(Some(free_plan.clone())));

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_subscription_overview()
            .returning(|_| Ok(SubscriptionOverview::default()));
        let candidates = vec![failing, succeeding];
        subscription_repo
            .expect_list_expired_paid_users()
            .returning(move |_, _| Ok(candidates.clone()));
        subscription_repo
            .expect_apply_plan()
            .times(2)
            .returning(move |id, _| {
                if id == failing_id {
                    anyhow::bail!("row version conflict")
                }
                Ok(())
            });

        let result = usecase(subscription_repo, plan_repo, MockExpiryNotifier::new())
            .run(default_params())
            .await
            .unwrap();

        assert_eq!(result.total, 2);
        assert_eq!(result.downgraded, 1);
        assert_eq!(result.failed, 1);
        assert_eq!(result.downgraded + result.failed, result.total);
        assert_eq!(result.failed_ids, vec![failing_id]);
    }

    #[tokio::test]
    async fn fails_loudly_when_free_plan_is_missing() {
        let mut plan_repo = MockPlanRepository::new();
        plan_repo.expect_find_free_plan().returning(|| Ok(None));

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo.expect_list_expired_paid_users().never();

        let result = usecase(subscription_repo, plan_repo, MockExpiryNotifier::new())
            .run(default_params())
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn overview_is_reported_alongside_the_counters() {
        let free_plan_id = Uuid::new_v4();

        let mut plan_repo = MockPlanRepository::new();
        let free_plan = sample_plan(free_plan_id, FREE_PLAN_SLUG, BillingPeriod::Free);
        plan_repo
            .expect_find_free_plan()
            .returning(move || Ok(Some(free_plan.clone())));

        let overview = SubscriptionOverview {
            active_paid: 10,
            expiring_within_7_days: 2,
            expired_unprocessed: 0,
            monthly: 6,
            yearly: 3,
            lifetime: 1,
            free_members: 40,
        };

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_subscription_overview()
            .returning(move |_| Ok(overview));
        subscription_repo
            .expect_list_expired_paid_users()
            .returning(|_, _| Ok(Vec::new()));

        let result = usecase(subscription_repo, plan_repo, MockExpiryNotifier::new())
            .run(default_params())
            .await
            .unwrap();

        assert_eq!(result.total, 0);
        assert_eq!(result.overview, overview);
    }

    #[tokio::test]
    async fn reminder_failures_are_counted_but_do_not_block_others() {
        let free_plan_id = Uuid::new_v4();
        let paid_plan_id = Uuid::new_v4();

        let mut plan_repo = MockPlanRepository::new();
        let free_plan = sample_plan(free_plan_id, FREE_PLAN_SLUG, BillingPeriod::Free);
        plan_repo
            .expect_find_free_plan()
            .returning(move || Ok(Some(free_plan.clone())));

        let mut failing = sample_user(Uuid::new_v4(), Some(paid_plan_id));
        failing.plan_expires_at = Some(Utc::now() + Duration::days(3));
        let mut succeeding = sample_user(Uuid::new_v4(), Some(paid_plan_id));
        succeeding.plan_expires_at = Some(Utc::now() + Duration::days(5));
        let failing_id = failing.id;

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_subscription_overview()
            .returning(|_| Ok(SubscriptionOverview::default()));
        subscription_repo
            .expect_list_expired_paid_users()
            .returning(|_, _| Ok(Vec::new()));
        let expiring = vec![failing, succeeding];
        subscription_repo
            .expect_list_expiring_within()
            .with(mockall::predicate::always(), eq(EXPIRING_SOON_THRESHOLD_DAYS))
            .returning(move |_, _| Ok(expiring.clone()));

        let mut notifier = MockExpiryNotifier::new();
        notifier
            .expect_notify_expiring_soon()
            .times(2)
            .returning(move |user, _| {
                if user.id == failing_id {
                    anyhow::bail!("webhook timed out")
                }
                Ok(())
            });

        let result = usecase(subscription_repo, plan_repo, notifier)
            .run(HandleExpiredSubscriptionsParams {
                notify: true,
                limit: None,
            })
            .await
            .unwrap();

        assert_eq!(result.notified, 1);
        assert_eq!(result.notify_failed, 1);
    }
}
