use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use domain::entities::payments::PaymentEntity;
use domain::repositories::{
    payments::PaymentRepository, plans::PlanRepository, subscriptions::SubscriptionRepository,
};
use domain::value_objects::{
    enums::payment_statuses::PaymentStatus, payments::PaymentDrift,
    subscriptions::PlanAssignment,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PaymentAuditParams {
    /// Restrict the sweep to payments completed at or after this instant.
    pub since: Option<DateTime<Utc>>,
    /// Audit a single user's payment history instead of the global window.
    pub user_id: Option<Uuid>,
    /// Repair each drift by re-applying the payment. Off by default: drift
    /// is surfaced for operator judgment, never fixed silently.
    pub apply: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PaymentAuditResult {
    pub scanned: usize,
    pub drift: Vec<PaymentDrift>,
    pub repaired: usize,
    pub repair_failed: usize,
}

/// Keeps user plan fields in line with completed payments: applies a single
/// completed payment after gateway confirmation, and audits historical
/// completed payments for drift.
pub struct PaymentReconciliationUseCase {
    payment_repo: Arc<dyn PaymentRepository + Send + Sync>,
    plan_repo: Arc<dyn PlanRepository + Send + Sync>,
    subscription_repo: Arc<dyn SubscriptionRepository + Send + Sync>,
}

impl PaymentReconciliationUseCase {
    pub fn new(
        payment_repo: Arc<dyn PaymentRepository + Send + Sync>,
        plan_repo: Arc<dyn PlanRepository + Send + Sync>,
        subscription_repo: Arc<dyn SubscriptionRepository + Send + Sync>,
    ) -> Self {
        Self {
            payment_repo,
            plan_repo,
            subscription_repo,
        }
    }

    /// Applies a completed payment's plan to the payer. Re-applying the same
    /// payment converges on the same state.
    pub async fn apply_completed_payment(&self, payment: &PaymentEntity) -> Result<()> {
        if PaymentStatus::from_str(&payment.status) != Some(PaymentStatus::Completed) {
            bail!(
                "payment {} cannot be applied from status {}",
                payment.id,
                payment.status
            );
        }

        let plan = self
            .plan_repo
            .find_active_by_id(payment.plan_id)
            .await?
            .with_context(|| {
                format!(
                    "plan {} referenced by payment {} is missing or inactive",
                    payment.plan_id, payment.id
                )
            })?;

        let paid_at = payment.paid_at.unwrap_or(payment.created_at);
        let assignment = PlanAssignment::for_plan(&plan, paid_at);

        self.subscription_repo
            .apply_plan(payment.user_id, assignment)
            .await?;

        info!(
            payment_id = %payment.id,
            user_id = %payment.user_id,
            plan_id = %plan.id,
            plan_slug = %plan.slug,
            %paid_at,
            expires_at = ?assignment.expires_at,
            "payment_reconciliation: applied completed payment"
        );

        Ok(())
    }

    /// Sweeps completed payments and reports every one whose plan differs
    /// from the payer's current plan. A drift record does not say *why* the
    /// plans differ (an unapplied payment and a later legitimate plan change
    /// look identical); mutating anything requires `apply`.
    pub async fn audit(&self, params: PaymentAuditParams) -> Result<PaymentAuditResult> {
        let payments = match params.user_id {
            Some(user_id) => self.payment_repo.list_completed_for_user(user_id).await?,
            None => self.payment_repo.list_completed_since(params.since).await?,
        };

        let mut result = PaymentAuditResult {
            scanned: payments.len(),
            ..Default::default()
        };

        for payment in &payments {
            let user = match self.subscription_repo.find_user(payment.user_id).await {
                Ok(Some(user)) => user,
                Ok(None) => {
                    warn!(
                        payment_id = %payment.id,
                        user_id = %payment.user_id,
                        "payments_audit: payer no longer exists; skipping payment"
                    );
                    continue;
                }
                Err(err) => {
                    error!(
                        payment_id = %payment.id,
                        user_id = %payment.user_id,
                        error = ?err,
                        "payments_audit: failed to load payer; skipping payment"
                    );
                    continue;
                }
            };

            if user.current_plan_id == Some(payment.plan_id) {
                continue;
            }

            warn!(
                payment_id = %payment.id,
                transaction_id = %payment.transaction_id,
                user_id = %user.id,
                expected_plan_id = %payment.plan_id,
                actual_plan_id = ?user.current_plan_id,
                "payments_audit: completed payment does not match current plan"
            );

            if params.apply {
                match self.apply_completed_payment(payment).await {
                    Ok(()) => result.repaired += 1,
                    Err(err) => {
                        error!(
                            payment_id = %payment.id,
                            error = ?err,
                            "payments_audit: repair failed; drift left in place"
                        );
                        result.repair_failed += 1;
                    }
                }
            }

            result.drift.push(PaymentDrift {
                payment_id: payment.id,
                transaction_id: payment.transaction_id.clone(),
                user_id: payment.user_id,
                expected_plan_id: payment.plan_id,
                actual_plan_id: user.current_plan_id,
                paid_at: payment.paid_at,
            });
        }

        info!(
            scanned = result.scanned,
            drift = result.drift.len(),
            repaired = result.repaired,
            repair_failed = result.repair_failed,
            apply = params.apply,
            "payments_audit: completed"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::plan_resolver::tests::{sample_plan, sample_user};
    use chrono::TimeZone;
    use domain::repositories::{
        payments::MockPaymentRepository, plans::MockPlanRepository,
        subscriptions::MockSubscriptionRepository,
    };
    use domain::value_objects::enums::billing_periods::BillingPeriod;
    use mockall::predicate::eq;

    fn usecase(
        payment_repo: MockPaymentRepository,
        plan_repo: MockPlanRepository,
        subscription_repo: MockSubscriptionRepository,
    ) -> PaymentReconciliationUseCase {
        PaymentReconciliationUseCase::new(
            Arc::new(payment_repo),
            Arc::new(plan_repo),
            Arc::new(subscription_repo),
        )
    }

    fn completed_payment(user_id: Uuid, plan_id: Uuid) -> PaymentEntity {
        let paid_at = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        PaymentEntity {
            id: Uuid::new_v4(),
            transaction_id: Uuid::new_v4().to_string(),
            user_id,
            plan_id,
            gateway_id: Uuid::new_v4(),
            amount_minor: 9900,
            status: PaymentStatus::Completed.to_string(),
            paid_at: Some(paid_at),
            created_at: paid_at,
        }
    }

    #[tokio::test]
    async fn applying_a_completed_payment_sets_plan_and_period() {
        let user_id = Uuid::new_v4();
        let plan_id = Uuid::new_v4();
        let payment = completed_payment(user_id, plan_id);
        let paid_at = payment.paid_at.unwrap();

        let mut plan_repo = MockPlanRepository::new();
        let plan = sample_plan(plan_id, "pro-yearly", BillingPeriod::Yearly);
        plan_repo
            .expect_find_active_by_id()
            .with(eq(plan_id))
            .returning(move |_| Ok(Some(plan.clone())));

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_apply_plan()
            .withf(move |id, assignment| {
                *id == user_id
                    && assignment.plan_id == plan_id
                    && assignment.started_at == paid_at
                    && assignment.expires_at
                        == Some(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap())
            })
            .times(1)
            .returning(|_, _| Ok(()));

        usecase(MockPaymentRepository::new(), plan_repo, subscription_repo)
            .apply_completed_payment(&payment)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn refuses_to_apply_a_pending_payment() {
        let mut payment = completed_payment(Uuid::new_v4(), Uuid::new_v4());
        payment.status = PaymentStatus::Pending.to_string();

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo.expect_apply_plan().never();

        let result = usecase(
            MockPaymentRepository::new(),
            MockPlanRepository::new(),
            subscription_repo,
        )
        .apply_completed_payment(&payment)
        .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn audit_reports_drift_without_mutating() {
        let user_id = Uuid::new_v4();
        let paid_plan_id = Uuid::new_v4();
        let free_plan_id = Uuid::new_v4();
        let payment = completed_payment(user_id, paid_plan_id);
        let payment_id = payment.id;

        let mut payment_repo = MockPaymentRepository::new();
        let payments = vec![payment];
        payment_repo
            .expect_list_completed_since()
            .returning(move |_| Ok(payments.clone()));

        // The payer sits on the free plan even though the payment bought Pro.
        let mut subscription_repo = MockSubscriptionRepository::new();
        let user = sample_user(user_id, Some(free_plan_id));
        subscription_repo
            .expect_find_user()
            .with(eq(user_id))
            .returning(move |_| Ok(Some(user.clone())));
        subscription_repo.expect_apply_plan().never();

        let reconciler = usecase(payment_repo, MockPlanRepository::new(), subscription_repo);
        let params = PaymentAuditParams {
            since: None,
            user_id: None,
            apply: false,
        };

        let first = reconciler.audit(params.clone()).await.unwrap();
        assert_eq!(first.scanned, 1);
        assert_eq!(first.drift.len(), 1);
        assert_eq!(first.repaired, 0);
        assert_eq!(first.drift[0].payment_id, payment_id);
        assert_eq!(first.drift[0].expected_plan_id, paid_plan_id);
        assert_eq!(first.drift[0].actual_plan_id, Some(free_plan_id));

        // Report-only runs are side-effect free: a second sweep sees the
        // same drift.
        let second = reconciler.audit(params).await.unwrap();
        assert_eq!(second.drift, first.drift);
    }

    #[tokio::test]
    async fn audit_with_apply_repairs_each_drift() {
        let user_id = Uuid::new_v4();
        let paid_plan_id = Uuid::new_v4();
        let free_plan_id = Uuid::new_v4();
        let payment = completed_payment(user_id, paid_plan_id);
        let paid_at = payment.paid_at.unwrap();

        let mut payment_repo = MockPaymentRepository::new();
        let payments = vec![payment];
        payment_repo
            .expect_list_completed_since()
            .returning(move |_| Ok(payments.clone()));

        let mut plan_repo = MockPlanRepository::new();
        let plan = sample_plan(paid_plan_id, "pro-yearly", BillingPeriod::Yearly);
        plan_repo
            .expect_find_active_by_id()
            .returning(move |_| Ok(Some(plan.clone())));

        let mut subscription_repo = MockSubscriptionRepository::new();
        let user = sample_user(user_id, Some(free_plan_id));
        subscription_repo
            .expect_find_user()
            .returning(move |_| Ok(Some(user.clone())));
        subscription_repo
            .expect_apply_plan()
            .withf(move |id, assignment| {
                *id == user_id
                    && assignment.plan_id == paid_plan_id
                    && assignment.started_at == paid_at
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let result = usecase(payment_repo, plan_repo, subscription_repo)
            .audit(PaymentAuditParams {
                since: None,
                user_id: None,
                apply: true,
            })
            .await
            .unwrap();

        assert_eq!(result.drift.len(), 1);
        assert_eq!(result.repaired, 1);
        assert_eq!(result.repair_failed, 0);
    }

    #[tokio::test]
    async fn audit_scopes_to_a_single_user_when_requested() {
        let user_id = Uuid::new_v4();
        let plan_id = Uuid::new_v4();
        let payment = completed_payment(user_id, plan_id);

        let mut payment_repo = MockPaymentRepository::new();
        let payments = vec![payment];
        payment_repo
            .expect_list_completed_for_user()
            .with(eq(user_id))
            .times(1)
            .returning(move |_| Ok(payments.clone()));
        payment_repo.expect_list_completed_since().never();

        // Plan matches: no drift expected.
        let mut subscription_repo = MockSubscriptionRepository::new();
        let user = sample_user(user_id, Some(plan_id));
        subscription_repo
            .expect_find_user()
            .returning(move |_| Ok(Some(user.clone())));

        let result = usecase(payment_repo, MockPlanRepository::new(), subscription_repo)
            .audit(PaymentAuditParams {
                since: None,
                user_id: Some(user_id),
                apply: false,
            })
            .await
            .unwrap();

        assert_eq!(result.scanned, 1);
        assert!(result.drift.is_empty());
    }
}
