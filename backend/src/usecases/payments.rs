use application::usecases::payment_reconciliation::PaymentReconciliationUseCase;
use chrono::Utc;
use domain::{
    entities::payments::NewPaymentEntity,
    repositories::{
        payment_gateways::PaymentGatewayRepository, payments::PaymentRepository,
        plans::PlanRepository,
    },
    value_objects::{
        enums::{billing_periods::BillingPeriod, payment_statuses::PaymentStatus},
        payment_gateways::resolve_active_gateway,
        payments::CheckoutDto,
    },
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("plan not found")]
    PlanNotFound,
    #[error("free plan does not require checkout")]
    FreePlanCheckout,
    #[error("unknown transaction")]
    UnknownTransaction,
    #[error("payment gateway unavailable: {0}")]
    GatewayUnavailable(String),
    #[error("payment cannot be confirmed from status {0}")]
    NotConfirmable(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PaymentError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            PaymentError::PlanNotFound | PaymentError::UnknownTransaction => {
                StatusCode::NOT_FOUND
            }
            PaymentError::FreePlanCheckout | PaymentError::NotConfirmable(_) => {
                StatusCode::BAD_REQUEST
            }
            PaymentError::GatewayUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            PaymentError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, PaymentError>;

/// Checkout initiation and gateway confirmation. The active gateway is
/// resolved per call and handed through; confirmation routes the completed
/// payment into plan reconciliation.
pub struct PaymentUseCase {
    payment_repo: Arc<dyn PaymentRepository + Send + Sync>,
    plan_repo: Arc<dyn PlanRepository + Send + Sync>,
    gateway_repo: Arc<dyn PaymentGatewayRepository + Send + Sync>,
    reconciler: Arc<PaymentReconciliationUseCase>,
}

impl PaymentUseCase {
    pub fn new(
        payment_repo: Arc<dyn PaymentRepository + Send + Sync>,
        plan_repo: Arc<dyn PlanRepository + Send + Sync>,
        gateway_repo: Arc<dyn PaymentGatewayRepository + Send + Sync>,
        reconciler: Arc<PaymentReconciliationUseCase>,
    ) -> Self {
        Self {
            payment_repo,
            plan_repo,
            gateway_repo,
            reconciler,
        }
    }

    pub async fn initiate_checkout(
        &self,
        user_id: Uuid,
        plan_slug: &str,
    ) -> UseCaseResult<CheckoutDto> {
        info!(%user_id, plan_slug, "payments: checkout requested");

        let gateway = self.resolve_gateway().await?;

        let plan = self
            .plan_repo
            .find_by_slug(plan_slug)
            .await
            .map_err(PaymentError::Internal)?
            .ok_or_else(|| {
                let err = PaymentError::PlanNotFound;
                warn!(
                    %user_id,
                    plan_slug,
                    status = err.status_code().as_u16(),
                    "payments: unknown plan for checkout"
                );
                err
            })?;

        if plan.billing_period == BillingPeriod::Free {
            let err = PaymentError::FreePlanCheckout;
            warn!(
                %user_id,
                plan_slug,
                status = err.status_code().as_u16(),
                "payments: free plan checkout attempted"
            );
            return Err(err);
        }

        let transaction_id = Uuid::new_v4().to_string();
        let payment_id = self
            .payment_repo
            .record_payment(NewPaymentEntity {
                transaction_id: transaction_id.clone(),
                user_id,
                plan_id: plan.id,
                gateway_id: gateway.id,
                amount_minor: plan.price_minor,
                status: PaymentStatus::Pending.to_string(),
                paid_at: None,
            })
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    plan_id = %plan.id,
                    gateway_slug = %gateway.slug,
                    db_error = ?err,
                    "payments: failed to record pending payment"
                );
                PaymentError::Internal(err)
            })?;

        info!(
            %user_id,
            %payment_id,
            transaction_id = %transaction_id,
            gateway_slug = %gateway.slug,
            amount_minor = plan.price_minor,
            "payments: pending payment recorded"
        );

        Ok(CheckoutDto {
            payment_id,
            transaction_id,
            gateway_slug: gateway.slug,
            plan_slug: plan.slug,
            amount_minor: plan.price_minor,
            currency: plan.currency,
        })
    }

    /// Gateway confirmation for a transaction. Pending payments are marked
    /// completed and applied; an already-completed payment is re-applied,
    /// which converges on the same state.
    pub async fn confirm(&self, transaction_id: &str) -> UseCaseResult<Uuid> {
        let gateway = self.resolve_gateway().await?;

        let payment = self
            .payment_repo
            .find_by_transaction_id(transaction_id)
            .await
            .map_err(PaymentError::Internal)?
            .ok_or_else(|| {
                let err = PaymentError::UnknownTransaction;
                warn!(
                    transaction_id,
                    status = err.status_code().as_u16(),
                    "payments: confirmation for unknown transaction"
                );
                err
            })?;

        if payment.gateway_id != gateway.id {
            warn!(
                payment_id = %payment.id,
                payment_gateway_id = %payment.gateway_id,
                active_gateway_id = %gateway.id,
                active_gateway_slug = %gateway.slug,
                "payments: confirming payment recorded for a different gateway"
            );
        }

        match PaymentStatus::from_str(&payment.status) {
            Some(PaymentStatus::Pending) => {
                let completed = self
                    .payment_repo
                    .mark_completed(payment.id, Utc::now())
                    .await
                    .map_err(|err| {
                        error!(
                            payment_id = %payment.id,
                            db_error = ?err,
                            "payments: failed to mark payment completed"
                        );
                        PaymentError::Internal(err)
                    })?;

                self.reconciler
                    .apply_completed_payment(&completed)
                    .await
                    .map_err(PaymentError::Internal)?;

                info!(
                    payment_id = %completed.id,
                    user_id = %completed.user_id,
                    gateway_slug = %gateway.slug,
                    "payments: payment confirmed and plan applied"
                );
                Ok(completed.id)
            }
            Some(PaymentStatus::Completed) => {
                info!(
                    payment_id = %payment.id,
                    "payments: payment already completed; re-applying plan"
                );
                self.reconciler
                    .apply_completed_payment(&payment)
                    .await
                    .map_err(PaymentError::Internal)?;
                Ok(payment.id)
            }
            _ => {
                let err = PaymentError::NotConfirmable(payment.status.clone());
                warn!(
                    payment_id = %payment.id,
                    payment_status = %payment.status,
                    status = err.status_code().as_u16(),
                    "payments: payment not confirmable"
                );
                Err(err)
            }
        }
    }

    async fn resolve_gateway(
        &self,
    ) -> UseCaseResult<domain::entities::payment_gateways::PaymentGatewayEntity> {
        let gateways = self
            .gateway_repo
            .list_gateways()
            .await
            .map_err(PaymentError::Internal)?;

        resolve_active_gateway(gateways).map_err(|err| {
            let err = PaymentError::GatewayUnavailable(err.to_string());
            error!(
                status = err.status_code().as_u16(),
                error = %err,
                "payments: active gateway resolution failed"
            );
            err
        })
    }
}
