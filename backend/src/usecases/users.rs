use application::usecases::plan_resolver::PlanResolver;
use chrono::Utc;
use domain::{
    repositories::{plans::PlanRepository, subscriptions::SubscriptionRepository},
    value_objects::subscriptions::{
        CurrentSubscriptionDto, EXPIRING_SOON_THRESHOLD_DAYS, SubscriptionState,
    },
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UserSubscriptionError {
    #[error("user not found")]
    UserNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl UserSubscriptionError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            UserSubscriptionError::UserNotFound => StatusCode::NOT_FOUND,
            UserSubscriptionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, UserSubscriptionError>;

/// Read side of a user's subscription plus the explicit "remove plan" action.
pub struct UserSubscriptionUseCase<P, S>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    plan_resolver: Arc<PlanResolver<P, S>>,
    subscription_repo: Arc<S>,
}

impl<P, S> UserSubscriptionUseCase<P, S>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    pub fn new(plan_resolver: Arc<PlanResolver<P, S>>, subscription_repo: Arc<S>) -> Self {
        Self {
            plan_resolver,
            subscription_repo,
        }
    }

    pub async fn current_subscription(
        &self,
        user_id: Uuid,
    ) -> UseCaseResult<CurrentSubscriptionDto> {
        let user = self
            .subscription_repo
            .find_user(user_id)
            .await
            .map_err(UserSubscriptionError::Internal)?
            .ok_or_else(|| {
                let err = UserSubscriptionError::UserNotFound;
                warn!(
                    %user_id,
                    status = err.status_code().as_u16(),
                    "user_subscription: unknown user"
                );
                err
            })?;

        let plan = self
            .plan_resolver
            .resolve_effective_plan(&user)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    error = ?err,
                    "user_subscription: failed to resolve effective plan"
                );
                UserSubscriptionError::Internal(err)
            })?;

        let state = SubscriptionState::of(&user);
        let now = Utc::now();

        Ok(CurrentSubscriptionDto {
            plan: plan.into(),
            started_at: user.plan_started_at,
            expires_at: user.plan_expires_at,
            is_expired: state.is_expired(now),
            expires_soon: state.expires_soon(now, EXPIRING_SOON_THRESHOLD_DAYS),
            days_until_expiry: state.days_until_expiry(now),
        })
    }

    pub async fn remove_plan(&self, user_id: Uuid) -> UseCaseResult<()> {
        self.subscription_repo
            .find_user(user_id)
            .await
            .map_err(UserSubscriptionError::Internal)?
            .ok_or_else(|| {
                let err = UserSubscriptionError::UserNotFound;
                warn!(
                    %user_id,
                    status = err.status_code().as_u16(),
                    "user_subscription: cannot remove plan of unknown user"
                );
                err
            })?;

        self.subscription_repo
            .clear_plan(user_id)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    db_error = ?err,
                    "user_subscription: failed to clear plan fields"
                );
                UserSubscriptionError::Internal(err)
            })?;

        info!(%user_id, "user_subscription: plan removed");
        Ok(())
    }
}
