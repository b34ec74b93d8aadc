use application::usecases::plan_resolver::PlanResolver;
use axum::{
    Json, Router,
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use domain::repositories::{plans::PlanRepository, subscriptions::SubscriptionRepository};
use infra::postgres::{
    postgres_connection::PgPoolSquad,
    repositories::{plans::PlanPostgres, subscriptions::SubscriptionPostgres},
};
use std::sync::Arc;
use uuid::Uuid;

use crate::axum_http::error_responses::error_response;
use crate::usecases::users::UserSubscriptionUseCase;

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let plan_repository = Arc::new(PlanPostgres::new(Arc::clone(&db_pool)));
    let subscription_repository = Arc::new(SubscriptionPostgres::new(Arc::clone(&db_pool)));

    let plan_resolver = Arc::new(PlanResolver::new(
        plan_repository,
        Arc::clone(&subscription_repository),
    ));
    let users_usecase = UserSubscriptionUseCase::new(plan_resolver, subscription_repository);

    Router::new()
        .route("/:user_id/subscription", get(current_subscription))
        .route("/:user_id/plan", delete(remove_plan))
        .with_state(Arc::new(users_usecase))
}

pub async fn current_subscription<P, S>(
    State(users_usecase): State<Arc<UserSubscriptionUseCase<P, S>>>,
    Path(user_id): Path<Uuid>,
) -> Response
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    match users_usecase.current_subscription(user_id).await {
        Ok(subscription) => Json(subscription).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn remove_plan<P, S>(
    State(users_usecase): State<Arc<UserSubscriptionUseCase<P, S>>>,
    Path(user_id): Path<Uuid>,
) -> Response
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    match users_usecase.remove_plan(user_id).await {
        Ok(()) => axum::http::StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}
