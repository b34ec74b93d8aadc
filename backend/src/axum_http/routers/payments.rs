use application::usecases::payment_reconciliation::PaymentReconciliationUseCase;
use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
};
use domain::repositories::{
    payment_gateways::PaymentGatewayRepository, payments::PaymentRepository,
    plans::PlanRepository, subscriptions::SubscriptionRepository,
};
use infra::postgres::{
    postgres_connection::PgPoolSquad,
    repositories::{
        payment_gateways::PaymentGatewayPostgres, payments::PaymentPostgres,
        plans::PlanPostgres, subscriptions::SubscriptionPostgres,
    },
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::axum_http::error_responses::error_response;
use crate::usecases::payments::PaymentUseCase;

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let payment_repository: Arc<dyn PaymentRepository + Send + Sync> =
        Arc::new(PaymentPostgres::new(Arc::clone(&db_pool)));
    let plan_repository: Arc<dyn PlanRepository + Send + Sync> =
        Arc::new(PlanPostgres::new(Arc::clone(&db_pool)));
    let gateway_repository: Arc<dyn PaymentGatewayRepository + Send + Sync> =
        Arc::new(PaymentGatewayPostgres::new(Arc::clone(&db_pool)));
    let subscription_repository: Arc<dyn SubscriptionRepository + Send + Sync> =
        Arc::new(SubscriptionPostgres::new(Arc::clone(&db_pool)));

    let reconciler = Arc::new(PaymentReconciliationUseCase::new(
        Arc::clone(&payment_repository),
        Arc::clone(&plan_repository),
        subscription_repository,
    ));
    let payments_usecase = PaymentUseCase::new(
        payment_repository,
        plan_repository,
        gateway_repository,
        reconciler,
    );

    Router::new()
        .route("/checkout", post(initiate_checkout))
        .route("/webhook", post(confirm_payment))
        .with_state(Arc::new(payments_usecase))
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub user_id: Uuid,
    pub plan_slug: String,
}

#[derive(Debug, Deserialize)]
pub struct PaymentWebhookRequest {
    pub transaction_id: String,
}

#[derive(Debug, Serialize)]
pub struct PaymentWebhookResponse {
    pub payment_id: Uuid,
}

pub async fn initiate_checkout(
    State(payments_usecase): State<Arc<PaymentUseCase>>,
    Json(payload): Json<CheckoutRequest>,
) -> Response {
    match payments_usecase
        .initiate_checkout(payload.user_id, &payload.plan_slug)
        .await
    {
        Ok(checkout) => Json(checkout).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn confirm_payment(
    State(payments_usecase): State<Arc<PaymentUseCase>>,
    Json(payload): Json<PaymentWebhookRequest>,
) -> Response {
    match payments_usecase.confirm(&payload.transaction_id).await {
        Ok(payment_id) => Json(PaymentWebhookResponse { payment_id }).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}
