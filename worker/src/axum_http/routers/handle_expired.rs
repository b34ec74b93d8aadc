use std::sync::Arc;

use application::usecases::handle_expired_subscriptions::{
    HandleExpiredSubscriptionsParams, HandleExpiredSubscriptionsUseCase,
};
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use domain::value_objects::subscriptions::SubscriptionOverview;
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::{axum_http::routers::authorize_bearer, config::config_model::DotEnvyConfig};

// Run example
//   curl -X POST "http://localhost:$SERVER_PORT_WORKER/internal/v1/subscriptions/handle-expired" \
//     -H "Authorization: Bearer $INTERNAL_WORKER_TOKEN" \
//     -H "Content-Type: application/json" \
//     -d '{"notify":true,"limit":100}'

#[derive(Clone)]
pub struct HandleExpiredRouteState {
    config: Arc<DotEnvyConfig>,
    usecase: Arc<HandleExpiredSubscriptionsUseCase>,
}

pub fn routes(
    config: Arc<DotEnvyConfig>,
    usecase: Arc<HandleExpiredSubscriptionsUseCase>,
) -> Router {
    Router::new()
        .route("/handle-expired", post(handle_expired))
        .with_state(HandleExpiredRouteState { config, usecase })
}

#[derive(Debug, Deserialize)]
pub struct HandleExpiredRequest {
    pub notify: Option<bool>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct HandleExpiredResponse {
    pub total: usize,
    pub downgraded: usize,
    pub failed: usize,
    pub notified: usize,
    pub notify_failed: usize,
    pub overview: SubscriptionOverview,
    pub downgraded_ids: Vec<Uuid>,
    pub failed_ids: Vec<Uuid>,
}

pub async fn handle_expired(
    State(state): State<HandleExpiredRouteState>,
    headers: HeaderMap,
    Json(payload): Json<HandleExpiredRequest>,
) -> Response {
    let expected_token = match state.config.internal.token.as_deref() {
        Some(token) => token,
        None => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                "internal worker token is not configured",
            )
                .into_response();
        }
    };

    if let Err(status) = authorize_bearer(&headers, expected_token) {
        return (status, "unauthorized").into_response();
    }

    let params = HandleExpiredSubscriptionsParams {
        notify: payload.notify.unwrap_or(false),
        limit: payload.limit,
    };

    match state.usecase.run(params).await {
        Ok(result) => Json(HandleExpiredResponse {
            total: result.total,
            downgraded: result.downgraded,
            failed: result.failed,
            notified: result.notified,
            notify_failed: result.notify_failed,
            overview: result.overview,
            downgraded_ids: result.downgraded_ids,
            failed_ids: result.failed_ids,
        })
        .into_response(),
        Err(err) => {
            error!(error = ?err, "handle_expired: usecase failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "expiry run failed").into_response()
        }
    }
}
