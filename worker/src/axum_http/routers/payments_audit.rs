use std::sync::Arc;

use application::usecases::payment_reconciliation::{
    PaymentAuditParams, PaymentReconciliationUseCase,
};
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::{Duration, Utc};
use domain::value_objects::payments::PaymentDrift;
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::{axum_http::routers::authorize_bearer, config::config_model::DotEnvyConfig};

// Run example (report-only, last 24h)
//   curl -X POST "http://localhost:$SERVER_PORT_WORKER/internal/v1/payments/audit" \
//     -H "Authorization: Bearer $INTERNAL_WORKER_TOKEN" \
//     -H "Content-Type: application/json" \
//     -d '{"lookback_hours":24,"apply":false}'

#[derive(Clone)]
pub struct PaymentsAuditRouteState {
    config: Arc<DotEnvyConfig>,
    usecase: Arc<PaymentReconciliationUseCase>,
}

pub fn routes(
    config: Arc<DotEnvyConfig>,
    usecase: Arc<PaymentReconciliationUseCase>,
) -> Router {
    Router::new()
        .route("/audit", post(payments_audit))
        .with_state(PaymentsAuditRouteState { config, usecase })
}

#[derive(Debug, Deserialize)]
pub struct PaymentsAuditRequest {
    /// Window in hours; zero or negative scans the full payment history.
    pub lookback_hours: Option<i64>,
    /// Audit a single user's history instead of the window.
    pub user_id: Option<Uuid>,
    pub apply: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct PaymentsAuditResponse {
    pub scanned: usize,
    pub drift: Vec<PaymentDrift>,
    pub repaired: usize,
    pub repair_failed: usize,
    pub apply: bool,
}

pub async fn payments_audit(
    State(state): State<PaymentsAuditRouteState>,
    headers: HeaderMap,
    Json(payload): Json<PaymentsAuditRequest>,
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

    let lookback_hours = payload
        .lookback_hours
        .unwrap_or(state.config.audit.default_lookback_hours);
    let since = (lookback_hours > 0).then(|| Utc::now() - Duration::hours(lookback_hours));

    let apply = payload.apply.unwrap_or(false);
    let params = PaymentAuditParams {
        since,
        user_id: payload.user_id,
        apply,
    };

    match state.usecase.audit(params).await {
        Ok(result) => Json(PaymentsAuditResponse {
            scanned: result.scanned,
            drift: result.drift,
            repaired: result.repaired,
            repair_failed: result.repair_failed,
            apply,
        })
        .into_response(),
        Err(err) => {
            error!(error = ?err, "payments_audit: usecase failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "payments audit failed").into_response()
        }
    }
}
