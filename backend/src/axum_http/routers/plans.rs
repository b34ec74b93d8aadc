use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use domain::{repositories::plans::PlanRepository, value_objects::plans::PlanDto};
use infra::postgres::{postgres_connection::PgPoolSquad, repositories::plans::PlanPostgres};
use std::sync::Arc;
use tracing::{error, info};

use crate::axum_http::error_responses::error_response;

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let plan_repository = PlanPostgres::new(Arc::clone(&db_pool));

    Router::new()
        .route("/", get(list_plans))
        .with_state(Arc::new(plan_repository))
}

pub async fn list_plans<T>(State(plan_repo): State<Arc<T>>) -> Response
where
    T: PlanRepository + Send + Sync,
{
    match plan_repo.list_active_plans().await {
        Ok(plans) => {
            let plan_count = plans.len();
            info!(plan_count, "plans: active plans loaded");
            let dtos: Vec<PlanDto> = plans.into_iter().map(PlanDto::from).collect();
            Json(dtos).into_response()
        }
        Err(err) => {
            error!(db_error = ?err, "plans: failed to list active plans");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}
