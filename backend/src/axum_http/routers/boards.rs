use application::usecases::{entitlements::EntitlementUseCase, plan_resolver::PlanResolver};
use axum::{
    Json, Router,
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::{post, put},
};
use domain::repositories::{
    boards::BoardRepository, plans::PlanRepository, subscriptions::SubscriptionRepository,
};
use infra::postgres::{
    postgres_connection::PgPoolSquad,
    repositories::{
        boards::BoardPostgres, plans::PlanPostgres, subscriptions::SubscriptionPostgres,
    },
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::axum_http::error_responses::error_response;
use crate::usecases::boards::BoardUseCase;

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let plan_repository = Arc::new(PlanPostgres::new(Arc::clone(&db_pool)));
    let subscription_repository = Arc::new(SubscriptionPostgres::new(Arc::clone(&db_pool)));
    let board_repository = Arc::new(BoardPostgres::new(Arc::clone(&db_pool)));

    let plan_resolver = Arc::new(PlanResolver::new(plan_repository, subscription_repository));
    let entitlements = Arc::new(EntitlementUseCase::new(
        plan_resolver,
        Arc::clone(&board_repository),
    ));
    let boards_usecase = BoardUseCase::new(entitlements, board_repository);

    Router::new()
        .route("/", post(create_board))
        .route("/:board_id/items", post(add_item))
        .route("/:board_id/sharing", put(set_sharing))
        .with_state(Arc::new(boards_usecase))
}

#[derive(Debug, Deserialize)]
pub struct CreateBoardRequest {
    pub user_id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CreateBoardResponse {
    pub board_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub user_id: Uuid,
    pub clip_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct AddItemResponse {
    pub item_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SetSharingRequest {
    pub user_id: Uuid,
    pub shared: bool,
}

pub async fn create_board<P, S, B>(
    State(boards_usecase): State<Arc<BoardUseCase<P, S, B>>>,
    Json(payload): Json<CreateBoardRequest>,
) -> Response
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    B: BoardRepository + Send + Sync + 'static,
{
    match boards_usecase
        .create_board(payload.user_id, payload.name)
        .await
    {
        Ok(board_id) => Json(CreateBoardResponse { board_id }).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn add_item<P, S, B>(
    State(boards_usecase): State<Arc<BoardUseCase<P, S, B>>>,
    Path(board_id): Path<Uuid>,
    Json(payload): Json<AddItemRequest>,
) -> Response
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    B: BoardRepository + Send + Sync + 'static,
{
    match boards_usecase
        .add_item(payload.user_id, board_id, payload.clip_id)
        .await
    {
        Ok(item_id) => Json(AddItemResponse { item_id }).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn set_sharing<P, S, B>(
    State(boards_usecase): State<Arc<BoardUseCase<P, S, B>>>,
    Path(board_id): Path<Uuid>,
    Json(payload): Json<SetSharingRequest>,
) -> Response
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    B: BoardRepository + Send + Sync + 'static,
{
    match boards_usecase
        .set_sharing(payload.user_id, board_id, payload.shared)
        .await
    {
        Ok(()) => axum::http::StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}
