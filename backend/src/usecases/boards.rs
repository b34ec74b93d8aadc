use application::usecases::entitlements::EntitlementUseCase;
use domain::{
    entities::boards::{InsertBoardEntity, InsertBoardItemEntity},
    repositories::{
        boards::BoardRepository, plans::PlanRepository, subscriptions::SubscriptionRepository,
    },
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("board not found")]
    BoardNotFound,
    #[error("board limit reached for current plan")]
    BoardLimitReached,
    #[error("board item limit reached for current plan")]
    BoardItemLimitReached,
    #[error("sharing is not available on current plan")]
    SharingNotAllowed,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl BoardError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            BoardError::BoardNotFound => StatusCode::NOT_FOUND,
            BoardError::BoardLimitReached
            | BoardError::BoardItemLimitReached
            | BoardError::SharingNotAllowed => StatusCode::FORBIDDEN,
            BoardError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, BoardError>;

/// Board mutations behind the entitlement gate. A denied capacity check maps
/// to a 403 the frontend turns into an upgrade prompt.
pub struct BoardUseCase<P, S, B>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    B: BoardRepository + Send + Sync + 'static,
{
    entitlements: Arc<EntitlementUseCase<P, S, B>>,
    board_repo: Arc<B>,
}

impl<P, S, B> BoardUseCase<P, S, B>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    B: BoardRepository + Send + Sync + 'static,
{
    pub fn new(entitlements: Arc<EntitlementUseCase<P, S, B>>, board_repo: Arc<B>) -> Self {
        Self {
            entitlements,
            board_repo,
        }
    }

    pub async fn create_board(&self, user_id: Uuid, name: String) -> UseCaseResult<Uuid> {
        info!(%user_id, name_len = name.len(), "boards: create board requested");

        let allowed = self
            .entitlements
            .can_create_board(user_id)
            .await
            .map_err(BoardError::Internal)?;

        if !allowed {
            let err = BoardError::BoardLimitReached;
            warn!(
                %user_id,
                status = err.status_code().as_u16(),
                "boards: board limit reached"
            );
            return Err(err);
        }

        let board_id = self
            .board_repo
            .create_board(InsertBoardEntity {
                user_id,
                name,
                is_shared: false,
            })
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "boards: failed to create board");
                BoardError::Internal(err)
            })?;

        info!(%user_id, %board_id, "boards: board created");
        Ok(board_id)
    }

    pub async fn add_item(
        &self,
        user_id: Uuid,
        board_id: Uuid,
        clip_id: Uuid,
    ) -> UseCaseResult<Uuid> {
        self.ensure_owned_board(user_id, board_id).await?;

        let allowed = self
            .entitlements
            .can_add_item(board_id, user_id)
            .await
            .map_err(BoardError::Internal)?;

        if !allowed {
            let err = BoardError::BoardItemLimitReached;
            warn!(
                %user_id,
                %board_id,
                status = err.status_code().as_u16(),
                "boards: item limit reached"
            );
            return Err(err);
        }

        let item_id = self
            .board_repo
            .add_item(InsertBoardItemEntity { board_id, clip_id })
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %board_id,
                    %clip_id,
                    db_error = ?err,
                    "boards: failed to add item"
                );
                BoardError::Internal(err)
            })?;

        info!(%user_id, %board_id, %clip_id, "boards: item added");
        Ok(item_id)
    }

    pub async fn set_sharing(
        &self,
        user_id: Uuid,
        board_id: Uuid,
        shared: bool,
    ) -> UseCaseResult<()> {
        self.ensure_owned_board(user_id, board_id).await?;

        // Turning sharing off never needs an entitlement.
        if shared {
            let allowed = self
                .entitlements
                .can_share(user_id)
                .await
                .map_err(BoardError::Internal)?;

            if !allowed {
                let err = BoardError::SharingNotAllowed;
                warn!(
                    %user_id,
                    %board_id,
                    status = err.status_code().as_u16(),
                    "boards: sharing not allowed on current plan"
                );
                return Err(err);
            }
        }

        self.board_repo
            .set_shared(board_id, shared)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %board_id,
                    shared,
                    db_error = ?err,
                    "boards: failed to update sharing"
                );
                BoardError::Internal(err)
            })?;

        info!(%user_id, %board_id, shared, "boards: sharing updated");
        Ok(())
    }

    /// Foreign boards are reported as missing rather than forbidden.
    async fn ensure_owned_board(&self, user_id: Uuid, board_id: Uuid) -> UseCaseResult<()> {
        let board = self
            .board_repo
            .find_board(board_id)
            .await
            .map_err(BoardError::Internal)?
            .ok_or_else(|| {
                let err = BoardError::BoardNotFound;
                warn!(
                    %user_id,
                    %board_id,
                    status = err.status_code().as_u16(),
                    "boards: board not found"
                );
                err
            })?;

        if board.user_id != user_id {
            let err = BoardError::BoardNotFound;
            warn!(
                %user_id,
                %board_id,
                owner_id = %board.user_id,
                status = err.status_code().as_u16(),
                "boards: board owned by another user"
            );
            return Err(err);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use application::usecases::plan_resolver::PlanResolver;
    use chrono::Utc;
    use domain::{
        entities::{app_users::AppUserEntity, boards::BoardEntity, plans::PlanEntity},
        repositories::{
            boards::MockBoardRepository, plans::MockPlanRepository,
            subscriptions::MockSubscriptionRepository,
        },
        value_objects::{
            enums::billing_periods::BillingPeriod,
            plans::{Capacity, FREE_PLAN_SLUG, PlanLimits},
        },
    };
    use uuid::Uuid;

    fn free_plan() -> PlanEntity {
        PlanEntity {
            id: Uuid::new_v4(),
            slug: FREE_PLAN_SLUG.to_string(),
            name: "Free Member".to_string(),
            price_minor: 0,
            currency: "USD".to_string(),
            billing_period: BillingPeriod::Free,
            limits: PlanLimits {
                max_boards: Capacity::Limited(3),
                max_items_per_board: Capacity::Limited(20),
                can_share: false,
            },
            student_discount_percent: None,
            is_active: true,
            sort_order: 0,
        }
    }

    fn user_without_plan(id: Uuid) -> AppUserEntity {
        let now = Utc::now();
        AppUserEntity {
            id,
            email: "member@ripplix.test".to_string(),
            status: "active".to_string(),
            current_plan_id: None,
            plan_started_at: None,
            plan_expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn usecase(
        plan_repo: MockPlanRepository,
        subscription_repo: MockSubscriptionRepository,
        board_repo: MockBoardRepository,
    ) -> BoardUseCase<MockPlanRepository, MockSubscriptionRepository, MockBoardRepository> {
        let board_repo = Arc::new(board_repo);
        let resolver = Arc::new(PlanResolver::new(
            Arc::new(plan_repo),
            Arc::new(subscription_repo),
        ));
        let entitlements = Arc::new(EntitlementUseCase::new(resolver, Arc::clone(&board_repo)));
        BoardUseCase::new(entitlements, board_repo)
    }

    #[tokio::test]
    async fn board_creation_is_denied_with_403_at_the_limit() {
        let user_id = Uuid::new_v4();

        let mut plan_repo = MockPlanRepository::new();
        let plan = free_plan();
        plan_repo
            .expect_find_free_plan()
            .returning(move || Ok(Some(plan.clone())));

        let mut subscription_repo = MockSubscriptionRepository::new();
        let user = user_without_plan(user_id);
        subscription_repo
            .expect_find_user()
            .returning(move |_| Ok(Some(user.clone())));

        let mut board_repo = MockBoardRepository::new();
        board_repo
            .expect_count_boards_for_user()
            .returning(|_| Ok(3));
        board_repo.expect_create_board().never();

        let result = usecase(plan_repo, subscription_repo, board_repo)
            .create_board(user_id, "Onboarding flows".to_string())
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, BoardError::BoardLimitReached));
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn board_creation_succeeds_under_the_limit() {
        let user_id = Uuid::new_v4();
        let new_board_id = Uuid::new_v4();

        let mut plan_repo = MockPlanRepository::new();
        let plan = free_plan();
        plan_repo
            .expect_find_free_plan()
            .returning(move || Ok(Some(plan.clone())));

        let mut subscription_repo = MockSubscriptionRepository::new();
        let user = user_without_plan(user_id);
        subscription_repo
            .expect_find_user()
            .returning(move |_| Ok(Some(user.clone())));

        let mut board_repo = MockBoardRepository::new();
        board_repo
            .expect_count_boards_for_user()
            .returning(|_| Ok(1));
        board_repo
            .expect_create_board()
            .withf(move |board| board.user_id == user_id && !board.is_shared)
            .returning(move |_| Ok(new_board_id));

        let board_id = usecase(plan_repo, subscription_repo, board_repo)
            .create_board(user_id, "Onboarding flows".to_string())
            .await
            .unwrap();

        assert_eq!(board_id, new_board_id);
    }

    #[tokio::test]
    async fn adding_to_a_foreign_board_reads_as_not_found() {
        let user_id = Uuid::new_v4();
        let board_id = Uuid::new_v4();

        let plan_repo = MockPlanRepository::new();
        let subscription_repo = MockSubscriptionRepository::new();

        let mut board_repo = MockBoardRepository::new();
        let now = Utc::now();
        let foreign_board = BoardEntity {
            id: board_id,
            user_id: Uuid::new_v4(),
            name: "Someone else's".to_string(),
            is_shared: false,
            created_at: now,
            updated_at: now,
        };
        board_repo
            .expect_find_board()
            .returning(move |_| Ok(Some(foreign_board.clone())));
        board_repo.expect_add_item().never();

        let result = usecase(plan_repo, subscription_repo, board_repo)
            .add_item(user_id, board_id, Uuid::new_v4())
            .await;

        assert!(matches!(result.unwrap_err(), BoardError::BoardNotFound));
    }

    #[tokio::test]
    async fn enabling_sharing_requires_the_plan_flag() {
        let user_id = Uuid::new_v4();
        let board_id = Uuid::new_v4();

        let mut plan_repo = MockPlanRepository::new();
        // free_plan() has can_share = false.
        let plan = free_plan();
        plan_repo
            .expect_find_free_plan()
            .returning(move || Ok(Some(plan.clone())));

        let mut subscription_repo = MockSubscriptionRepository::new();
        let user = user_without_plan(user_id);
        subscription_repo
            .expect_find_user()
            .returning(move |_| Ok(Some(user.clone())));

        let mut board_repo = MockBoardRepository::new();
        let now = Utc::now();
        let board = BoardEntity {
            id: board_id,
            user_id,
            name: "Checkout flows".to_string(),
            is_shared: false,
            created_at: now,
            updated_at: now,
        };
        board_repo
            .expect_find_board()
            .returning(move |_| Ok(Some(board.clone())));
        board_repo.expect_set_shared().never();

        let result = usecase(plan_repo, subscription_repo, board_repo)
            .set_sharing(user_id, board_id, true)
            .await;

        assert!(matches!(result.unwrap_err(), BoardError::SharingNotAllowed));
    }

    #[tokio::test]
    async fn disabling_sharing_needs_no_entitlement() {
        let user_id = Uuid::new_v4();
        let board_id = Uuid::new_v4();

        let plan_repo = MockPlanRepository::new();
        let subscription_repo = MockSubscriptionRepository::new();

        let mut board_repo = MockBoardRepository::new();
        let now = Utc::now();
        let board = BoardEntity {
            id: board_id,
            user_id,
            name: "Checkout flows".to_string(),
            is_shared: true,
            created_at: now,
            updated_at: now,
        };
        board_repo
            .expect_find_board()
            .returning(move |_| Ok(Some(board.clone())));
        board_repo
            .expect_set_shared()
            .withf(move |id, shared| *id == board_id && !shared)
            .times(1)
            .returning(|_, _| Ok(()));

        usecase(plan_repo, subscription_repo, board_repo)
            .set_sharing(user_id, board_id, false)
            .await
            .unwrap();
    }
}
