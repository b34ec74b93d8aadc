use anyhow::Result;
use domain::repositories::{
    boards::BoardRepository, plans::PlanRepository, subscriptions::SubscriptionRepository,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::usecases::plan_resolver::PlanResolver;

/// Answers capacity questions from the user's effective plan. Never mutates
/// state; a denial is `Ok(false)`, not an error.
pub struct EntitlementUseCase<P, S, B>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    B: BoardRepository + Send + Sync + 'static,
{
    plan_resolver: Arc<PlanResolver<P, S>>,
    board_repo: Arc<B>,
}

impl<P, S, B> EntitlementUseCase<P, S, B>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    B: BoardRepository + Send + Sync + 'static,
{
    pub fn new(plan_resolver: Arc<PlanResolver<P, S>>, board_repo: Arc<B>) -> Self {
        Self {
            plan_resolver,
            board_repo,
        }
    }

    pub async fn can_create_board(&self, user_id: Uuid) -> Result<bool> {
        let plan = self
            .plan_resolver
            .resolve_effective_plan_for_user(user_id)
            .await?;
        let current = self.board_repo.count_boards_for_user(user_id).await?;

        let allowed = plan.limits.max_boards.allows(current);
        debug!(
            %user_id,
            plan_slug = %plan.slug,
            current_boards = current,
            allowed,
            "entitlements: board creation checked"
        );
        Ok(allowed)
    }

    pub async fn can_add_item(&self, board_id: Uuid, user_id: Uuid) -> Result<bool> {
        let plan = self
            .plan_resolver
            .resolve_effective_plan_for_user(user_id)
            .await?;
        let current = self.board_repo.count_items_on_board(board_id).await?;

        let allowed = plan.limits.max_items_per_board.allows(current);
        debug!(
            %user_id,
            %board_id,
            plan_slug = %plan.slug,
            current_items = current,
            allowed,
            "entitlements: item addition checked"
        );
        Ok(allowed)
    }

    pub async fn can_share(&self, user_id: Uuid) -> Result<bool> {
        let plan = self
            .plan_resolver
            .resolve_effective_plan_for_user(user_id)
            .await?;
        Ok(plan.limits.can_share)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::plan_resolver::tests::{sample_plan, sample_user};
    use domain::{
        repositories::{
            boards::MockBoardRepository, plans::MockPlanRepository,
            subscriptions::MockSubscriptionRepository,
        },
        value_objects::{
            enums::billing_periods::BillingPeriod,
            plans::{Capacity, FREE_PLAN_SLUG},
        },
    };
    use mockall::predicate::eq;

    fn usecase(
        plan_repo: MockPlanRepository,
        subscription_repo: MockSubscriptionRepository,
        board_repo: MockBoardRepository,
    ) -> EntitlementUseCase<MockPlanRepository, MockSubscriptionRepository, MockBoardRepository>
    {
        let resolver = Arc::new(PlanResolver::new(
            Arc::new(plan_repo),
            Arc::new(subscription_repo),
        ));
        EntitlementUseCase::new(resolver, Arc::new(board_repo))
    }

    #[tokio::test]
    async fn unlimited_boards_allow_any_count() {
        for current in [0_i64, 1, 5_000_000] {
            let user_id = Uuid::new_v4();
            let plan_id = Uuid::new_v4();

            let mut plan_repo = MockPlanRepository::new();
            let mut subscription_repo = MockSubscriptionRepository::new();
            let mut board_repo = MockBoardRepository::new();

            let user = sample_user(user_id, Some(plan_id));
            subscription_repo
                .expect_find_user()
                .returning(move |_| Ok(Some(user.clone())));

            let mut plan = sample_plan(plan_id, "lifetime-pro", BillingPeriod::Lifetime);
            plan.limits.max_boards = Capacity::Unlimited;
            plan_repo
                .expect_find_active_by_id()
                .returning(move |_| Ok(Some(plan.clone())));

            board_repo
                .expect_count_boards_for_user()
                .with(eq(user_id))
                .returning(move |_| Ok(current));

            let gate = usecase(plan_repo, subscription_repo, board_repo);
            assert!(gate.can_create_board(user_id).await.unwrap());
        }
    }

    #[tokio::test]
    async fn board_creation_denied_at_plan_limit() {
        let user_id = Uuid::new_v4();
        let plan_id = Uuid::new_v4();

        let mut plan_repo = MockPlanRepository::new();
        let mut subscription_repo = MockSubscriptionRepository::new();
        let mut board_repo = MockBoardRepository::new();

        let user = sample_user(user_id, Some(plan_id));
        subscription_repo
            .expect_find_user()
            .returning(move |_| Ok(Some(user.clone())));

        // sample_plan carries max_boards = 3.
        let plan = sample_plan(plan_id, "free-member", BillingPeriod::Free);
        plan_repo
            .expect_find_active_by_id()
            .returning(move |_| Ok(Some(plan.clone())));

        board_repo
            .expect_count_boards_for_user()
            .returning(|_| Ok(3));

        let gate = usecase(plan_repo, subscription_repo, board_repo);
        assert!(!gate.can_create_board(user_id).await.unwrap());
    }

    #[tokio::test]
    async fn user_without_plan_gets_free_plan_limits() {
        let user_id = Uuid::new_v4();

        let mut plan_repo = MockPlanRepository::new();
        let mut subscription_repo = MockSubscriptionRepository::new();
        let mut board_repo = MockBoardRepository::new();

        let user = sample_user(user_id, None);
        subscription_repo
            .expect_find_user()
            .returning(move |_| Ok(Some(user.clone())));

        let free_plan = sample_plan(Uuid::new_v4(), FREE_PLAN_SLUG, BillingPeriod::Free);
        plan_repo
            .expect_find_free_plan()
            .returning(move || Ok(Some(free_plan.clone())));

        board_repo
            .expect_count_boards_for_user()
            .returning(|_| Ok(2));

        let gate = usecase(plan_repo, subscription_repo, board_repo);
        // Free plan allows 3 boards; 2 in use.
        assert!(gate.can_create_board(user_id).await.unwrap());
    }

    #[tokio::test]
    async fn item_addition_respects_per_board_limit() {
        let user_id = Uuid::new_v4();
        let board_id = Uuid::new_v4();
        let plan_id = Uuid::new_v4();

        let mut plan_repo = MockPlanRepository::new();
        let mut subscription_repo = MockSubscriptionRepository::new();
        let mut board_repo = MockBoardRepository::new();

        let user = sample_user(user_id, Some(plan_id));
        subscription_repo
            .expect_find_user()
            .returning(move |_| Ok(Some(user.clone())));

        // sample_plan carries max_items_per_board = 20.
        let plan = sample_plan(plan_id, "pro-monthly", BillingPeriod::Monthly);
        plan_repo
            .expect_find_active_by_id()
            .returning(move |_| Ok(Some(plan.clone())));

        board_repo
            .expect_count_items_on_board()
            .with(eq(board_id))
            .returning(|_| Ok(20));

        let gate = usecase(plan_repo, subscription_repo, board_repo);
        assert!(!gate.can_add_item(board_id, user_id).await.unwrap());
    }

    #[tokio::test]
    async fn sharing_follows_plan_flag_and_fails_closed() {
        let user_id = Uuid::new_v4();

        let mut plan_repo = MockPlanRepository::new();
        let mut subscription_repo = MockSubscriptionRepository::new();
        let board_repo = MockBoardRepository::new();

        let user = sample_user(user_id, None);
        subscription_repo
            .expect_find_user()
            .returning(move |_| Ok(Some(user.clone())));

        // sample_plan's free tier has can_share = false.
        let free_plan = sample_plan(Uuid::new_v4(), FREE_PLAN_SLUG, BillingPeriod::Free);
        plan_repo
            .expect_find_free_plan()
            .returning(move || Ok(Some(free_plan.clone())));

        let gate = usecase(plan_repo, subscription_repo, board_repo);
        assert!(!gate.can_share(user_id).await.unwrap());
    }
}
