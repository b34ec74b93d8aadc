use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::entities::plans::PlanEntity;

/// Read-only plan catalog. Lookups only ever surface active plans; a missing
/// slug or id is `None`, and callers decide how to fail closed.
#[automock]
#[async_trait]
pub trait PlanRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<PlanEntity>>;
    async fn find_active_by_id(&self, plan_id: Uuid) -> Result<Option<PlanEntity>>;
    async fn list_active_plans(&self) -> Result<Vec<PlanEntity>>;
    async fn find_free_plan(&self) -> Result<Option<PlanEntity>>;
}
