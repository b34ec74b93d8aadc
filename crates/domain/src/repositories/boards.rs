use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::entities::boards::{BoardEntity, InsertBoardEntity, InsertBoardItemEntity};

#[automock]
#[async_trait]
pub trait BoardRepository {
    async fn create_board(&self, board: InsertBoardEntity) -> Result<Uuid>;
    async fn find_board(&self, board_id: Uuid) -> Result<Option<BoardEntity>>;
    async fn count_boards_for_user(&self, user_id: Uuid) -> Result<i64>;
    async fn add_item(&self, item: InsertBoardItemEntity) -> Result<Uuid>;
    async fn count_items_on_board(&self, board_id: Uuid) -> Result<i64>;
    async fn set_shared(&self, board_id: Uuid, shared: bool) -> Result<()>;
}
