use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::postgres::postgres_connection::PgPoolSquad;
use domain::{
    entities::boards::{BoardEntity, InsertBoardEntity, InsertBoardItemEntity},
    repositories::boards::BoardRepository,
    schema::{board_items, boards},
};

pub struct BoardPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl BoardPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl BoardRepository for BoardPostgres {
    async fn create_board(&self, board: InsertBoardEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let board_id = insert_into(boards::table)
            .values(&board)
            .returning(boards::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(board_id)
    }

    async fn find_board(&self, board_id: Uuid) -> Result<Option<BoardEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let board = boards::table
            .filter(boards::id.eq(board_id))
            .select(BoardEntity::as_select())
            .first::<BoardEntity>(&mut conn)
            .optional()?;

        Ok(board)
    }

    async fn count_boards_for_user(&self, user_id: Uuid) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let count = boards::table
            .filter(boards::user_id.eq(user_id))
            .count()
            .get_result(&mut conn)?;

        Ok(count)
    }

    async fn add_item(&self, item: InsertBoardItemEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let item_id = insert_into(board_items::table)
            .values(&item)
            .returning(board_items::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(item_id)
    }

    async fn count_items_on_board(&self, board_id: Uuid) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let count = board_items::table
            .filter(board_items::board_id.eq(board_id))
            .count()
            .get_result(&mut conn)?;

        Ok(count)
    }

    async fn set_shared(&self, board_id: Uuid, shared: bool) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = update(boards::table.filter(boards::id.eq(board_id)))
            .set((
                boards::is_shared.eq(shared),
                boards::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        if affected == 0 {
            bail!("board {} not found", board_id);
        }

        Ok(())
    }
}
