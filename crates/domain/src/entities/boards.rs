use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::{board_items, boards};

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = boards)]
pub struct BoardEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub is_shared: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = boards)]
pub struct InsertBoardEntity {
    pub user_id: Uuid,
    pub name: String,
    pub is_shared: bool,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = board_items)]
pub struct InsertBoardItemEntity {
    pub board_id: Uuid,
    pub clip_id: Uuid,
}
