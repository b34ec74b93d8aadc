use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::payments;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = payments)]
pub struct PaymentEntity {
    pub id: Uuid,
    pub transaction_id: String,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub gateway_id: Uuid,
    pub amount_minor: i32,
    pub status: String,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = payments)]
pub struct InsertPaymentEntity {
    pub transaction_id: String,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub gateway_id: Uuid,
    pub amount_minor: i32,
    pub status: String,
    pub paid_at: Option<DateTime<Utc>>,
}

// NewPaymentEntity is the application-facing alias for inserting rows into `payments`.
pub type NewPaymentEntity = InsertPaymentEntity;
