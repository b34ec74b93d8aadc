use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::plans;
use crate::value_objects::{
    enums::billing_periods::BillingPeriod,
    plans::{Capacity, PlanLimits},
};

#[derive(Debug, Clone)]
pub struct PlanEntity {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub price_minor: i32,
    pub currency: String,
    pub billing_period: BillingPeriod,
    pub limits: PlanLimits,
    pub student_discount_percent: Option<i32>,
    pub is_active: bool,
    pub sort_order: i32,
}

/// Raw row used for Diesel queries. Billing period and limits stay in their
/// stored representation and are parsed into typed value objects.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = plans)]
pub struct PlanRow {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub price_minor: i32,
    pub currency: String,
    pub billing_period: String,
    pub max_boards: i32,
    pub max_items_per_board: i32,
    pub can_share: bool,
    pub student_discount_percent: Option<i32>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

impl From<PlanRow> for PlanEntity {
    fn from(value: PlanRow) -> Self {
        let billing_period =
            BillingPeriod::from_str(&value.billing_period).unwrap_or(BillingPeriod::Free);

        Self {
            id: value.id,
            slug: value.slug,
            name: value.name,
            price_minor: value.price_minor,
            currency: value.currency,
            billing_period,
            limits: PlanLimits {
                max_boards: Capacity::from_stored(value.max_boards),
                max_items_per_board: Capacity::from_stored(value.max_items_per_board),
                can_share: value.can_share,
            },
            student_discount_percent: value.student_discount_percent,
            is_active: value.is_active,
            sort_order: value.sort_order,
        }
    }
}
