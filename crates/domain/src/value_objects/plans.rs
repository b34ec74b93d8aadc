use serde::Serialize;
use uuid::Uuid;

use crate::entities::plans::PlanEntity;

/// Slug of the plan every user without a (valid) paid plan falls back to.
pub const FREE_PLAN_SLUG: &str = "free-member";

/// Stored marker for "no limit" on a capacity column.
pub const UNLIMITED_SENTINEL: i32 = i32::MAX;

/// A plan capacity. The stored sentinel never leaks into comparisons;
/// `allows` is the only way limits are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacity {
    Limited(u32),
    Unlimited,
}

impl Capacity {
    pub fn from_stored(raw: i32) -> Self {
        if raw == UNLIMITED_SENTINEL {
            Capacity::Unlimited
        } else {
            Capacity::Limited(raw.max(0) as u32)
        }
    }

    pub fn as_stored(&self) -> i32 {
        match self {
            Capacity::Limited(max) => (*max).min(UNLIMITED_SENTINEL as u32 - 1) as i32,
            Capacity::Unlimited => UNLIMITED_SENTINEL,
        }
    }

    /// True when one more unit fits under this capacity given `current` in use.
    pub fn allows(&self, current: i64) -> bool {
        match self {
            Capacity::Unlimited => true,
            Capacity::Limited(max) => current < i64::from(*max),
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, Capacity::Unlimited)
    }
}

/// Limits and feature flags attached to a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanLimits {
    pub max_boards: Capacity,
    pub max_items_per_board: Capacity,
    pub can_share: bool,
}

/// Wire representation of a plan. Unlimited capacities serialize as null.
#[derive(Debug, Clone, Serialize)]
pub struct PlanDto {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub price_minor: i32,
    pub currency: String,
    pub billing_period: String,
    pub max_boards: Option<u32>,
    pub max_items_per_board: Option<u32>,
    pub can_share: bool,
    pub student_discount_percent: Option<i32>,
    pub sort_order: i32,
}

impl From<PlanEntity> for PlanDto {
    fn from(plan: PlanEntity) -> Self {
        Self {
            id: plan.id,
            slug: plan.slug,
            name: plan.name,
            price_minor: plan.price_minor,
            currency: plan.currency,
            billing_period: plan.billing_period.to_string(),
            max_boards: capacity_to_wire(plan.limits.max_boards),
            max_items_per_board: capacity_to_wire(plan.limits.max_items_per_board),
            can_share: plan.limits.can_share,
            student_discount_percent: plan.student_discount_percent,
            sort_order: plan.sort_order,
        }
    }
}

fn capacity_to_wire(capacity: Capacity) -> Option<u32> {
    match capacity {
        Capacity::Limited(max) => Some(max),
        Capacity::Unlimited => None,
    }
}
