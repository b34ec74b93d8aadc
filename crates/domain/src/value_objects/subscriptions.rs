use chrono::{DateTime, Duration, Months, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::{app_users::AppUserEntity, plans::PlanEntity};
use crate::value_objects::{enums::billing_periods::BillingPeriod, plans::PlanDto};

/// Renewal reminders go out to users whose plan expires within this many days.
pub const EXPIRING_SOON_THRESHOLD_DAYS: i64 = 7;

const SECONDS_PER_DAY: i64 = 86_400;

/// Expiry date for a plan started at `start`. Free and lifetime plans never
/// expire; monthly and yearly plans run one calendar month/year.
pub fn compute_expiry(period: BillingPeriod, start: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match period {
        BillingPeriod::Free | BillingPeriod::Lifetime => None,
        BillingPeriod::Monthly => start.checked_add_months(Months::new(1)),
        BillingPeriod::Yearly => start.checked_add_months(Months::new(12)),
    }
}

/// Snapshot of a user's subscription fields with the predicates derived from
/// them. Pure; reads nothing beyond the copied fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubscriptionState {
    pub plan_id: Option<Uuid>,
    pub started_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl SubscriptionState {
    pub fn of(user: &AppUserEntity) -> Self {
        Self {
            plan_id: user.current_plan_id,
            started_at: user.plan_started_at,
            expires_at: user.plan_expires_at,
        }
    }

    /// A null expiry is never expired (free and lifetime plans).
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at < now,
            None => false,
        }
    }

    pub fn expires_soon(&self, now: DateTime<Utc>, threshold_days: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                expires_at >= now && expires_at <= now + Duration::days(threshold_days)
            }
            None => false,
        }
    }

    /// Whole days until expiry, rounded up and clamped to zero. None when the
    /// plan never expires.
    pub fn days_until_expiry(&self, now: DateTime<Utc>) -> Option<i64> {
        let expires_at = self.expires_at?;
        let seconds = expires_at.signed_duration_since(now).num_seconds();
        if seconds <= 0 {
            return Some(0);
        }
        Some((seconds as u64).div_ceil(SECONDS_PER_DAY as u64) as i64)
    }
}

/// The one value written to a user's plan fields. Every plan change in the
/// system is expressed as a PlanAssignment and applied through
/// `SubscriptionRepository::apply_plan`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanAssignment {
    pub plan_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl PlanAssignment {
    pub fn for_plan(plan: &PlanEntity, start_at: DateTime<Utc>) -> Self {
        Self {
            plan_id: plan.id,
            started_at: start_at,
            expires_at: compute_expiry(plan.billing_period, start_at),
        }
    }

    /// Downgrade target: the free plan with no expiry. Applying this to an
    /// already-free user changes nothing but the start timestamp.
    pub fn free(free_plan: &PlanEntity, now: DateTime<Utc>) -> Self {
        Self {
            plan_id: free_plan.id,
            started_at: now,
            expires_at: None,
        }
    }
}

/// Subscriber counts as of a single instant. Computed read-only, before any
/// downgrade pass touches user rows, so the numbers are internally consistent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SubscriptionOverview {
    pub active_paid: i64,
    pub expiring_within_7_days: i64,
    pub expired_unprocessed: i64,
    pub monthly: i64,
    pub yearly: i64,
    pub lifetime: i64,
    pub free_members: i64,
}

/// Wire representation of a user's effective subscription.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentSubscriptionDto {
    pub plan: PlanDto,
    pub started_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_expired: bool,
    pub expires_soon: bool,
    pub days_until_expiry: Option<i64>,
}
