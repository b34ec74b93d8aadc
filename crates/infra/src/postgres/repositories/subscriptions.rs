use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use diesel::{RunQueryDsl, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::postgres::postgres_connection::PgPoolSquad;
use domain::{
    entities::app_users::AppUserEntity,
    repositories::subscriptions::SubscriptionRepository,
    schema::{app_users, plans},
    value_objects::{
        enums::billing_periods::BillingPeriod,
        subscriptions::{PlanAssignment, SubscriptionOverview},
    },
};

const PERIODIC: [&str; 2] = [
    BillingPeriod::Monthly.as_str(),
    BillingPeriod::Yearly.as_str(),
];

pub struct SubscriptionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SubscriptionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SubscriptionRepository for SubscriptionPostgres {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<AppUserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let user = app_users::table
            .filter(app_users::id.eq(user_id))
            .select(AppUserEntity::as_select())
            .first::<AppUserEntity>(&mut conn)
            .optional()?;

        Ok(user)
    }

    async fn list_expired_paid_users(
        &self,
        now: DateTime<Utc>,
        limit: Option<i64>,
    ) -> Result<Vec<AppUserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = app_users::table
            .inner_join(plans::table.on(plans::id.nullable().eq(app_users::current_plan_id)))
            .filter(plans::billing_period.eq_any(PERIODIC))
            .filter(app_users::plan_expires_at.lt(now))
            .order(app_users::plan_expires_at.asc())
            .select(AppUserEntity::as_select())
            .into_boxed();

        if let Some(limit) = limit.filter(|l| *l > 0) {
            query = query.limit(limit);
        }

        Ok(query.load::<AppUserEntity>(&mut conn)?)
    }

    async fn list_expiring_within(
        &self,
        now: DateTime<Utc>,
        threshold_days: i64,
    ) -> Result<Vec<AppUserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let window_end = now + Duration::days(threshold_days.max(0));

        let users = app_users::table
            .inner_join(plans::table.on(plans::id.nullable().eq(app_users::current_plan_id)))
            .filter(plans::billing_period.eq_any(PERIODIC))
            .filter(app_users::plan_expires_at.ge(now))
            .filter(app_users::plan_expires_at.le(window_end))
            .order(app_users::plan_expires_at.asc())
            .select(AppUserEntity::as_select())
            .load::<AppUserEntity>(&mut conn)?;

        Ok(users)
    }

    async fn apply_plan(&self, user_id: Uuid, assignment: PlanAssignment) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = update(app_users::table.filter(app_users::id.eq(user_id)))
            .set((
                app_users::current_plan_id.eq(Some(assignment.plan_id)),
                app_users::plan_started_at.eq(Some(assignment.started_at)),
                app_users::plan_expires_at.eq(assignment.expires_at),
                app_users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        if affected == 0 {
            bail!("user {} not found", user_id);
        }

        Ok(())
    }

    async fn clear_plan(&self, user_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = update(app_users::table.filter(app_users::id.eq(user_id)))
            .set((
                app_users::current_plan_id.eq(None::<Uuid>),
                app_users::plan_started_at.eq(None::<DateTime<Utc>>),
                app_users::plan_expires_at.eq(None::<DateTime<Utc>>),
                app_users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        if affected == 0 {
            bail!("user {} not found", user_id);
        }

        Ok(())
    }

    async fn subscription_overview(&self, now: DateTime<Utc>) -> Result<SubscriptionOverview> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let week_end = now + Duration::days(7);

        let active_paid: i64 = app_users::table
            .inner_join(plans::table.on(plans::id.nullable().eq(app_users::current_plan_id)))
            .filter(plans::billing_period.eq_any(PERIODIC))
            .filter(app_users::plan_expires_at.ge(now))
            .count()
            .get_result(&mut conn)?;

        let expiring_within_7_days: i64 = app_users::table
            .inner_join(plans::table.on(plans::id.nullable().eq(app_users::current_plan_id)))
            .filter(plans::billing_period.eq_any(PERIODIC))
            .filter(app_users::plan_expires_at.ge(now))
            .filter(app_users::plan_expires_at.le(week_end))
            .count()
            .get_result(&mut conn)?;

        let expired_unprocessed: i64 = app_users::table
            .inner_join(plans::table.on(plans::id.nullable().eq(app_users::current_plan_id)))
            .filter(plans::billing_period.eq_any(PERIODIC))
            .filter(app_users::plan_expires_at.lt(now))
            .count()
            .get_result(&mut conn)?;

        let monthly = self.count_active_for_period(&mut conn, BillingPeriod::Monthly, now)?;
        let yearly = self.count_active_for_period(&mut conn, BillingPeriod::Yearly, now)?;

        let lifetime: i64 = app_users::table
            .inner_join(plans::table.on(plans::id.nullable().eq(app_users::current_plan_id)))
            .filter(plans::billing_period.eq(BillingPeriod::Lifetime.as_str()))
            .count()
            .get_result(&mut conn)?;

        let free_assigned: i64 = app_users::table
            .inner_join(plans::table.on(plans::id.nullable().eq(app_users::current_plan_id)))
            .filter(plans::billing_period.eq(BillingPeriod::Free.as_str()))
            .count()
            .get_result(&mut conn)?;

        let unassigned: i64 = app_users::table
            .filter(app_users::current_plan_id.is_null())
            .count()
            .get_result(&mut conn)?;

        Ok(SubscriptionOverview {
            active_paid,
            expiring_within_7_days,
            expired_unprocessed,
            monthly,
            yearly,
            lifetime,
            free_members: free_assigned + unassigned,
        })
    }
}

impl SubscriptionPostgres {
    fn count_active_for_period(
        &self,
        conn: &mut diesel::PgConnection,
        period: BillingPeriod,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        let count = app_users::table
            .inner_join(plans::table.on(plans::id.nullable().eq(app_users::current_plan_id)))
            .filter(plans::billing_period.eq(period.as_str()))
            .filter(app_users::plan_expires_at.ge(now))
            .count()
            .get_result(conn)?;

        Ok(count)
    }
}
