use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, prelude::*};
use std::sync::Arc;

use crate::postgres::postgres_connection::PgPoolSquad;
use domain::{
    entities::payment_gateways::PaymentGatewayEntity,
    repositories::payment_gateways::PaymentGatewayRepository, schema::payment_gateways,
};

pub struct PaymentGatewayPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PaymentGatewayPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PaymentGatewayRepository for PaymentGatewayPostgres {
    async fn list_gateways(&self) -> Result<Vec<PaymentGatewayEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let gateways = payment_gateways::table
            .order(payment_gateways::slug.asc())
            .select(PaymentGatewayEntity::as_select())
            .load::<PaymentGatewayEntity>(&mut conn)?;

        Ok(gateways)
    }
}
