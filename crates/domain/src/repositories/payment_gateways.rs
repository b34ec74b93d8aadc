use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::entities::payment_gateways::PaymentGatewayEntity;

#[automock]
#[async_trait]
pub trait PaymentGatewayRepository {
    async fn list_gateways(&self) -> Result<Vec<PaymentGatewayEntity>>;
}
