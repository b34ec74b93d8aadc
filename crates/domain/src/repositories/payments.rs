use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::entities::payments::{NewPaymentEntity, PaymentEntity};

#[automock]
#[async_trait]
pub trait PaymentRepository {
    async fn record_payment(&self, payment: NewPaymentEntity) -> Result<Uuid>;

    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<PaymentEntity>>;

    async fn mark_completed(
        &self,
        payment_id: Uuid,
        paid_at: DateTime<Utc>,
    ) -> Result<PaymentEntity>;

    /// Completed payments, newest first, optionally bounded to a lookback
    /// window starting at `since`.
    async fn list_completed_since(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<PaymentEntity>>;

    async fn list_completed_for_user(&self, user_id: Uuid) -> Result<Vec<PaymentEntity>>;
}
