use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A completed payment whose plan does not match the payer's current plan.
///
/// A drift record is a finding, not an error: it can mean the payment was
/// never applied, or that the user legitimately changed plans after paying.
/// The two cases are indistinguishable here and are reported identically;
/// repairing is an explicit operator decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentDrift {
    pub payment_id: Uuid,
    pub transaction_id: String,
    pub user_id: Uuid,
    pub expected_plan_id: Uuid,
    pub actual_plan_id: Option<Uuid>,
    pub paid_at: Option<DateTime<Utc>>,
}

/// Wire representation of a freshly initiated checkout: the pending payment
/// the gateway is expected to confirm by transaction id.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutDto {
    pub payment_id: Uuid,
    pub transaction_id: String,
    pub gateway_slug: String,
    pub plan_slug: String,
    pub amount_minor: i32,
    pub currency: String,
}
