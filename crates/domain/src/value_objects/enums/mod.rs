pub mod billing_periods;
pub mod payment_statuses;
