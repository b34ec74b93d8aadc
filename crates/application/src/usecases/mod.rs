pub mod entitlements;
pub mod handle_expired_subscriptions;
pub mod payment_reconciliation;
pub mod plan_resolver;
