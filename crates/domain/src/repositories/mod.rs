pub mod boards;
pub mod expiry_notifications;
pub mod payment_gateways;
pub mod payments;
pub mod plans;
pub mod subscriptions;
