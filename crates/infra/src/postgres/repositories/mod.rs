pub mod boards;
pub mod payment_gateways;
pub mod payments;
pub mod plans;
pub mod subscriptions;
