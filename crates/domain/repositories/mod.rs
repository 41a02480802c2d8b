pub mod fiscal_profiles;
pub mod invoicing;
pub mod listings;
pub mod notifications;
pub mod owners;
pub mod payment_gateway;
