pub mod activation;
pub mod enums;
pub mod fiscal_profiles;
pub mod invoices;
pub mod lifecycle;
pub mod notifications;
pub mod payment_webhook;
pub mod payments;
