pub mod fiscal_profiles;
pub mod listings;
pub mod notifications;
