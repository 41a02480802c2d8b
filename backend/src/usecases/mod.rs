pub mod fiscal_profiles;
pub mod payment_reconciler;
