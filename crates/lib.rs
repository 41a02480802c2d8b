pub mod domain;
pub mod infra;
pub mod invoicing;
pub mod observability;
pub mod payments;
