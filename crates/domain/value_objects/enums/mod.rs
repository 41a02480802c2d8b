pub mod campaigns;
pub mod listing_statuses;
pub mod notification_kinds;
pub mod owner_kinds;
pub mod tax_conditions;
