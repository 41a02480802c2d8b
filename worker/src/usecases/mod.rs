pub mod daily_lifecycle;
pub mod monthly_purge;
