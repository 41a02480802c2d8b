use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ListingStatus {
    #[default]
    Draft,
    PendingPayment,
    Active,
    Expired,
    Cancelled,
}

impl Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            ListingStatus::Draft => "draft",
            ListingStatus::PendingPayment => "pendingPayment",
            ListingStatus::Active => "active",
            ListingStatus::Expired => "expired",
            ListingStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", status)
    }
}

impl ListingStatus {
    pub fn from_str(value: &str) -> Self {
        match value {
            "draft" => ListingStatus::Draft,
            "pendingPayment" => ListingStatus::PendingPayment,
            "active" => ListingStatus::Active,
            "expired" => ListingStatus::Expired,
            "cancelled" => ListingStatus::Cancelled,
            _ => ListingStatus::Draft,
        }
    }
}
