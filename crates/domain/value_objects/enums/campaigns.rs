use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Purchasable subscription lengths for a listing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Campaign {
    Monthly,
    Quarterly,
    Semiannual,
    Annual,
}

impl Campaign {
    pub fn as_str(&self) -> &'static str {
        match self {
            Campaign::Monthly => "monthly",
            Campaign::Quarterly => "quarterly",
            Campaign::Semiannual => "semiannual",
            Campaign::Annual => "annual",
        }
    }

    pub fn months(&self) -> u32 {
        match self {
            Campaign::Monthly => 1,
            Campaign::Quarterly => 3,
            Campaign::Semiannual => 6,
            Campaign::Annual => 12,
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "monthly" => Some(Campaign::Monthly),
            "quarterly" => Some(Campaign::Quarterly),
            "semiannual" => Some(Campaign::Semiannual),
            "annual" => Some(Campaign::Annual),
            _ => None,
        }
    }
}

impl Display for Campaign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
