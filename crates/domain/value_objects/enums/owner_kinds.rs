use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Account kinds that can own a listing. Lookups probe them in `PROBE_ORDER`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OwnerKind {
    Provider,
    Shop,
}

impl OwnerKind {
    pub const PROBE_ORDER: [OwnerKind; 2] = [OwnerKind::Provider, OwnerKind::Shop];

    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerKind::Provider => "provider",
            OwnerKind::Shop => "shop",
        }
    }
}

impl Display for OwnerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
