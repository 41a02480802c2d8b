use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// VAT condition of an invoice recipient, in the short form the invoicing
/// provider expects.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TaxCondition {
    #[serde(rename = "RI")]
    RegisteredTaxpayer,
    #[serde(rename = "MT")]
    Monotax,
    #[serde(rename = "EX")]
    Exempt,
    #[serde(rename = "CF")]
    FinalConsumer,
    #[serde(rename = "NR")]
    Uncategorized,
}

impl TaxCondition {
    pub fn code(&self) -> &'static str {
        match self {
            TaxCondition::RegisteredTaxpayer => "RI",
            TaxCondition::Monotax => "MT",
            TaxCondition::Exempt => "EX",
            TaxCondition::FinalConsumer => "CF",
            TaxCondition::Uncategorized => "NR",
        }
    }

    pub fn from_code(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "RI" => Some(TaxCondition::RegisteredTaxpayer),
            "MT" => Some(TaxCondition::Monotax),
            "EX" => Some(TaxCondition::Exempt),
            "CF" => Some(TaxCondition::FinalConsumer),
            "NR" => Some(TaxCondition::Uncategorized),
            _ => None,
        }
    }

    /// Maps the long-form enumeration stored by the legacy fiscal record.
    /// Short codes are accepted as well; anything unknown is a final consumer.
    pub fn from_legacy(value: &str) -> Self {
        let normalized = value
            .trim()
            .to_ascii_uppercase()
            .replace([' ', '-'], "_");

        match normalized.as_str() {
            "RESPONSABLE_INSCRIPTO" | "IVA_RESPONSABLE_INSCRIPTO" => {
                TaxCondition::RegisteredTaxpayer
            }
            "MONOTRIBUTISTA" | "MONOTRIBUTO" | "RESPONSABLE_MONOTRIBUTO" => TaxCondition::Monotax,
            "EXENTO" | "IVA_EXENTO" => TaxCondition::Exempt,
            "CONSUMIDOR_FINAL" => TaxCondition::FinalConsumer,
            "NO_RESPONSABLE" | "NO_CATEGORIZADO" | "SUJETO_NO_CATEGORIZADO" => {
                TaxCondition::Uncategorized
            }
            other => Self::from_code(other).unwrap_or(TaxCondition::FinalConsumer),
        }
    }
}

impl Display for TaxCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_legacy_enumeration_onto_short_codes() {
        assert_eq!(
            TaxCondition::from_legacy("RESPONSABLE_INSCRIPTO"),
            TaxCondition::RegisteredTaxpayer
        );
        assert_eq!(TaxCondition::from_legacy("Monotributista"), TaxCondition::Monotax);
        assert_eq!(TaxCondition::from_legacy("exento"), TaxCondition::Exempt);
        assert_eq!(
            TaxCondition::from_legacy("consumidor final"),
            TaxCondition::FinalConsumer
        );
        assert_eq!(
            TaxCondition::from_legacy("NO_RESPONSABLE"),
            TaxCondition::Uncategorized
        );
    }

    #[test]
    fn unknown_legacy_condition_falls_back_to_final_consumer() {
        assert_eq!(TaxCondition::from_legacy("???"), TaxCondition::FinalConsumer);
        assert_eq!(TaxCondition::from_legacy("ri"), TaxCondition::RegisteredTaxpayer);
    }
}
