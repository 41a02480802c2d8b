use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    entities::fiscal_profiles::LegacyFiscalProfileEntity,
    value_objects::enums::tax_conditions::TaxCondition,
};

pub const FINAL_CONSUMER_NAME: &str = "Consumidor Final";

/// Lightweight fiscal profile stored on the owner account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiscalProfileRecord {
    #[serde(default)]
    pub via_verificacion: Option<String>,
    pub receptor_para_factura: RecipientKind,
    #[serde(default)]
    pub razon_social: Option<String>,
    #[serde(default)]
    pub condicion_impositiva: Option<String>,
    #[serde(default)]
    pub email_receptor: Option<String>,
    #[serde(default)]
    pub verified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub proveedor: Option<FiscalVerificationSource>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecipientKind {
    #[serde(rename = "CUIT", alias = "cuit", alias = "tax-id")]
    TaxId,
    #[serde(
        rename = "CONSUMIDOR_FINAL",
        alias = "consumidor_final",
        alias = "final-consumer"
    )]
    FinalConsumer,
}

/// Record returned by the identity verification source; carries the tax id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiscalVerificationSource {
    #[serde(default)]
    pub cuit: Option<String>,
    #[serde(default)]
    pub razon_social: Option<String>,
    #[serde(default)]
    pub condicion_impositiva: Option<String>,
    #[serde(default)]
    pub domicilio: Option<String>,
}

/// Who an invoice is addressed to.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceRecipient {
    pub tax_id: Option<String>,
    pub legal_name: String,
    pub email: Option<String>,
    pub tax_condition: TaxCondition,
}

impl InvoiceRecipient {
    pub fn final_consumer(legal_name: Option<&str>, email: Option<&str>) -> Self {
        Self {
            tax_id: None,
            legal_name: non_empty(legal_name).unwrap_or_else(|| FINAL_CONSUMER_NAME.to_string()),
            email: non_empty(email),
            tax_condition: TaxCondition::FinalConsumer,
        }
    }

    pub fn from_profile(profile: &FiscalProfileRecord) -> Self {
        let source = profile.proveedor.clone().unwrap_or_default();
        let legal_name = profile
            .razon_social
            .as_deref()
            .or(source.razon_social.as_deref());

        match profile.receptor_para_factura {
            RecipientKind::FinalConsumer => {
                Self::final_consumer(legal_name, profile.email_receptor.as_deref())
            }
            RecipientKind::TaxId => {
                let Some(tax_id) = normalize_tax_id(source.cuit.as_deref()) else {
                    return Self::final_consumer(legal_name, profile.email_receptor.as_deref());
                };

                let tax_condition = profile
                    .condicion_impositiva
                    .as_deref()
                    .or(source.condicion_impositiva.as_deref())
                    .map(TaxCondition::from_legacy)
                    .unwrap_or(TaxCondition::RegisteredTaxpayer);

                Self {
                    tax_id: Some(tax_id),
                    legal_name: non_empty(legal_name)
                        .unwrap_or_else(|| FINAL_CONSUMER_NAME.to_string()),
                    email: non_empty(profile.email_receptor.as_deref()),
                    tax_condition,
                }
            }
        }
    }

    pub fn from_legacy(record: &LegacyFiscalProfileEntity) -> Self {
        let tax_id = normalize_tax_id(record.cuit.as_deref())
            .or_else(|| normalize_tax_id(record.cuil.as_deref()));

        Self {
            tax_id,
            legal_name: non_empty(Some(&record.razon_social))
                .unwrap_or_else(|| FINAL_CONSUMER_NAME.to_string()),
            email: non_empty(record.email_factura.as_deref()),
            tax_condition: TaxCondition::from_legacy(&record.condicion_impositiva),
        }
    }
}

/// Keeps only the digits of a CUIT/CUIL; `None` when nothing is left.
pub fn normalize_tax_id(raw: Option<&str>) -> Option<String> {
    let digits: String = raw?.chars().filter(|c| c.is_ascii_digit()).collect();
    (!digits.is_empty()).then_some(digits)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
