use std::fmt::Display;

use crate::domain::value_objects::enums::tax_conditions::TaxCondition;

/// Document number sent when the recipient has no tax identifier.
pub const PLACEHOLDER_DNI: &str = "0";

/// VAT rate attached to the single line item.
pub const PLACEHOLDER_VAT_RATE: f64 = 21.0;

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceRequest {
    pub order_reference: String,
    pub amount: f64,
    pub recipient_tax_id: Option<String>,
    pub recipient_legal_name: String,
    pub recipient_email: Option<String>,
    pub tax_condition: TaxCondition,
    pub send_by_email: bool,
}

impl InvoiceRequest {
    pub fn document_type(&self) -> DocumentType {
        match self.recipient_tax_id.as_deref() {
            Some(tax_id) if !tax_id.trim().is_empty() => DocumentType::Cuit,
            _ => DocumentType::Dni,
        }
    }

    pub fn document_number(&self) -> &str {
        match self.document_type() {
            DocumentType::Cuit => self.recipient_tax_id.as_deref().unwrap_or(PLACEHOLDER_DNI),
            DocumentType::Dni => PLACEHOLDER_DNI,
        }
    }

    pub fn invoice_type(&self) -> InvoiceType {
        InvoiceType::for_condition(self.tax_condition)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentType {
    Cuit,
    Dni,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Cuit => "CUIT",
            DocumentType::Dni => "DNI",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceType {
    A,
    B,
}

impl InvoiceType {
    /// Only registered taxpayers receive type A invoices.
    pub fn for_condition(condition: TaxCondition) -> Self {
        match condition {
            TaxCondition::RegisteredTaxpayer => InvoiceType::A,
            TaxCondition::Monotax
            | TaxCondition::Exempt
            | TaxCondition::FinalConsumer
            | TaxCondition::Uncategorized => InvoiceType::B,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceType::A => "FACTURA A",
            InvoiceType::B => "FACTURA B",
        }
    }
}

impl Display for InvoiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one invoicing attempt. Callers treat every variant as advisory.
#[derive(Debug, Clone, PartialEq)]
pub enum InvoiceOutcome {
    Issued,
    Skipped(String),
    Failed(String),
}

impl InvoiceOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            InvoiceOutcome::Issued => "issued",
            InvoiceOutcome::Skipped(_) => "skipped",
            InvoiceOutcome::Failed(_) => "failed",
        }
    }
}
