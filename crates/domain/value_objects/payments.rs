use crate::domain::value_objects::enums::campaigns::Campaign;

pub const APPROVED_STATUS: &str = "approved";

/// A payment as reported by the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayPayment {
    pub id: String,
    pub status: String,
    pub external_reference: Option<String>,
    pub transaction_amount: Option<f64>,
    pub payer_email: Option<String>,
    /// Campaign attached to the checkout preference metadata.
    pub campaign: Option<Campaign>,
}

impl GatewayPayment {
    pub fn is_approved(&self) -> bool {
        self.status.eq_ignore_ascii_case(APPROVED_STATUS)
    }

    pub fn order_reference(&self) -> Option<&str> {
        self.external_reference
            .as_deref()
            .map(str::trim)
            .filter(|reference| !reference.is_empty())
    }
}
