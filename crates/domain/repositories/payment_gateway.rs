use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::payments::GatewayPayment;

#[automock]
#[async_trait]
pub trait PaymentGateway {
    /// `Ok(None)` when the gateway does not know the payment.
    async fn get_payment(&self, payment_id: &str) -> Result<Option<GatewayPayment>>;

    fn gateway_name(&self) -> &'static str;
}
