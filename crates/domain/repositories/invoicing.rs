use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::invoices::{InvoiceOutcome, InvoiceRequest};

#[automock]
#[async_trait]
pub trait InvoiceEmitter {
    async fn emit(&self, request: InvoiceRequest) -> InvoiceOutcome;
}
