use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::notifications::NewNotification;

#[automock]
#[async_trait]
pub trait NotificationEmitter {
    async fn emit(&self, notification: NewNotification) -> Result<()>;
}
