use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::fiscal_profiles::LegacyFiscalProfileEntity;

#[automock]
#[async_trait]
pub trait LegacyFiscalProfileRepository {
    async fn find_by_account(&self, account_id: &str) -> Result<Option<LegacyFiscalProfileEntity>>;
}
