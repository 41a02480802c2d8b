use std::sync::Arc;

use anyhow::Result;
use crates::domain::{
    repositories::{fiscal_profiles::LegacyFiscalProfileRepository, owners::OwnerDirectory},
    value_objects::fiscal_profiles::InvoiceRecipient,
};
use tracing::{debug, info};

/// Where a resolved recipient came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FiscalProfileSource {
    OwnerProfile,
    LegacyRecord,
}

/// Finds the invoice recipient for an account. The owner's own profile wins
/// outright; the legacy record is read only when there is none.
pub struct FiscalProfileResolver {
    owners: OwnerDirectory,
    legacy_profiles: Arc<dyn LegacyFiscalProfileRepository + Send + Sync>,
}

impl FiscalProfileResolver {
    pub fn new(
        owners: OwnerDirectory,
        legacy_profiles: Arc<dyn LegacyFiscalProfileRepository + Send + Sync>,
    ) -> Self {
        Self {
            owners,
            legacy_profiles,
        }
    }

    pub async fn resolve(
        &self,
        account_id: &str,
    ) -> Result<Option<(InvoiceRecipient, FiscalProfileSource)>> {
        if let Some(owner) = self.owners.resolve(account_id).await? {
            if let Some(profile) = owner.repository.find_fiscal_profile(account_id).await? {
                debug!(%account_id, owner_kind = %owner.kind, "fiscal_profiles: using owner profile");
                return Ok(Some((
                    InvoiceRecipient::from_profile(&profile),
                    FiscalProfileSource::OwnerProfile,
                )));
            }
        }

        match self.legacy_profiles.find_by_account(account_id).await? {
            Some(record) => {
                debug!(%account_id, "fiscal_profiles: using legacy record");
                Ok(Some((
                    InvoiceRecipient::from_legacy(&record),
                    FiscalProfileSource::LegacyRecord,
                )))
            }
            None => {
                info!(%account_id, "fiscal_profiles: no fiscal profile on record");
                Ok(None)
            }
        }
    }
}
