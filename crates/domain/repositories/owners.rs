use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::{
    enums::owner_kinds::OwnerKind, fiscal_profiles::FiscalProfileRecord,
};

#[automock]
#[async_trait]
pub trait OwnerRepository {
    fn owner_kind(&self) -> OwnerKind;

    async fn exists(&self, owner_id: &str) -> Result<bool>;

    /// Lightweight fiscal profile on the owner account, if one was stored.
    async fn find_fiscal_profile(&self, owner_id: &str) -> Result<Option<FiscalProfileRecord>>;
}

#[derive(Clone)]
pub struct ResolvedOwner {
    pub kind: OwnerKind,
    pub repository: Arc<dyn OwnerRepository + Send + Sync>,
}

impl std::fmt::Debug for ResolvedOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedOwner")
            .field("kind", &self.kind)
            .finish()
    }
}

/// Owner-kind repositories probed in a fixed order; first hit wins.
#[derive(Clone, Default)]
pub struct OwnerDirectory {
    repositories: Vec<Arc<dyn OwnerRepository + Send + Sync>>,
}

impl OwnerDirectory {
    pub fn new(repositories: Vec<Arc<dyn OwnerRepository + Send + Sync>>) -> Self {
        Self { repositories }
    }

    pub async fn resolve(&self, owner_id: &str) -> Result<Option<ResolvedOwner>> {
        for repository in &self.repositories {
            if repository.exists(owner_id).await? {
                return Ok(Some(ResolvedOwner {
                    kind: repository.owner_kind(),
                    repository: Arc::clone(repository),
                }));
            }
        }

        Ok(None)
    }
}
