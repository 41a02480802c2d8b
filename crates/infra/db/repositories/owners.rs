use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use diesel::{RunQueryDsl, dsl::exists, prelude::*, select};
use tokio::task;

use crate::{
    domain::{
        repositories::owners::OwnerRepository,
        value_objects::{enums::owner_kinds::OwnerKind, fiscal_profiles::FiscalProfileRecord},
    },
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{providers, shops},
    },
};

/// Owner accounts of one kind; `kind` selects the backing table.
pub struct OwnerPostgres {
    kind: OwnerKind,
    db_pool: Arc<PgPoolSquad>,
}

impl OwnerPostgres {
    pub fn new(kind: OwnerKind, db_pool: Arc<PgPoolSquad>) -> Self {
        Self { kind, db_pool }
    }

    /// One repository per owner kind, in probe order.
    pub fn all(db_pool: Arc<PgPoolSquad>) -> Vec<Arc<dyn OwnerRepository + Send + Sync>> {
        OwnerKind::PROBE_ORDER
            .iter()
            .map(|kind| {
                Arc::new(Self::new(*kind, Arc::clone(&db_pool)))
                    as Arc<dyn OwnerRepository + Send + Sync>
            })
            .collect()
    }
}

#[async_trait]
impl OwnerRepository for OwnerPostgres {
    fn owner_kind(&self) -> OwnerKind {
        self.kind
    }

    async fn exists(&self, owner_id: &str) -> Result<bool> {
        let db_pool = Arc::clone(&self.db_pool);
        let kind = self.kind;
        let owner_id = owner_id.to_string();

        task::spawn_blocking(move || -> Result<bool> {
            let mut conn = db_pool.get()?;

            let found = match kind {
                OwnerKind::Provider => {
                    select(exists(providers::table.find(owner_id.as_str())))
                        .get_result::<bool>(&mut conn)?
                }
                OwnerKind::Shop => {
                    select(exists(shops::table.find(owner_id.as_str())))
                        .get_result::<bool>(&mut conn)?
                }
            };
            Ok(found)
        })
        .await?
    }

    async fn find_fiscal_profile(&self, owner_id: &str) -> Result<Option<FiscalProfileRecord>> {
        let db_pool = Arc::clone(&self.db_pool);
        let kind = self.kind;
        let owner_id = owner_id.to_string();

        let raw = task::spawn_blocking(move || -> Result<Option<serde_json::Value>> {
            let mut conn = db_pool.get()?;

            let value = match kind {
                OwnerKind::Provider => providers::table
                    .find(owner_id.as_str())
                    .select(providers::fiscal_profile)
                    .first::<Option<serde_json::Value>>(&mut conn)
                    .optional()?,
                OwnerKind::Shop => shops::table
                    .find(owner_id.as_str())
                    .select(shops::fiscal_profile)
                    .first::<Option<serde_json::Value>>(&mut conn)
                    .optional()?,
            };
            Ok(value.flatten())
        })
        .await??;

        raw.map(|value| {
            serde_json::from_value::<FiscalProfileRecord>(value)
                .with_context(|| format!("malformed fiscal profile on {} account", kind.as_str()))
        })
        .transpose()
    }
}
