use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, prelude::*};
use tokio::task;

use crate::{
    domain::{
        entities::fiscal_profiles::LegacyFiscalProfileEntity,
        repositories::fiscal_profiles::LegacyFiscalProfileRepository,
    },
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::legacy_fiscal_profiles},
};

pub struct LegacyFiscalProfilePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl LegacyFiscalProfilePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl LegacyFiscalProfileRepository for LegacyFiscalProfilePostgres {
    async fn find_by_account(&self, account_id: &str) -> Result<Option<LegacyFiscalProfileEntity>> {
        let db_pool = Arc::clone(&self.db_pool);
        let account_id = account_id.to_string();

        task::spawn_blocking(move || -> Result<Option<LegacyFiscalProfileEntity>> {
            let mut conn = db_pool.get()?;

            let result = legacy_fiscal_profiles::table
                .find(account_id.as_str())
                .select(LegacyFiscalProfileEntity::as_select())
                .first::<LegacyFiscalProfileEntity>(&mut conn)
                .optional()?;
            Ok(result)
        })
        .await?
    }
}
