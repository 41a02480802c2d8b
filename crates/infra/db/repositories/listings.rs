use std::{ops::Bound, sync::Arc};

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{Connection, RunQueryDsl, delete, prelude::*, update};
use tokio::task;

use crate::{
    domain::{
        entities::listings::{ListingEntity, ListingExpirationChangeset},
        repositories::listings::ListingRepository,
        value_objects::{
            activation::{
                ActivationDecision, ActivationOutcome, ActivationRequest, decide_activation,
            },
            lifecycle::{EndDateWindow, MAX_BATCH_WRITES},
        },
    },
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::listings},
};

pub struct ListingPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ListingPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

fn ensure_batch_size(len: usize) -> Result<()> {
    if len > MAX_BATCH_WRITES {
        bail!("batch of {len} writes exceeds the limit of {MAX_BATCH_WRITES}");
    }
    Ok(())
}

#[async_trait]
impl ListingRepository for ListingPostgres {
    async fn activate_listing(&self, request: ActivationRequest) -> Result<ActivationOutcome> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<ActivationOutcome> {
            let mut conn = db_pool.get()?;

            conn.transaction::<ActivationOutcome, anyhow::Error, _>(|conn| {
                // Row lock holds off a concurrent delivery of the same payment
                // until this transaction commits.
                let current = listings::table
                    .find(request.listing_id.as_str())
                    .select(ListingEntity::as_select())
                    .for_update()
                    .first::<ListingEntity>(conn)
                    .optional()?;

                match decide_activation(current.as_ref(), &request) {
                    ActivationDecision::Skip(reason) => Ok(ActivationOutcome::Skipped(reason)),
                    ActivationDecision::Apply(changeset) => {
                        let activated = update(listings::table.find(request.listing_id.as_str()))
                            .set(&changeset)
                            .returning(ListingEntity::as_returning())
                            .get_result::<ListingEntity>(conn)?;

                        Ok(ActivationOutcome::Activated(activated))
                    }
                }
            })
        })
        .await?
    }

    async fn find_active_ending_within(&self, window: EndDateWindow) -> Result<Vec<ListingEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<Vec<ListingEntity>> {
            let mut conn = db_pool.get()?;

            let mut query = listings::table
                .select(ListingEntity::as_select())
                .filter(listings::is_active.eq(true))
                .filter(listings::subscription_end_date.is_not_null())
                .into_boxed();

            query = match window.start {
                Bound::Included(start) => query.filter(listings::subscription_end_date.ge(start)),
                Bound::Excluded(start) => query.filter(listings::subscription_end_date.gt(start)),
                Bound::Unbounded => query,
            };
            query = match window.end {
                Bound::Included(end) => query.filter(listings::subscription_end_date.le(end)),
                Bound::Excluded(end) => query.filter(listings::subscription_end_date.lt(end)),
                Bound::Unbounded => query,
            };

            let result = query
                .order(listings::subscription_end_date.asc())
                .load::<ListingEntity>(&mut conn)?;
            Ok(result)
        })
        .await?
    }

    async fn commit_expiration_batch(
        &self,
        listing_ids: Vec<String>,
        expired_at: DateTime<Utc>,
    ) -> Result<usize> {
        ensure_batch_size(listing_ids.len())?;
        if listing_ids.is_empty() {
            return Ok(0);
        }

        let db_pool = Arc::clone(&self.db_pool);
        let changeset = ListingExpirationChangeset::at(expired_at);

        task::spawn_blocking(move || -> Result<usize> {
            let mut conn = db_pool.get()?;

            conn.transaction::<usize, anyhow::Error, _>(|conn| {
                // A listing renewed after it was staged keeps its new window.
                let updated = update(
                    listings::table
                        .filter(listings::id.eq_any(&listing_ids))
                        .filter(listings::is_active.eq(true))
                        .filter(listings::subscription_end_date.le(expired_at)),
                )
                .set(&changeset)
                .execute(conn)?;

                Ok(updated)
            })
        })
        .await?
    }

    async fn find_purgeable(&self, cutoff: DateTime<Utc>) -> Result<Vec<String>> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<Vec<String>> {
            let mut conn = db_pool.get()?;

            let result = listings::table
                .select(listings::id)
                .filter(listings::is_active.eq(false))
                .filter(listings::subscription_end_date.le(cutoff))
                .order(listings::subscription_end_date.asc())
                .load::<String>(&mut conn)?;
            Ok(result)
        })
        .await?
    }

    async fn commit_purge_batch(&self, listing_ids: Vec<String>) -> Result<usize> {
        ensure_batch_size(listing_ids.len())?;
        if listing_ids.is_empty() {
            return Ok(0);
        }

        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<usize> {
            let mut conn = db_pool.get()?;

            conn.transaction::<usize, anyhow::Error, _>(|conn| {
                let deleted = delete(
                    listings::table
                        .filter(listings::id.eq_any(&listing_ids))
                        .filter(listings::is_active.eq(false)),
                )
                .execute(conn)?;

                Ok(deleted)
            })
        })
        .await?
    }
}
