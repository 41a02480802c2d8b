use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;

use crate::domain::{
    entities::listings::ListingEntity,
    value_objects::{
        activation::{ActivationOutcome, ActivationRequest},
        lifecycle::EndDateWindow,
    },
};

#[automock]
#[async_trait]
pub trait ListingRepository {
    /// Reads the listing and applies `decide_activation` in one
    /// single-document transaction.
    async fn activate_listing(&self, request: ActivationRequest) -> Result<ActivationOutcome>;

    async fn find_active_ending_within(&self, window: EndDateWindow) -> Result<Vec<ListingEntity>>;

    /// Marks every listing in `listing_ids` expired in one atomic batch.
    /// Fails when the batch exceeds `MAX_BATCH_WRITES`.
    async fn commit_expiration_batch(
        &self,
        listing_ids: Vec<String>,
        expired_at: DateTime<Utc>,
    ) -> Result<usize>;

    async fn find_purgeable(&self, cutoff: DateTime<Utc>) -> Result<Vec<String>>;

    async fn commit_purge_batch(&self, listing_ids: Vec<String>) -> Result<usize>;
}
