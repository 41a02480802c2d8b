use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crates::domain::{
    repositories::listings::ListingRepository,
    value_objects::lifecycle::{MAX_BATCH_WRITES, purge_cutoff},
};
use serde::Serialize;
use tracing::info;

use crate::scheduler::job_runner::ScheduledJob;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MonthlyPurgeReport {
    pub purged: usize,
    pub batches_committed: usize,
}

pub struct MonthlyPurgeUseCase {
    listing_repository: Arc<dyn ListingRepository + Send + Sync>,
}

impl MonthlyPurgeUseCase {
    pub fn new(listing_repository: Arc<dyn ListingRepository + Send + Sync>) -> Self {
        Self { listing_repository }
    }

    pub async fn run(&self) -> Result<MonthlyPurgeReport> {
        self.run_at(Utc::now()).await
    }

    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<MonthlyPurgeReport> {
        let cutoff = purge_cutoff(now);
        let listing_ids = self.listing_repository.find_purgeable(cutoff).await?;

        let mut report = MonthlyPurgeReport::default();
        for chunk in listing_ids.chunks(MAX_BATCH_WRITES) {
            let purged = self
                .listing_repository
                .commit_purge_batch(chunk.to_vec())
                .await?;

            report.purged += purged;
            report.batches_committed += 1;
            info!(
                batch = report.batches_committed,
                staged = chunk.len(),
                purged,
                "monthly_purge: purge batch committed"
            );
        }

        info!(
            %cutoff,
            purged = report.purged,
            batches_committed = report.batches_committed,
            "monthly_purge: completed"
        );

        Ok(report)
    }
}

#[async_trait]
impl ScheduledJob for MonthlyPurgeUseCase {
    fn name(&self) -> &'static str {
        "monthly_purge"
    }

    async fn execute(&self) -> Result<()> {
        self.run().await.map(|_| ())
    }
}
