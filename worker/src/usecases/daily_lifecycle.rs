use std::sync::Arc;

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crates::domain::{
    entities::listings::ListingEntity,
    repositories::{
        listings::ListingRepository, notifications::NotificationEmitter, owners::OwnerDirectory,
    },
    value_objects::{
        enums::notification_kinds::NotificationKind,
        lifecycle::{EndDateWindow, MAX_BATCH_WRITES},
        notifications::NewNotification,
    },
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::scheduler::job_runner::ScheduledJob;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DailyLifecycleReport {
    pub warned_five_days: usize,
    pub warned_final_day: usize,
    pub notification_failures: usize,
    pub unresolved_owners: usize,
    pub expired: usize,
    pub batches_committed: usize,
}

/// Warn, warn again, expire. Each pass re-reads current state. An owner that
/// exists nowhere is skipped; an owner lookup or notification store error is
/// counted, the remaining passes still run, and the run then fails so the
/// scheduler retries it.
pub struct DailyLifecycleUseCase {
    listing_repository: Arc<dyn ListingRepository + Send + Sync>,
    owners: OwnerDirectory,
    notifications: Arc<dyn NotificationEmitter + Send + Sync>,
}

impl DailyLifecycleUseCase {
    pub fn new(
        listing_repository: Arc<dyn ListingRepository + Send + Sync>,
        owners: OwnerDirectory,
        notifications: Arc<dyn NotificationEmitter + Send + Sync>,
    ) -> Self {
        Self {
            listing_repository,
            owners,
            notifications,
        }
    }

    pub async fn run(&self) -> Result<DailyLifecycleReport> {
        self.run_at(Utc::now()).await
    }

    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<DailyLifecycleReport> {
        let mut report = DailyLifecycleReport::default();

        let warned_five_days = self
            .warning_pass(
                EndDateWindow::five_day_warning(now),
                NotificationKind::WarningFiveDays,
                &mut report,
            )
            .await?;
        report.warned_five_days = warned_five_days;

        let warned_final_day = self
            .warning_pass(
                EndDateWindow::final_day_warning(now),
                NotificationKind::WarningFinalDay,
                &mut report,
            )
            .await?;
        report.warned_final_day = warned_final_day;

        self.expiration_pass(now, &mut report).await?;

        info!(
            warned_five_days = report.warned_five_days,
            warned_final_day = report.warned_final_day,
            notification_failures = report.notification_failures,
            unresolved_owners = report.unresolved_owners,
            expired = report.expired,
            batches_committed = report.batches_committed,
            "daily_lifecycle: passes finished"
        );

        // Expiration still ran; the retry re-evaluates both warning windows.
        if report.notification_failures > 0 {
            bail!(
                "daily_lifecycle: {} notification(s) failed on store or owner lookup errors",
                report.notification_failures
            );
        }

        Ok(report)
    }

    async fn warning_pass(
        &self,
        window: EndDateWindow,
        kind: NotificationKind,
        report: &mut DailyLifecycleReport,
    ) -> Result<usize> {
        let listings = self
            .listing_repository
            .find_active_ending_within(window)
            .await?;

        if listings.is_empty() {
            return Ok(0);
        }

        let mut sent = 0;
        for listing in &listings {
            if self.notify_owner(listing, kind, report).await {
                sent += 1;
            }
        }

        info!(
            %kind,
            matched = listings.len(),
            sent,
            "daily_lifecycle: warning pass finished"
        );
        Ok(sent)
    }

    /// Errors are counted against the run; the pass goes on.
    async fn notify_owner(
        &self,
        listing: &ListingEntity,
        kind: NotificationKind,
        report: &mut DailyLifecycleReport,
    ) -> bool {
        let owner = match self.owners.resolve(&listing.owner_id).await {
            Ok(Some(owner)) => owner,
            Ok(None) => {
                warn!(
                    listing_id = %listing.id,
                    owner_id = %listing.owner_id,
                    %kind,
                    "daily_lifecycle: owner not found in any owner collection; skipping"
                );
                report.unresolved_owners += 1;
                return false;
            }
            Err(err) => {
                error!(
                    listing_id = %listing.id,
                    owner_id = %listing.owner_id,
                    error = ?err,
                    "daily_lifecycle: owner lookup failed; skipping"
                );
                report.notification_failures += 1;
                return false;
            }
        };

        let notification = NewNotification {
            recipient_id: listing.owner_id.clone(),
            owner_kind: owner.kind,
            listing_id: listing.id.clone(),
            kind,
        };

        match self.notifications.emit(notification).await {
            Ok(()) => true,
            Err(err) => {
                error!(
                    listing_id = %listing.id,
                    %kind,
                    error = ?err,
                    "daily_lifecycle: failed to create notification"
                );
                report.notification_failures += 1;
                false
            }
        }
    }

    async fn expiration_pass(
        &self,
        now: DateTime<Utc>,
        report: &mut DailyLifecycleReport,
    ) -> Result<()> {
        let due = self
            .listing_repository
            .find_active_ending_within(EndDateWindow::expiration(now))
            .await?;

        if due.is_empty() {
            return Ok(());
        }

        let listing_ids: Vec<String> = due.into_iter().map(|listing| listing.id).collect();
        for chunk in listing_ids.chunks(MAX_BATCH_WRITES) {
            let expired = self
                .listing_repository
                .commit_expiration_batch(chunk.to_vec(), now)
                .await?;

            report.expired += expired;
            report.batches_committed += 1;
            info!(
                batch = report.batches_committed,
                staged = chunk.len(),
                expired,
                "daily_lifecycle: expiration batch committed"
            );
        }

        Ok(())
    }
}

#[async_trait]
impl ScheduledJob for DailyLifecycleUseCase {
    fn name(&self) -> &'static str {
        "daily_lifecycle"
    }

    async fn execute(&self) -> Result<()> {
        self.run().await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use crates::domain::{
        repositories::{
            listings::MockListingRepository, notifications::MockNotificationEmitter,
            owners::MockOwnerRepository,
        },
        value_objects::enums::{listing_statuses::ListingStatus, owner_kinds::OwnerKind},
    };
    use std::sync::Mutex;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 3, 0, 0).unwrap()
    }

    fn active_listing(id: &str, ends_at: DateTime<Utc>) -> ListingEntity {
        ListingEntity {
            id: id.to_string(),
            owner_id: id.to_string(),
            campaign_id: Some("monthly".to_string()),
            status: ListingStatus::Active.to_string(),
            is_active: true,
            subscription_start_date: Some(ends_at - Duration::days(30)),
            subscription_end_date: Some(ends_at),
            payment_id: Some(format!("pay-{id}")),
            payment_confirmed_at: Some(ends_at - Duration::days(30)),
            subscription_expired_at: None,
            created_at: ends_at - Duration::days(60),
            updated_at: ends_at - Duration::days(30),
        }
    }

    fn owners(known: &'static [&'static str]) -> OwnerDirectory {
        let mut providers = MockOwnerRepository::new();
        providers.expect_owner_kind().return_const(OwnerKind::Provider);
        providers
            .expect_exists()
            .returning(move |owner_id| Ok(known.contains(&owner_id)));
        let mut shops = MockOwnerRepository::new();
        shops.expect_owner_kind().return_const(OwnerKind::Shop);
        shops.expect_exists().returning(|_| Ok(false));
        OwnerDirectory::new(vec![Arc::new(providers), Arc::new(shops)])
    }

    fn listings_for_windows(
        five_day: Vec<ListingEntity>,
        final_day: Vec<ListingEntity>,
        expired: Vec<ListingEntity>,
    ) -> MockListingRepository {
        let mut repo = MockListingRepository::new();
        repo.expect_find_active_ending_within()
            .withf(|window| *window == EndDateWindow::five_day_warning(now()))
            .times(1)
            .returning(move |_| Ok(five_day.clone()));
        repo.expect_find_active_ending_within()
            .withf(|window| *window == EndDateWindow::final_day_warning(now()))
            .times(1)
            .returning(move |_| Ok(final_day.clone()));
        repo.expect_find_active_ending_within()
            .withf(|window| *window == EndDateWindow::expiration(now()))
            .times(1)
            .returning(move |_| Ok(expired.clone()));
        repo
    }

    #[tokio::test]
    async fn sends_each_warning_kind_to_resolved_owners() {
        let repo = listings_for_windows(
            vec![active_listing("p-1", now() + Duration::days(5))],
            vec![
                active_listing("p-2", now() + Duration::hours(24)),
                active_listing("ghost", now() + Duration::hours(2)),
            ],
            Vec::new(),
        );

        let sent = Arc::new(Mutex::new(Vec::new()));
        let mut notifications = MockNotificationEmitter::new();
        let captured = Arc::clone(&sent);
        notifications.expect_emit().times(2).returning(move |n| {
            captured.lock().unwrap().push((n.listing_id, n.kind, n.owner_kind));
            Ok(())
        });

        let usecase = DailyLifecycleUseCase::new(
            Arc::new(repo),
            owners(&["p-1", "p-2"]),
            Arc::new(notifications),
        );
        let report = usecase.run_at(now()).await.unwrap();

        assert_eq!(report.warned_five_days, 1);
        assert_eq!(report.warned_final_day, 1);
        assert_eq!(report.unresolved_owners, 1);
        assert_eq!(report.expired, 0);
        assert_eq!(report.batches_committed, 0);
        assert_eq!(
            sent.lock().unwrap().as_slice(),
            [
                ("p-1".to_string(), NotificationKind::WarningFiveDays, OwnerKind::Provider),
                ("p-2".to_string(), NotificationKind::WarningFinalDay, OwnerKind::Provider),
            ]
        );
    }

    #[tokio::test]
    async fn notification_failure_finishes_the_passes_then_fails_the_run() {
        let mut repo = listings_for_windows(
            vec![
                active_listing("p-1", now() + Duration::days(5)),
                active_listing("p-2", now() + Duration::days(5) + Duration::hours(3)),
            ],
            Vec::new(),
            vec![active_listing("p-3", now() - Duration::hours(1))],
        );
        repo.expect_commit_expiration_batch()
            .times(1)
            .returning(|ids, _| Ok(ids.len()));

        let mut notifications = MockNotificationEmitter::new();
        notifications
            .expect_emit()
            .withf(|n| n.listing_id == "p-1")
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("notifications store unavailable")));
        notifications
            .expect_emit()
            .withf(|n| n.listing_id == "p-2")
            .times(1)
            .returning(|_| Ok(()));

        let usecase = DailyLifecycleUseCase::new(
            Arc::new(repo),
            owners(&["p-1", "p-2", "p-3"]),
            Arc::new(notifications),
        );
        let err = usecase.run_at(now()).await.unwrap_err();

        assert!(err.to_string().contains("1 notification(s) failed"));
    }

    #[tokio::test]
    async fn owner_lookup_error_fails_the_run() {
        let repo = listings_for_windows(
            Vec::new(),
            vec![active_listing("p-1", now() + Duration::hours(3))],
            Vec::new(),
        );
        let mut providers = MockOwnerRepository::new();
        providers.expect_owner_kind().return_const(OwnerKind::Provider);
        providers
            .expect_exists()
            .returning(|_| Err(anyhow::anyhow!("owners store unavailable")));

        let mut notifications = MockNotificationEmitter::new();
        notifications.expect_emit().times(0);

        let usecase = DailyLifecycleUseCase::new(
            Arc::new(repo),
            OwnerDirectory::new(vec![Arc::new(providers)]),
            Arc::new(notifications),
        );

        assert!(usecase.run_at(now()).await.is_err());
    }

    #[tokio::test]
    async fn expiration_commits_in_chunks_of_five_hundred() {
        let due: Vec<ListingEntity> = (0..1250)
            .map(|i| active_listing(&format!("l-{i}"), now() - Duration::minutes(i)))
            .collect();
        let mut repo = listings_for_windows(Vec::new(), Vec::new(), due);

        let batch_sizes = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&batch_sizes);
        repo.expect_commit_expiration_batch()
            .withf(|_, expired_at| *expired_at == now())
            .times(3)
            .returning(move |ids, _| {
                captured.lock().unwrap().push(ids.len());
                Ok(ids.len())
            });

        let usecase = DailyLifecycleUseCase::new(
            Arc::new(repo),
            owners(&[]),
            Arc::new(MockNotificationEmitter::new()),
        );
        let report = usecase.run_at(now()).await.unwrap();

        assert_eq!(batch_sizes.lock().unwrap().as_slice(), [500, 500, 250]);
        assert_eq!(report.expired, 1250);
        assert_eq!(report.batches_committed, 3);
    }

    #[tokio::test]
    async fn zero_matches_commit_nothing() {
        let mut repo = listings_for_windows(Vec::new(), Vec::new(), Vec::new());
        repo.expect_commit_expiration_batch().times(0);

        let usecase = DailyLifecycleUseCase::new(
            Arc::new(repo),
            owners(&[]),
            Arc::new(MockNotificationEmitter::new()),
        );
        let report = usecase.run_at(now()).await.unwrap();

        assert_eq!(report, DailyLifecycleReport::default());
    }

    #[tokio::test]
    async fn batch_failure_fails_the_run() {
        let mut repo = listings_for_windows(
            Vec::new(),
            Vec::new(),
            vec![active_listing("l-1", now())],
        );
        repo.expect_commit_expiration_batch()
            .returning(|_, _| Err(anyhow::anyhow!("transaction aborted")));

        let usecase = DailyLifecycleUseCase::new(
            Arc::new(repo),
            owners(&[]),
            Arc::new(MockNotificationEmitter::new()),
        );
        assert!(usecase.run_at(now()).await.is_err());
    }

    #[tokio::test]
    async fn query_failure_fails_the_run() {
        let mut repo = MockListingRepository::new();
        repo.expect_find_active_ending_within()
            .returning(|_| Err(anyhow::anyhow!("store unavailable")));

        let usecase = DailyLifecycleUseCase::new(
            Arc::new(repo),
            owners(&[]),
            Arc::new(MockNotificationEmitter::new()),
        );
        assert!(usecase.run_at(now()).await.is_err());
    }
}
