pub mod axum_http;
pub mod config;
pub mod scheduler;
pub mod usecases;

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use crates::{
    domain::repositories::{
        listings::ListingRepository, notifications::NotificationEmitter, owners::OwnerDirectory,
    },
    infra::{
        db::{
            postgres::postgres_connection::PgPoolSquad,
            repositories::{
                listings::ListingPostgres, notifications::NotificationPostgres,
                owners::OwnerPostgres,
            },
        },
        push::push_client::PushClient,
    },
};

use crate::{
    config::config_model::DotEnvyConfig,
    usecases::{daily_lifecycle::DailyLifecycleUseCase, monthly_purge::MonthlyPurgeUseCase},
};

pub struct LifecycleJobs {
    pub daily: Arc<DailyLifecycleUseCase>,
    pub monthly: Arc<MonthlyPurgeUseCase>,
}

/// Wires both lifecycle jobs against Postgres and the optional push gateway.
pub fn build_lifecycle_jobs(
    config: &DotEnvyConfig,
    db_pool: Arc<PgPoolSquad>,
) -> Result<LifecycleJobs> {
    let listing_repository: Arc<dyn ListingRepository + Send + Sync> =
        Arc::new(ListingPostgres::new(Arc::clone(&db_pool)));

    let push_client = match &config.push {
        Some(push) => Some(Arc::new(PushClient::new(
            push.url.clone(),
            push.token.clone(),
            Duration::from_secs(push.timeout_secs),
        )?)),
        None => None,
    };
    let notifications: Arc<dyn NotificationEmitter + Send + Sync> = Arc::new(
        NotificationPostgres::new(Arc::clone(&db_pool), push_client),
    );

    let daily = Arc::new(DailyLifecycleUseCase::new(
        Arc::clone(&listing_repository),
        OwnerDirectory::new(OwnerPostgres::all(Arc::clone(&db_pool))),
        notifications,
    ));
    let monthly = Arc::new(MonthlyPurgeUseCase::new(listing_repository));

    Ok(LifecycleJobs { daily, monthly })
}
