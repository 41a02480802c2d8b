use std::{sync::Arc, time::Duration};

use anyhow::Result;
use crates::infra::db::postgres::postgres_connection;
use tracing::{error, info};
use worker::{
    axum_http::http_serve,
    build_lifecycle_jobs,
    config::config_loader,
    scheduler::{
        job_runner::{RetryPolicy, ScheduledJob, run_scheduled},
        schedule::JobSchedule,
    },
};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Worker exited with error: {:#}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    crates::observability::init_observability("worker")?;

    let dotenvy_env = Arc::new(config_loader::load()?);
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(&dotenvy_env.database.url)?;
    info!("Postgres connection has been established");

    let jobs = build_lifecycle_jobs(&dotenvy_env, Arc::new(postgres_pool))?;
    if dotenvy_env.push.is_none() {
        info!("Push gateway not configured; notifications are stored only");
    }

    let scheduler = &dotenvy_env.scheduler;
    let daily_schedule = JobSchedule::parse("daily", &scheduler.daily_cron, scheduler.timezone)?;
    let monthly_schedule =
        JobSchedule::parse("monthly", &scheduler.monthly_cron, scheduler.timezone)?;
    let policy = RetryPolicy {
        max_retries: scheduler.max_retries,
        backoff_base: Duration::from_secs(scheduler.retry_backoff_secs),
    };

    let daily_job: Arc<dyn ScheduledJob + Send + Sync> = jobs.daily.clone();
    let monthly_job: Arc<dyn ScheduledJob + Send + Sync> = jobs.monthly.clone();
    let daily_loop = tokio::spawn(run_scheduled(daily_schedule, daily_job, policy));
    let monthly_loop = tokio::spawn(run_scheduled(monthly_schedule, monthly_job, policy));

    let server_config = Arc::clone(&dotenvy_env);
    let http_server = tokio::spawn(async move {
        http_serve::start(server_config, jobs.daily, jobs.monthly).await
    });

    info!("Worker started");

    tokio::select! {
        result = daily_loop => result??,
        result = monthly_loop => result??,
        result = http_server => result??,
    };
    Ok(())
}
