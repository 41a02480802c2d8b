use anyhow::{Context, Result, anyhow};
use chrono_tz::Tz;

use super::config_model::{
    Database, DotEnvyConfig, InternalJobs, PushGateway, Scheduler, WorkerServer,
};

pub const DEFAULT_TIMEZONE: &str = "America/Argentina/Buenos_Aires";
pub const DEFAULT_DAILY_CRON: &str = "0 0 0 * * *";
pub const DEFAULT_MONTHLY_CRON: &str = "0 0 2 1 * *";

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let worker_server = WorkerServer {
        port: required("SERVER_PORT_WORKER")?
            .parse()
            .context("SERVER_PORT_WORKER is invalid")?,
        body_limit: required("SERVER_BODY_LIMIT")?
            .parse()
            .context("SERVER_BODY_LIMIT is invalid")?,
        timeout: required("SERVER_TIMEOUT")?
            .parse()
            .context("SERVER_TIMEOUT is invalid")?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
    };

    let timezone = optional("SCHEDULER_TIMEZONE").unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
    let scheduler = Scheduler {
        timezone: parse_timezone(&timezone)?,
        daily_cron: optional("DAILY_JOB_CRON").unwrap_or_else(|| DEFAULT_DAILY_CRON.to_string()),
        monthly_cron: optional("MONTHLY_JOB_CRON")
            .unwrap_or_else(|| DEFAULT_MONTHLY_CRON.to_string()),
        max_retries: optional("JOB_MAX_RETRIES")
            .unwrap_or_else(|| "3".to_string())
            .parse()
            .context("JOB_MAX_RETRIES is invalid")?,
        retry_backoff_secs: optional("JOB_RETRY_BACKOFF_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse()
            .context("JOB_RETRY_BACKOFF_SECS is invalid")?,
    };

    let internal_jobs = InternalJobs {
        token: optional("INTERNAL_JOB_TOKEN"),
    };

    let push = match optional("PUSH_GATEWAY_URL") {
        Some(url) => Some(PushGateway {
            url,
            token: optional("PUSH_GATEWAY_TOKEN"),
            timeout_secs: optional("PUSH_TIMEOUT_SECS")
                .unwrap_or_else(|| "5".to_string())
                .parse()
                .context("PUSH_TIMEOUT_SECS is invalid")?,
        }),
        None => None,
    };

    Ok(DotEnvyConfig {
        worker_server,
        database,
        scheduler,
        internal_jobs,
        push,
    })
}

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|err| anyhow!("SCHEDULER_TIMEZONE is invalid: {err}"))
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{key} is invalid"))
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|v| {
        let trimmed = v.trim().to_string();
        (!trimmed.is_empty()).then_some(trimmed)
    })
}
