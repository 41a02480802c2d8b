use chrono_tz::Tz;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub worker_server: WorkerServer,
    pub database: Database,
    pub scheduler: Scheduler,
    pub internal_jobs: InternalJobs,
    pub push: Option<PushGateway>,
}

#[derive(Debug, Clone)]
pub struct WorkerServer {
    pub port: u16,
    pub timeout: u64,
    pub body_limit: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    pub timezone: Tz,
    pub daily_cron: String,
    pub monthly_cron: String,
    pub max_retries: u32,
    pub retry_backoff_secs: u64,
}

#[derive(Debug, Clone)]
pub struct InternalJobs {
    pub token: Option<String>,
}

/// Present only when `PUSH_GATEWAY_URL` is set.
#[derive(Debug, Clone)]
pub struct PushGateway {
    pub url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
}
