use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;

/// A six-field cron expression (seconds first) evaluated in a fixed IANA zone.
#[derive(Debug, Clone)]
pub struct JobSchedule {
    name: &'static str,
    schedule: Schedule,
    timezone: Tz,
}

impl JobSchedule {
    pub fn parse(name: &'static str, expression: &str, timezone: Tz) -> Result<Self> {
        let schedule = Schedule::from_str(expression)
            .with_context(|| format!("{name}: cron expression `{expression}` is invalid"))?;

        Ok(Self {
            name,
            schedule,
            timezone,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Next fire time strictly after `now`.
    pub fn next_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule
            .after(&now.with_timezone(&self.timezone))
            .next()
            .map(|next| next.with_timezone(&Utc))
    }
}
