use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::Client;
use serde_json::json;
use url::Url;

use super::alerts::{AlertEvent, AlertSink};

const CONTENT_LIMIT: usize = 2000;
const TRUNCATION_SUFFIX: &str = "\n… (truncated)";

pub(crate) struct DiscordAlertSink {
    webhook_url: Url,
    client: Client,
}

impl DiscordAlertSink {
    pub(crate) fn new(webhook_url: Url) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(3))
            .build()
            .context("failed to build discord http client")?;

        Ok(Self {
            webhook_url,
            client,
        })
    }
}

pub(crate) fn render(event: &AlertEvent) -> String {
    let mut lines = vec![
        format!(
            "**{}** `{}` `{}` `{}`",
            event.service_name,
            event.environment,
            event.component,
            event.level.as_str()
        ),
        format!(
            "`{}` `{}`{}",
            event.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            event.target,
            event
                .location
                .as_deref()
                .map(|location| format!(" `{location}`"))
                .unwrap_or_default()
        ),
    ];

    if let Some(message) = event.message.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        lines.push(format!("> {message}"));
    }

    if !event.spans.is_empty() {
        let chain = event
            .spans
            .iter()
            .map(|span| span.name.as_str())
            .collect::<Vec<_>>()
            .join(" > ");
        lines.push(format!("spans: `{chain}`"));
    }

    let span_fields = event
        .spans
        .iter()
        .flat_map(|span| span.fields.iter())
        .filter(|(key, _)| !event.fields.contains_key(*key));

    let all_fields: Vec<_> = event.fields.iter().chain(span_fields).collect();
    if !all_fields.is_empty() {
        lines.push("fields:".to_string());
        for (key, value) in all_fields {
            lines.push(format!("- `{key}` = `{value}`"));
        }
    }

    truncate(lines.join("\n"))
}

fn truncate(content: String) -> String {
    if content.chars().count() <= CONTENT_LIMIT {
        return content;
    }

    let allowed = CONTENT_LIMIT.saturating_sub(TRUNCATION_SUFFIX.chars().count());
    let mut truncated: String = content.chars().take(allowed).collect();
    truncated.push_str(TRUNCATION_SUFFIX);
    truncated
}

#[async_trait]
impl AlertSink for DiscordAlertSink {
    async fn deliver(&self, event: &AlertEvent) -> Result<()> {
        let response = self
            .client
            .post(self.webhook_url.clone())
            .json(&json!({ "content": render(event) }))
            .send()
            .await
            // reqwest errors embed the URL, which carries the webhook secret.
            .map_err(|err| {
                if err.is_timeout() {
                    anyhow!("discord webhook request timed out")
                } else if err.is_connect() {
                    anyhow!("discord webhook connection failed")
                } else {
                    anyhow!("discord webhook request failed")
                }
            })?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(anyhow!(
            "discord webhook returned non-success status: {}",
            response.status()
        ))
    }

    fn sink_name(&self) -> &'static str {
        "discord"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::alerts::AlertSpan;
    use chrono::Utc;
    use std::collections::BTreeMap;
    use tracing::Level;

    fn event(message: String) -> AlertEvent {
        AlertEvent {
            level: Level::ERROR,
            timestamp: Utc::now(),
            service_name: "lifecycle".to_string(),
            environment: "prod".to_string(),
            component: "worker".to_string(),
            target: "worker::scheduler".to_string(),
            location: Some("worker/src/scheduler/job_runner.rs:42".to_string()),
            message: Some(message),
            fields: BTreeMap::from([("job".to_string(), "daily".to_string())]),
            spans: vec![AlertSpan {
                name: "lifecycle_job".to_string(),
                fields: BTreeMap::from([("attempt".to_string(), "3".to_string())]),
            }],
        }
    }

    #[test]
    fn renders_header_message_and_fields() {
        let content = render(&event("lifecycle: job failed".to_string()));
        assert!(content.starts_with("**lifecycle** `prod` `worker` `ERROR`"));
        assert!(content.contains("> lifecycle: job failed"));
        assert!(content.contains("spans: `lifecycle_job`"));
        assert!(content.contains("- `job` = `daily`"));
        assert!(content.contains("- `attempt` = `3`"));
    }

    #[test]
    fn long_content_is_truncated() {
        let content = render(&event("x".repeat(5000)));
        assert_eq!(content.chars().count(), CONTENT_LIMIT);
        assert!(content.ends_with(TRUNCATION_SUFFIX));
    }
}
