use std::{collections::BTreeMap, sync::Arc};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::Level;

#[derive(Clone, Debug)]
pub(crate) struct AlertSpan {
    pub(crate) name: String,
    pub(crate) fields: BTreeMap<String, String>,
}

/// A log event above the alert threshold, with secrets already redacted.
#[derive(Clone, Debug)]
pub(crate) struct AlertEvent {
    pub(crate) level: Level,
    pub(crate) timestamp: DateTime<Utc>,
    pub(crate) service_name: String,
    pub(crate) environment: String,
    pub(crate) component: String,
    pub(crate) target: String,
    pub(crate) location: Option<String>,
    pub(crate) message: Option<String>,
    pub(crate) fields: BTreeMap<String, String>,
    pub(crate) spans: Vec<AlertSpan>,
}

#[async_trait]
pub(crate) trait AlertSink: Send + Sync {
    async fn deliver(&self, event: &AlertEvent) -> Result<()>;

    fn sink_name(&self) -> &'static str;
}

/// Bounded queue drained by one background task. Enqueueing never blocks the
/// thread that emitted the log event.
#[derive(Clone)]
pub(crate) struct AlertDispatcher {
    tx: mpsc::Sender<AlertEvent>,
}

impl AlertDispatcher {
    pub(crate) fn spawn(sinks: Vec<Arc<dyn AlertSink>>, capacity: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<AlertEvent>(capacity.max(1));

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                for sink in &sinks {
                    // eprintln, not tracing: a failing sink must not feed itself.
                    if let Err(err) = sink.deliver(&event).await {
                        eprintln!("alert sink {} failed: {err}", sink.sink_name());
                    }
                }
            }
        });

        Self { tx }
    }

    /// Returns false when the event was dropped.
    pub(crate) fn enqueue(&self, event: AlertEvent) -> bool {
        self.tx.try_send(event).is_ok()
    }
}
