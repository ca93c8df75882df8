// crates/toolmark-server/src/telemetry.rs
// Entry point for recording: owns both collectors, or nothing when the ledger is disabled

use crate::config::LedgerSettings;
use crate::error::{Result, ToolmarkError};
use crate::ledger::{InvocationCollector, InvocationEvent, IssueCollector};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use toolmark_types::{IssueDocument, IssueReport, MetricsDocument, ReportIssueParams};

struct Collectors {
    invocations: InvocationCollector,
    issues: IssueCollector,
}

/// Point-in-time copy of both ledgers
#[derive(Debug, Clone)]
pub struct TelemetrySnapshot {
    pub metrics: MetricsDocument,
    pub issues: IssueDocument,
}

/// Cheap to clone; all clones share the same collectors
#[derive(Clone, Default)]
pub struct Telemetry {
    inner: Option<Arc<Collectors>>,
}

impl Telemetry {
    /// No collectors, no files
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    /// Build and initialize both collectors, unless the settings disable the ledger
    pub async fn start(settings: &LedgerSettings) -> Self {
        if !settings.enabled {
            tracing::info!("Ledger disabled, not recording tool calls or issues");
            return Self::disabled();
        }

        let collectors = Collectors {
            invocations: InvocationCollector::new(settings),
            issues: IssueCollector::new(settings),
        };
        collectors.invocations.initialize().await;
        collectors.issues.initialize().await;

        tracing::info!(
            server = %settings.server_name,
            dir = %settings.metrics_dir.display(),
            max_file_size = settings.max_file_size,
            "Ledger started"
        );
        Self {
            inner: Some(Arc::new(collectors)),
        }
    }

    /// Load both ledgers for reading. No files are created or rewritten,
    /// and anything recorded through the result is never persisted.
    pub async fn open_read_only(settings: &LedgerSettings) -> Self {
        if !settings.enabled {
            return Self::disabled();
        }

        let collectors = Collectors {
            invocations: InvocationCollector::new(settings),
            issues: IssueCollector::new(settings),
        };
        collectors.invocations.open_read_only().await;
        collectors.issues.open_read_only().await;
        Self {
            inner: Some(Arc::new(collectors)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    pub fn invocations(&self) -> Option<&InvocationCollector> {
        self.inner.as_deref().map(|c| &c.invocations)
    }

    pub fn issues(&self) -> Option<&IssueCollector> {
        self.inner.as_deref().map(|c| &c.issues)
    }

    pub fn record_invocation(&self, event: InvocationEvent) {
        if let Some(invocations) = self.invocations() {
            invocations.record(event);
        }
    }

    pub fn report_issue(&self, params: ReportIssueParams) -> Result<IssueReport> {
        match self.issues() {
            Some(issues) => issues.report(params),
            None => Err(ToolmarkError::Config(
                "issue reporting is disabled (ledger turned off)".into(),
            )),
        }
    }

    /// `None` when disabled or before both ledgers are initialized
    pub fn snapshot(&self) -> Option<TelemetrySnapshot> {
        let collectors = self.inner.as_deref()?;
        Some(TelemetrySnapshot {
            metrics: collectors.invocations.snapshot()?,
            issues: collectors.issues.snapshot()?,
        })
    }

    /// Time `call`, record its outcome for `tool_name`, and pass its result through
    pub async fn instrument<F, T, E>(&self, tool_name: &str, arguments: Map<String, Value>, call: F) -> std::result::Result<T, E>
    where
        F: Future<Output = std::result::Result<T, E>>,
        T: Serialize,
        E: Display,
    {
        if !self.is_enabled() {
            return call.await;
        }

        let started = Instant::now();
        let outcome = call.await;
        let duration_ms = started.elapsed().as_millis() as u64;

        let event = match &outcome {
            Ok(value) => {
                let event = InvocationEvent::success(tool_name, duration_ms).with_arguments(arguments);
                match serde_json::to_value(value) {
                    Ok(result) => event.with_result(result),
                    Err(_) => event,
                }
            }
            Err(e) => InvocationEvent::failure(tool_name, duration_ms, e.to_string()).with_arguments(arguments),
        };
        self.record_invocation(event);
        outcome
    }

    /// Write out anything pending and stop both flush workers
    pub async fn shutdown(&self) {
        if let Some(collectors) = self.inner.as_deref() {
            collectors.invocations.shutdown().await;
            collectors.issues.shutdown().await;
        }
    }
}
