// crates/toolmark-server/src/ledger/invocations.rs
// Tool-invocation ledger with size-bounded history and lifetime per-tool stats

use super::Ledger;
use super::aggregate;
use crate::config::LedgerSettings;
use crate::persist::{LedgerDocument, LoadOutcome};
use crate::utils::now_iso;
use serde_json::{Map, Value};
use toolmark_types::{InvocationRecord, MetricsDocument, ToolStats};

/// Argument key that carries the caller's reasoning rather than tool input
pub const REASONING_KEY: &str = "reasoning";

impl LedgerDocument for MetricsDocument {
    const KIND: &'static str = "metrics";
    const RECORDS_FIELD: &'static str = "invocations";

    fn empty(server_name: &str) -> Self {
        let now = now_iso();
        Self {
            server_name: server_name.to_string(),
            created_at: now.clone(),
            updated_at: now,
            total_invocations: 0,
            tool_stats: Default::default(),
            invocations: Vec::new(),
        }
    }

    fn serialize_for_write(&mut self, max_bytes: Option<u64>) -> serde_json::Result<String> {
        match max_bytes {
            Some(max) => trim_to_size(self, max),
            None => serde_json::to_string_pretty(self),
        }
    }

    fn record_count(&self) -> usize {
        self.invocations.len()
    }

    fn discard_oldest(&mut self, count: usize) {
        let count = count.min(self.invocations.len());
        self.invocations.drain(..count);
    }
}

/// Shrink `doc.invocations` until the pretty-printed document fits in `max_bytes`.
///
/// Each round drops the oldest quarter (at least one entry) and re-measures.
/// `tool_stats` and `total_invocations` are never touched. Returns the JSON of
/// the final document, which may still exceed the cap once the list is empty.
pub fn trim_to_size(doc: &mut MetricsDocument, max_bytes: u64) -> serde_json::Result<String> {
    let mut json = serde_json::to_string_pretty(doc)?;
    let before = doc.invocations.len();

    while json.len() as u64 > max_bytes && !doc.invocations.is_empty() {
        let drop_count = (doc.invocations.len() / 4).max(1);
        doc.invocations.drain(..drop_count);
        json = serde_json::to_string_pretty(doc)?;
    }

    let dropped = before - doc.invocations.len();
    if dropped > 0 {
        tracing::info!(
            dropped,
            remaining = doc.invocations.len(),
            bytes = json.len(),
            max_bytes,
            "Trimmed invocation history to fit size cap"
        );
    }
    Ok(json)
}

/// What a caller reports about one finished tool call
#[derive(Debug, Clone, Default)]
pub struct InvocationEvent {
    pub tool_name: String,
    pub duration_ms: u64,
    /// Raw tool arguments; a string `reasoning` entry is lifted out
    pub arguments: Map<String, Value>,
    pub success: bool,
    pub error: Option<String>,
    pub result: Option<Value>,
}

impl InvocationEvent {
    pub fn success(tool_name: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            tool_name: tool_name.into(),
            duration_ms,
            success: true,
            ..Default::default()
        }
    }

    pub fn failure(tool_name: impl Into<String>, duration_ms: u64, error: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            duration_ms,
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn with_arguments(mut self, arguments: Map<String, Value>) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn with_result(mut self, result: Value) -> Self {
        self.result = Some(result);
        self
    }

    fn into_record(self, timestamp: String) -> InvocationRecord {
        let mut arguments = self.arguments;
        let reasoning = match arguments.remove(REASONING_KEY) {
            Some(Value::String(text)) => text,
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        InvocationRecord {
            tool_name: self.tool_name,
            timestamp,
            duration_ms: self.duration_ms,
            reasoning,
            arguments,
            success: self.success,
            error: self.error,
            result: self.result,
        }
    }
}

/// Records every tool call; telemetry is best-effort and never fails the caller
pub struct InvocationCollector {
    ledger: Ledger<MetricsDocument>,
}

impl InvocationCollector {
    pub fn new(settings: &LedgerSettings) -> Self {
        Self {
            ledger: Ledger::new(
                settings.metrics_path(),
                settings.server_name.clone(),
                Some(settings.max_file_size),
            ),
        }
    }

    pub async fn initialize(&self) -> LoadOutcome {
        self.ledger.initialize().await
    }

    /// Load for inspection without writing or starting a flush worker
    pub async fn open_read_only(&self) -> LoadOutcome {
        self.ledger.open_read_only().await
    }

    pub fn is_initialized(&self) -> bool {
        self.ledger.is_initialized()
    }

    /// Append one invocation, fold it into the tool's stats and schedule a write.
    ///
    /// Before `initialize` this logs a warning and does nothing.
    pub fn record(&self, event: InvocationEvent) {
        let timestamp = now_iso();
        let record = event.into_record(timestamp.clone());
        let tool_name = record.tool_name.clone();

        let applied = self.ledger.mutate(move |doc| {
            let stats = aggregate::apply(doc.tool_stats.get(&record.tool_name), &record);
            doc.tool_stats.insert(record.tool_name.clone(), stats);
            doc.total_invocations += 1;
            doc.updated_at = timestamp;
            doc.invocations.push(record);
        });

        if applied.is_none() {
            tracing::warn!(tool = %tool_name, "Invocation ledger not initialized, dropping record");
        }
    }

    pub fn snapshot(&self) -> Option<MetricsDocument> {
        self.ledger.snapshot()
    }

    pub fn tool_stats(&self, tool_name: &str) -> Option<ToolStats> {
        self.ledger
            .read(|doc| doc.tool_stats.get(tool_name).cloned())
            .flatten()
    }

    pub fn total_invocations(&self) -> u64 {
        self.ledger.read(|doc| doc.total_invocations).unwrap_or(0)
    }

    /// Per-tool stats, busiest first
    pub fn summary(&self) -> Vec<(String, ToolStats)> {
        let mut rows: Vec<(String, ToolStats)> = self
            .ledger
            .read(|doc| {
                doc.tool_stats
                    .iter()
                    .map(|(name, stats)| (name.clone(), stats.clone()))
                    .collect()
            })
            .unwrap_or_default();
        rows.sort_by(|a, b| b.1.call_count.cmp(&a.1.call_count).then_with(|| a.0.cmp(&b.0)));
        rows
    }

    /// Most recent `limit` raw invocations, newest first
    pub fn recent(&self, limit: usize) -> Vec<InvocationRecord> {
        self.ledger
            .read(|doc| doc.invocations.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    pub async fn flush(&self) {
        self.ledger.flush().await;
    }

    pub async fn shutdown(&self) {
        self.ledger.shutdown().await;
    }

    pub fn ledger(&self) -> &Ledger<MetricsDocument> {
        &self.ledger
    }
}
