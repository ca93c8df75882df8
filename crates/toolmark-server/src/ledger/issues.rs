// crates/toolmark-server/src/ledger/issues.rs
// User-submitted issue reports, newest first, capped at MAX_ISSUES

use super::Ledger;
use crate::config::LedgerSettings;
use crate::error::{Result, ToolmarkError};
use crate::persist::{LedgerDocument, LoadOutcome};
use crate::utils::now_iso;
use rand::Rng;
use toolmark_types::{IssueCategory, IssueDocument, IssueReport, IssueSeverity, ReportIssueParams};

/// Reports kept on disk; older ones are discarded
pub const MAX_ISSUES: usize = 100;

const ID_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

impl LedgerDocument for IssueDocument {
    const KIND: &'static str = "issue";
    const RECORDS_FIELD: &'static str = "issues";

    fn empty(server_name: &str) -> Self {
        let now = now_iso();
        Self {
            server_name: server_name.to_string(),
            created_at: now.clone(),
            updated_at: now,
            total_issues: 0,
            issues: Vec::new(),
        }
    }
}

/// Base-36 millisecond timestamp followed by a random base-36 suffix.
///
/// Unique enough within one ledger file; not a cryptographic identifier.
pub fn generate_issue_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
    let mut id = to_base36(millis);
    let mut rng = rand::rng();
    for _ in 0..ID_SUFFIX_LEN {
        id.push(BASE36[rng.random_range(0..BASE36.len())] as char);
    }
    id
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Issue reports have a user-visible contract, so failures are returned, not swallowed
pub struct IssueCollector {
    ledger: Ledger<IssueDocument>,
}

impl IssueCollector {
    pub fn new(settings: &LedgerSettings) -> Self {
        Self {
            ledger: Ledger::new(settings.issues_path(), settings.server_name.clone(), None),
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

    /// Store a new report and schedule a write.
    ///
    /// The report is returned as soon as it is in memory so its id can be
    /// shown before the write lands.
    pub fn report(&self, params: ReportIssueParams) -> Result<IssueReport> {
        let now = now_iso();
        let report = IssueReport {
            id: generate_issue_id(),
            title: params.title,
            description: params.description,
            severity: params.severity,
            category: params.category,
            reproduction_steps: params.reproduction_steps,
            expected_behavior: params.expected_behavior,
            actual_behavior: params.actual_behavior,
            environment: params.environment,
            created_at: now.clone(),
        };

        let stored = report.clone();
        self.ledger
            .mutate(move |doc| {
                doc.issues.insert(0, stored);
                doc.issues.truncate(MAX_ISSUES);
                doc.total_issues += 1;
                doc.updated_at = now;
            })
            .ok_or(ToolmarkError::NotInitialized(IssueDocument::KIND))?;

        tracing::info!(id = %report.id, severity = %report.severity, category = %report.category, "Issue reported");
        Ok(report)
    }

    pub fn snapshot(&self) -> Option<IssueDocument> {
        self.ledger.snapshot()
    }

    pub fn total_issues(&self) -> u64 {
        self.ledger.read(|doc| doc.total_issues).unwrap_or(0)
    }

    /// Newest `limit` reports
    pub fn recent(&self, limit: usize) -> Vec<IssueReport> {
        self.filtered(None, None, limit)
    }

    /// Newest `limit` reports matching the optional severity and category
    pub fn filtered(
        &self,
        severity: Option<IssueSeverity>,
        category: Option<IssueCategory>,
        limit: usize,
    ) -> Vec<IssueReport> {
        self.ledger
            .read(|doc| {
                doc.issues
                    .iter()
                    .filter(|issue| severity.is_none_or(|s| issue.severity == s))
                    .filter(|issue| category.is_none_or(|c| issue.category == c))
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get(&self, id: &str) -> Option<IssueReport> {
        self.ledger
            .read(|doc| doc.issues.iter().find(|issue| issue.id == id).cloned())
            .flatten()
    }

    pub async fn flush(&self) {
        self.ledger.flush().await;
    }

    pub async fn shutdown(&self) {
        self.ledger.shutdown().await;
    }
}
