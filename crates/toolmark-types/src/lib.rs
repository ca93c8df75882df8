// crates/toolmark-types/src/lib.rs
// Shared types for toolmark ledgers and style configs
// Serializable data model only, no I/O

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

// ═══════════════════════════════════════
// INVOCATION LEDGER
// ═══════════════════════════════════════

/// One recorded tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationRecord {
    pub tool_name: String,
    /// RFC 3339 timestamp of when the call finished
    pub timestamp: String,
    pub duration_ms: u64,
    #[serde(default)]
    pub reasoning: String,
    /// Tool arguments with the `reasoning` key removed
    #[serde(default)]
    pub arguments: Map<String, Value>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

/// Lifetime statistics for a single tool name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolStats {
    pub call_count: u64,
    pub total_duration_ms: u64,
    pub avg_duration_ms: u64,
    pub success_count: u64,
    pub error_count: u64,
    pub last_used: String,
}

/// On-disk invocation ledger (`<server>.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsDocument {
    pub server_name: String,
    pub created_at: String,
    pub updated_at: String,
    /// All-time count; survives trimming of `invocations`
    pub total_invocations: u64,
    #[serde(default)]
    pub tool_stats: BTreeMap<String, ToolStats>,
    /// Oldest first
    #[serde(default)]
    pub invocations: Vec<InvocationRecord>,
}

// ═══════════════════════════════════════
// ISSUE LEDGER
// ═══════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl IssueSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueSeverity::Low => "low",
            IssueSeverity::Medium => "medium",
            IssueSeverity::High => "high",
            IssueSeverity::Critical => "critical",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(IssueSeverity::Low),
            "medium" => Some(IssueSeverity::Medium),
            "high" => Some(IssueSeverity::High),
            "critical" => Some(IssueSeverity::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    Bug,
    FeatureRequest,
    Documentation,
    Performance,
    Security,
    Other,
}

impl IssueCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCategory::Bug => "bug",
            IssueCategory::FeatureRequest => "feature_request",
            IssueCategory::Documentation => "documentation",
            IssueCategory::Performance => "performance",
            IssueCategory::Security => "security",
            IssueCategory::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "bug" => Some(IssueCategory::Bug),
            "feature_request" | "feature-request" => Some(IssueCategory::FeatureRequest),
            "documentation" | "docs" => Some(IssueCategory::Documentation),
            "performance" => Some(IssueCategory::Performance),
            "security" => Some(IssueCategory::Security),
            "other" => Some(IssueCategory::Other),
            _ => None,
        }
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied fields for a new issue report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportIssueParams {
    pub title: String,
    pub description: String,
    pub severity: IssueSeverity,
    pub category: IssueCategory,
    #[serde(default)]
    pub reproduction_steps: Option<String>,
    #[serde(default)]
    pub expected_behavior: Option<String>,
    #[serde(default)]
    pub actual_behavior: Option<String>,
    #[serde(default)]
    pub environment: Option<String>,
}

/// A stored issue report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueReport {
    pub id: String,
    pub title: String,
    pub description: String,
    pub severity: IssueSeverity,
    pub category: IssueCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reproduction_steps: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_behavior: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_behavior: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    pub created_at: String,
}

/// On-disk issue ledger (`<server>.issues.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueDocument {
    pub server_name: String,
    pub created_at: String,
    pub updated_at: String,
    pub total_issues: u64,
    /// Newest first
    #[serde(default)]
    pub issues: Vec<IssueReport>,
}

// ═══════════════════════════════════════
// STYLE CONFIG
// ═══════════════════════════════════════

/// Which style file a value lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleScope {
    Global,
    Project,
}

impl StyleScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            StyleScope::Global => "global",
            StyleScope::Project => "project",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "global" => Some(StyleScope::Global),
            "project" => Some(StyleScope::Project),
            _ => None,
        }
    }
}

impl fmt::Display for StyleScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contents of one style file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleConfig {
    /// Style name -> ordered tags
    #[serde(default)]
    pub styles: BTreeMap<String, Vec<String>>,
    /// Normalized folder path -> style name
    #[serde(default)]
    pub folders: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleSources {
    pub styles: BTreeMap<String, StyleScope>,
    pub folders: BTreeMap<String, StyleScope>,
}

/// Global overlaid by project, with per-key provenance. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedStyleConfig {
    pub styles: BTreeMap<String, Vec<String>>,
    pub folders: BTreeMap<String, String>,
    pub sources: StyleSources,
}

/// Result of resolving a folder to its effective style
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderStyleMatch {
    pub style_name: String,
    pub tags: Vec<String>,
    /// The folder that carried the association; differs from the query when inherited
    pub matched_path: String,
    pub inherited: bool,
}
