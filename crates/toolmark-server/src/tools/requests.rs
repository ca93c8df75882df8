// crates/toolmark-server/src/tools/requests.rs
// Argument shapes for each tool, as received over the wire

use serde::Deserialize;
use toolmark_types::{IssueCategory, IssueSeverity, StyleScope};

fn default_scope() -> StyleScope {
    StyleScope::Global
}

#[derive(Debug, Deserialize)]
pub struct ReportIssueRequest {
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

#[derive(Debug, Default, Deserialize)]
pub struct ListIssuesRequest {
    pub limit: Option<usize>,
    pub severity: Option<IssueSeverity>,
    pub category: Option<IssueCategory>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MetricsRequest {
    /// How many recent invocations to list under the stats table
    pub recent: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SaveStyleRequest {
    pub name: String,
    pub tags: Vec<String>,
    #[serde(default = "default_scope")]
    pub scope: StyleScope,
}

#[derive(Debug, Deserialize)]
pub struct DeleteStyleRequest {
    pub name: String,
    #[serde(default = "default_scope")]
    pub scope: StyleScope,
}

#[derive(Debug, Deserialize)]
pub struct SetFolderStyleRequest {
    pub folder: String,
    pub style: String,
    #[serde(default = "default_scope")]
    pub scope: StyleScope,
}

#[derive(Debug, Deserialize)]
pub struct RemoveFolderStyleRequest {
    pub folder: String,
    #[serde(default = "default_scope")]
    pub scope: StyleScope,
}

#[derive(Debug, Deserialize)]
pub struct GetFolderStyleRequest {
    pub folder: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scope_defaults_to_global() {
        let req: SaveStyleRequest =
            serde_json::from_value(json!({"name": "m", "tags": ["flat"]})).unwrap();
        assert_eq!(req.scope, StyleScope::Global);
    }

    #[test]
    fn test_reasoning_is_ignored() {
        let req: GetFolderStyleRequest =
            serde_json::from_value(json!({"folder": "/a", "reasoning": "why"})).unwrap();
        assert_eq!(req.folder, "/a");
    }

    #[test]
    fn test_bad_severity_rejected() {
        let res: Result<ReportIssueRequest, _> = serde_json::from_value(json!({
            "title": "t", "description": "d", "severity": "urgent", "category": "bug"
        }));
        assert!(res.is_err());
    }
}
