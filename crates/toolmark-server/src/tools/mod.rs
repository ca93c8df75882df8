//! Tool implementations exposed to MCP clients.
//!
//! All tools are async functions that accept `&impl ToolContext` and return
//! `Result<String, String>`. `call_tool` is the single dispatch point and
//! records every call in the invocation ledger.

pub mod issues;
pub mod metrics;
pub mod requests;
pub mod styles;

pub use issues::{list_issues, report_issue};
pub use metrics::metrics_summary;
pub use styles::{delete_style, get_folder_style, list_styles, remove_folder_style, save_style, set_folder_style};

use crate::styles::StyleStore;
use crate::telemetry::Telemetry;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Information about an MCP tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpToolInfo {
    pub name: String,
    pub description: String,
}

/// Common context required by all tools
pub trait ToolContext: Send + Sync {
    fn telemetry(&self) -> &Telemetry;
    fn styles(&self) -> &StyleStore;
}

const TOOLS: &[(&str, &str)] = &[
    ("report_issue", "Report a bug, feature request or other issue with this server"),
    ("list_issues", "List recently reported issues, optionally filtered by severity or category"),
    ("metrics_summary", "Show per-tool call counts, error rates and average latency"),
    ("save_style", "Create or replace a named style (an ordered list of tags) in global or project scope"),
    ("delete_style", "Delete a style and the folder associations in the same scope that use it"),
    ("set_folder_style", "Associate a folder with an existing style"),
    ("remove_folder_style", "Remove a folder's style association"),
    ("get_folder_style", "Resolve the style for a folder, inheriting from the nearest configured ancestor"),
    ("list_styles", "List merged styles and folder associations with their scope"),
];

pub fn list_tools() -> Vec<McpToolInfo> {
    TOOLS
        .iter()
        .map(|(name, description)| McpToolInfo {
            name: name.to_string(),
            description: description.to_string(),
        })
        .collect()
}

/// Run a tool by name with JSON arguments, recording the call
pub async fn call_tool<C: ToolContext>(ctx: &C, name: &str, args: Value) -> Result<String, String> {
    let arguments = match &args {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    ctx.telemetry()
        .instrument(name, arguments, dispatch(ctx, name, args))
        .await
}

async fn dispatch<C: ToolContext>(ctx: &C, name: &str, args: Value) -> Result<String, String> {
    match name {
        "report_issue" => report_issue(ctx, parse(args)?).await,
        "list_issues" => list_issues(ctx, parse_or_default(args)?).await,
        "metrics_summary" => metrics_summary(ctx, parse_or_default(args)?).await,
        "save_style" => save_style(ctx, parse(args)?).await,
        "delete_style" => delete_style(ctx, parse(args)?).await,
        "set_folder_style" => set_folder_style(ctx, parse(args)?).await,
        "remove_folder_style" => remove_folder_style(ctx, parse(args)?).await,
        "get_folder_style" => get_folder_style(ctx, parse(args)?).await,
        "list_styles" => list_styles(ctx).await,
        _ => Err(format!("Unknown tool: {}", name)),
    }
}

fn parse<T: DeserializeOwned>(args: Value) -> Result<T, String> {
    serde_json::from_value(args).map_err(|e| format!("Invalid arguments: {}", e))
}

fn parse_or_default<T: DeserializeOwned + Default>(args: Value) -> Result<T, String> {
    if args.is_null() {
        return Ok(T::default());
    }
    parse(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerSettings;
    use serde_json::json;

    struct TestContext {
        telemetry: Telemetry,
        styles: StyleStore,
        _dir: tempfile::TempDir,
    }

    impl TestContext {
        async fn new() -> Self {
            let dir = tempfile::TempDir::new().unwrap();
            let telemetry = Telemetry::start(&LedgerSettings::in_dir(dir.path().join("metrics"), "srv")).await;
            let styles = StyleStore::new(dir.path().join("home/styles.json"), dir.path().join("repo"));
            Self {
                telemetry,
                styles,
                _dir: dir,
            }
        }
    }

    impl ToolContext for TestContext {
        fn telemetry(&self) -> &Telemetry {
            &self.telemetry
        }
        fn styles(&self) -> &StyleStore {
            &self.styles
        }
    }

    #[tokio::test]
    async fn test_report_issue_returns_id() {
        let ctx = TestContext::new().await;
        let out = call_tool(
            &ctx,
            "report_issue",
            json!({"title": "Crash", "description": "on start", "severity": "high", "category": "bug"}),
        )
        .await
        .unwrap();
        assert!(out.starts_with("Issue reported (id: "));

        let listed = call_tool(&ctx, "list_issues", Value::Null).await.unwrap();
        assert!(listed.contains("Crash"));
    }

    #[tokio::test]
    async fn test_report_issue_blank_title_labeled() {
        let ctx = TestContext::new().await;
        let err = call_tool(
            &ctx,
            "report_issue",
            json!({"title": " ", "description": "d", "severity": "low", "category": "other"}),
        )
        .await
        .unwrap_err();
        assert!(err.starts_with("Failed to report issue"));
    }

    #[tokio::test]
    async fn test_report_issue_disabled_ledger_labeled() {
        let dir = tempfile::TempDir::new().unwrap();
        let ctx = TestContext {
            telemetry: Telemetry::disabled(),
            styles: StyleStore::new(dir.path().join("g.json"), dir.path()),
            _dir: dir,
        };
        let err = report_issue(
            &ctx,
            serde_json::from_value(json!({"title": "t", "description": "d", "severity": "low", "category": "bug"}))
                .unwrap(),
        )
        .await
        .unwrap_err();
        assert!(err.starts_with("Failed to report issue:"));
    }

    #[tokio::test]
    async fn test_every_call_recorded() {
        let ctx = TestContext::new().await;
        call_tool(&ctx, "list_styles", Value::Null).await.unwrap();
        let _ = call_tool(&ctx, "no_such_tool", json!({})).await;

        let invocations = ctx.telemetry.invocations().unwrap();
        assert_eq!(invocations.total_invocations(), 2);
        assert_eq!(invocations.tool_stats("no_such_tool").unwrap().error_count, 1);

        let summary = call_tool(&ctx, "metrics_summary", json!({"recent": 5})).await.unwrap();
        assert!(summary.contains("list_styles"));
        assert!(summary.contains("Recent calls"));
    }

    #[tokio::test]
    async fn test_set_folder_style_requires_existing_style() {
        let ctx = TestContext::new().await;
        let err = call_tool(&ctx, "set_folder_style", json!({"folder": "/a", "style": "ghost"}))
            .await
            .unwrap_err();
        assert!(err.contains("not found"));

        call_tool(&ctx, "save_style", json!({"name": "solid", "tags": ["filled", " "]}))
            .await
            .unwrap();
        call_tool(&ctx, "set_folder_style", json!({"folder": "/a/", "style": "solid", "scope": "project"}))
            .await
            .unwrap();

        let out = call_tool(&ctx, "get_folder_style", json!({"folder": "/a/b"})).await.unwrap();
        assert!(out.contains("inherited from '/a'"));
        assert!(out.contains("filled"));
    }

    #[tokio::test]
    async fn test_save_style_with_only_blank_tags_fails() {
        let ctx = TestContext::new().await;
        let err = call_tool(&ctx, "save_style", json!({"name": "x", "tags": ["", "  "]}))
            .await
            .unwrap_err();
        assert!(err.contains("at least one tag"));
    }

    #[tokio::test]
    async fn test_list_styles_marks_dangling() {
        let ctx = TestContext::new().await;
        ctx.styles
            .set_folder_style("/x", "gone", toolmark_types::StyleScope::Global)
            .await
            .unwrap();
        let out = call_tool(&ctx, "list_styles", Value::Null).await.unwrap();
        assert!(out.contains("(missing style)"));
    }

    #[test]
    fn test_list_tools() {
        let tools = list_tools();
        assert_eq!(tools.len(), TOOLS.len());
        assert!(tools.iter().any(|t| t.name == "get_folder_style"));
    }
}
