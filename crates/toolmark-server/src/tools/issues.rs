// crates/toolmark-server/src/tools/issues.rs
// Issue reporting and listing tools

use super::ToolContext;
use super::requests::{ListIssuesRequest, ReportIssueRequest};
use toolmark_types::{IssueReport, ReportIssueParams};

const DEFAULT_ISSUE_LIMIT: usize = 10;

/// File an issue. Any failure comes back as a labeled message, never a silent drop.
pub async fn report_issue<C: ToolContext>(ctx: &C, req: ReportIssueRequest) -> Result<String, String> {
    if req.title.trim().is_empty() {
        return Err("Failed to report issue: title must not be empty".to_string());
    }
    if req.description.trim().is_empty() {
        return Err("Failed to report issue: description must not be empty".to_string());
    }

    let params = ReportIssueParams {
        title: req.title.trim().to_string(),
        description: req.description,
        severity: req.severity,
        category: req.category,
        reproduction_steps: req.reproduction_steps,
        expected_behavior: req.expected_behavior,
        actual_behavior: req.actual_behavior,
        environment: req.environment,
    };

    match ctx.telemetry().report_issue(params) {
        Ok(report) => Ok(format!(
            "Issue reported (id: {})\n{} [{} / {}]",
            report.id, report.title, report.severity, report.category
        )),
        Err(e) => {
            tracing::error!(error = %e, "Issue report failed");
            Err(format!("Failed to report issue: {}", e.to_user_string()))
        }
    }
}

pub async fn list_issues<C: ToolContext>(ctx: &C, req: ListIssuesRequest) -> Result<String, String> {
    let Some(issues) = ctx.telemetry().issues() else {
        return Ok("Issue reporting is disabled.".to_string());
    };

    let limit = req.limit.unwrap_or(DEFAULT_ISSUE_LIMIT).max(1);
    let reports = issues.filtered(req.severity, req.category, limit);
    if reports.is_empty() {
        return Ok("No issues reported.".to_string());
    }

    let mut output = format!(
        "{} issue(s) shown, {} reported in total\n\n",
        reports.len(),
        issues.total_issues()
    );
    for report in &reports {
        output.push_str(&format_issue(report));
        output.push('\n');
    }
    Ok(output)
}

fn format_issue(report: &IssueReport) -> String {
    let mut line = format!(
        "- [{}] {} ({}, {}) {}\n  {}",
        report.id, report.title, report.severity, report.category, report.created_at, report.description
    );
    if let Some(ref steps) = report.reproduction_steps {
        line.push_str(&format!("\n  Steps: {}", steps));
    }
    if let Some(ref expected) = report.expected_behavior {
        line.push_str(&format!("\n  Expected: {}", expected));
    }
    if let Some(ref actual) = report.actual_behavior {
        line.push_str(&format!("\n  Actual: {}", actual));
    }
    if let Some(ref env) = report.environment {
        line.push_str(&format!("\n  Environment: {}", env));
    }
    line
}
