// crates/toolmark-server/src/cli/inspect.rs
// Read-only inspection commands: stats, issues, config

use anyhow::{Result, bail};
use toolmark::config::{EnvConfig, LedgerSettings, ToolmarkConfig};
use toolmark::styles::StyleStore;
use toolmark::tools::requests::{ListIssuesRequest, MetricsRequest};
use toolmark::{Telemetry, ToolmarkServer};
use toolmark_types::{IssueCategory, IssueSeverity};

/// Server context over read-only ledgers: no files are created or rewritten,
/// so this is safe to run next to a live `serve`
async fn inspection_context() -> ToolmarkServer {
    let env_config = EnvConfig::load();
    let settings = LedgerSettings::resolve(&env_config, &ToolmarkConfig::load());
    let telemetry = Telemetry::open_read_only(&settings).await;
    ToolmarkServer::new(telemetry, StyleStore::from_home(env_config.project_root))
}

/// Print per-tool statistics without recording the lookup itself
pub async fn run_stats(recent: usize) -> Result<()> {
    let server = inspection_context().await;
    let res = toolmark::tools::metrics_summary(
        &server,
        MetricsRequest {
            recent: Some(recent),
        },
    )
    .await;

    match res {
        Ok(out) => println!("{}", out),
        Err(e) => bail!(e),
    }
    Ok(())
}

pub async fn run_issues(
    limit: usize,
    severity: Option<String>,
    category: Option<String>,
) -> Result<()> {
    let severity = match severity.as_deref() {
        Some(s) => match IssueSeverity::parse(s) {
            Some(sev) => Some(sev),
            None => bail!("Unknown severity '{}' (low, medium, high, critical)", s),
        },
        None => None,
    };
    let category = match category.as_deref() {
        Some(c) => match IssueCategory::parse(c) {
            Some(cat) => Some(cat),
            None => bail!("Unknown category '{}'", c),
        },
        None => None,
    };

    let server = inspection_context().await;
    let res = toolmark::tools::list_issues(
        &server,
        ListIssuesRequest {
            limit: Some(limit),
            severity,
            category,
        },
    )
    .await;

    match res {
        Ok(out) => println!("{}", out),
        Err(e) => bail!(e),
    }
    Ok(())
}

/// Show the effective ledger settings and where each came from
pub fn run_config(check: bool) -> Result<()> {
    let env_config = EnvConfig::load();
    let file_config = ToolmarkConfig::load();
    let settings = LedgerSettings::resolve(&env_config, &file_config);

    println!("Config file:    {}", ToolmarkConfig::config_path().display());
    println!("Ledger enabled: {}", settings.enabled);
    println!("Server name:    {}", settings.server_name);
    println!("Metrics file:   {}", settings.metrics_path().display());
    println!("Issues file:    {}", settings.issues_path().display());
    println!("Max file size:  {} bytes", settings.max_file_size);
    if let Some(root) = &env_config.project_root {
        println!("Project root:   {}", root.display());
    }

    let validation = env_config.validate();
    println!();
    println!("{}", validation.report());

    if check && !validation.is_valid() {
        bail!("configuration has {} error(s)", validation.errors.len());
    }
    Ok(())
}
