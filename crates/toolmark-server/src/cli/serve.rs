// crates/toolmark-server/src/cli/serve.rs
// Server initialization and the stdio request loop

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use toolmark::config::{EnvConfig, ToolmarkConfig};
use toolmark::tools::{call_tool, list_tools};
use toolmark::ToolmarkServer;
use tracing::{info, warn};

/// One request line: `{"tool": "...", "arguments": {...}}`
#[derive(Debug, Deserialize)]
struct LineRequest {
    tool: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Serialize)]
struct LineResponse {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl LineResponse {
    fn from_result(result: Result<String, String>) -> Self {
        match result {
            Ok(output) => Self {
                ok: true,
                output: Some(output),
                error: None,
            },
            Err(error) => Self {
                ok: false,
                output: None,
                error: Some(error),
            },
        }
    }
}

/// Load configuration once and build the server context
pub async fn setup_server_context(project_root: Option<PathBuf>) -> Result<ToolmarkServer> {
    let env_config = EnvConfig::load();

    let validation = env_config.validate();
    for warning in &validation.warnings {
        warn!("{}", warning);
    }
    for error in &validation.errors {
        warn!("{} (using default)", error);
    }

    let file_config = ToolmarkConfig::load();
    let project_root = project_root.or_else(|| std::env::current_dir().ok());
    Ok(ToolmarkServer::from_config(&env_config, &file_config, project_root).await)
}

async fn handle_line(server: &ToolmarkServer, line: &str) -> LineResponse {
    let request: LineRequest = match serde_json::from_str(line) {
        Ok(req) => req,
        Err(e) => return LineResponse::from_result(Err(format!("Invalid request: {}", e))),
    };

    if request.tool == "list_tools" {
        let names: Vec<String> = list_tools()
            .into_iter()
            .map(|t| format!("{}: {}", t.name, t.description))
            .collect();
        return LineResponse::from_result(Ok(names.join("\n")));
    }

    LineResponse::from_result(call_tool(server, &request.tool, request.arguments).await)
}

/// Serve tool calls as JSON lines until stdin closes or Ctrl-C
pub async fn run_serve(project_root: Option<PathBuf>) -> Result<()> {
    let server = setup_server_context(project_root).await?;
    info!(
        ledger = server.telemetry.is_enabled(),
        project_root = %server.styles.project_root().display(),
        "toolmark serving on stdio"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                let response = handle_line(&server, &line).await;
                let mut out = serde_json::to_string(&response)?;
                out.push('\n');
                stdout.write_all(out.as_bytes()).await?;
                stdout.flush().await?;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                break;
            }
        }
    }

    server.shutdown().await;
    Ok(())
}
