// crates/toolmark-server/src/cli/tool.rs
// Direct tool execution from CLI

use super::serve::setup_server_context;
use anyhow::Result;
use std::path::PathBuf;

/// Execute a tool directly from the command line
pub async fn run_tool(project_root: Option<PathBuf>, name: String, args: String) -> Result<()> {
    let server = setup_server_context(project_root).await?;

    let args: serde_json::Value = serde_json::from_str(&args)?;
    let res = toolmark::tools::call_tool(&server, &name, args).await;

    // Make sure the recorded call reaches disk before exiting
    server.shutdown().await;

    match res {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
    Ok(())
}
