// crates/toolmark-server/src/cli/styles.rs
// Style preference commands

use super::StyleAction;
use anyhow::{Result, anyhow, bail};
use std::path::PathBuf;
use toolmark::styles::StyleStore;
use toolmark::{Telemetry, ToolmarkServer};
use toolmark::tools::requests::{
    DeleteStyleRequest, GetFolderStyleRequest, RemoveFolderStyleRequest, SaveStyleRequest,
    SetFolderStyleRequest,
};
use toolmark_types::StyleScope;

fn parse_scope(s: &str) -> Result<StyleScope> {
    StyleScope::parse(s).ok_or_else(|| anyhow!("Unknown scope '{}' (global, project)", s))
}

pub async fn run_styles(project_root: Option<PathBuf>, action: StyleAction) -> Result<()> {
    // Style edits are not tool calls, so the ledgers stay closed
    let server = ToolmarkServer::new(Telemetry::disabled(), StyleStore::from_home(project_root));

    let res = match action {
        StyleAction::List => toolmark::tools::list_styles(&server).await,
        StyleAction::Resolve { folder } => {
            toolmark::tools::get_folder_style(&server, GetFolderStyleRequest { folder }).await
        }
        StyleAction::Save { name, tags, scope } => {
            let scope = parse_scope(&scope)?;
            toolmark::tools::save_style(&server, SaveStyleRequest { name, tags, scope }).await
        }
        StyleAction::Delete { name, scope } => {
            let scope = parse_scope(&scope)?;
            toolmark::tools::delete_style(&server, DeleteStyleRequest { name, scope }).await
        }
        StyleAction::SetFolder {
            folder,
            style,
            scope,
        } => {
            let scope = parse_scope(&scope)?;
            toolmark::tools::set_folder_style(
                &server,
                SetFolderStyleRequest {
                    folder,
                    style,
                    scope,
                },
            )
            .await
        }
        StyleAction::RemoveFolder { folder, scope } => {
            let scope = parse_scope(&scope)?;
            toolmark::tools::remove_folder_style(&server, RemoveFolderStyleRequest { folder, scope })
                .await
        }
    };

    match res {
        Ok(out) => println!("{}", out),
        Err(e) => bail!(e),
    }
    Ok(())
}
