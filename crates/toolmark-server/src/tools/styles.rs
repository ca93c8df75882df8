// crates/toolmark-server/src/tools/styles.rs
// Style preference tools; validation lives here, the store itself is a plain store

use super::ToolContext;
use super::requests::{
    DeleteStyleRequest, GetFolderStyleRequest, RemoveFolderStyleRequest, SaveStyleRequest,
    SetFolderStyleRequest,
};
use crate::utils::ResultExt;

pub async fn save_style<C: ToolContext>(ctx: &C, req: SaveStyleRequest) -> Result<String, String> {
    let tags: Vec<String> = req
        .tags
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    ctx.styles()
        .save_style(&req.name, tags.clone(), req.scope)
        .await
        .str_err()?;

    Ok(format!(
        "Saved {} style '{}': {}",
        req.scope,
        req.name.trim(),
        tags.join(", ")
    ))
}

pub async fn delete_style<C: ToolContext>(ctx: &C, req: DeleteStyleRequest) -> Result<String, String> {
    let deleted = ctx
        .styles()
        .delete_style(&req.name, req.scope)
        .await
        .str_err()?;

    if deleted {
        Ok(format!("Deleted {} style '{}'", req.scope, req.name))
    } else {
        Ok(format!("No {} style named '{}'", req.scope, req.name))
    }
}

/// Associate a folder with a style that must already exist in either scope
pub async fn set_folder_style<C: ToolContext>(ctx: &C, req: SetFolderStyleRequest) -> Result<String, String> {
    let merged = ctx.styles().merge().await;
    if !merged.styles.contains_key(&req.style) {
        return Err(format!(
            "Style '{}' not found. Save it first with save_style.",
            req.style
        ));
    }

    ctx.styles()
        .set_folder_style(&req.folder, &req.style, req.scope)
        .await
        .str_err()?;

    Ok(format!(
        "Folder '{}' now uses style '{}' ({})",
        crate::styles::normalize_folder(req.folder.trim()),
        req.style,
        req.scope
    ))
}

pub async fn remove_folder_style<C: ToolContext>(
    ctx: &C,
    req: RemoveFolderStyleRequest,
) -> Result<String, String> {
    let removed = ctx
        .styles()
        .remove_folder_style(&req.folder, req.scope)
        .await
        .str_err()?;

    if removed {
        Ok(format!("Removed {} style association for '{}'", req.scope, req.folder))
    } else {
        Ok(format!("No {} style association for '{}'", req.scope, req.folder))
    }
}

pub async fn get_folder_style<C: ToolContext>(ctx: &C, req: GetFolderStyleRequest) -> Result<String, String> {
    match ctx.styles().resolve_folder(&req.folder).await {
        Some(hit) if hit.inherited => Ok(format!(
            "Style '{}' ({}) inherited from '{}'",
            hit.style_name,
            hit.tags.join(", "),
            hit.matched_path
        )),
        Some(hit) => Ok(format!(
            "Style '{}' ({})",
            hit.style_name,
            hit.tags.join(", ")
        )),
        None => Ok(format!("No style configured for '{}'", req.folder)),
    }
}

pub async fn list_styles<C: ToolContext>(ctx: &C) -> Result<String, String> {
    let merged = ctx.styles().merge().await;
    if merged.styles.is_empty() && merged.folders.is_empty() {
        return Ok("No styles configured.".to_string());
    }

    let mut output = String::from("Styles:\n");
    for (name, tags) in &merged.styles {
        let source = merged
            .sources
            .styles
            .get(name)
            .map(|s| s.as_str())
            .unwrap_or("?");
        output.push_str(&format!("- {} [{}]: {}\n", name, source, tags.join(", ")));
    }

    if !merged.folders.is_empty() {
        output.push_str("\nFolders:\n");
        for (folder, style) in &merged.folders {
            let source = merged
                .sources
                .folders
                .get(folder)
                .map(|s| s.as_str())
                .unwrap_or("?");
            let dangling = if merged.styles.contains_key(style) {
                ""
            } else {
                " (missing style)"
            };
            output.push_str(&format!("- {} -> {} [{}]{}\n", folder, style, source, dangling));
        }
    }

    Ok(output)
}
