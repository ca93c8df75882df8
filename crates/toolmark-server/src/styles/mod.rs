// crates/toolmark-server/src/styles/mod.rs
// Layered style preferences: ~/.toolmark/styles.json overlaid by <project>/.toolmark/styles.json
//
// Every operation reads the file(s) fresh, so external edits show up on the
// next call. Mutations are read-modify-write with no queue; concurrent writers
// to the same scope race and the last write wins.

pub mod resolve;

pub use resolve::normalize_folder;

use crate::error::{Result, ToolmarkError};
use crate::persist;
use std::path::{Path, PathBuf};
use toolmark_types::{FolderStyleMatch, MergedStyleConfig, StyleConfig, StyleScope};
use tracing::{debug, warn};

/// Directory holding the project-scope style file, relative to the project root
pub const PROJECT_STYLE_DIR: &str = ".toolmark";
pub const STYLE_FILE_NAME: &str = "styles.json";

pub struct StyleStore {
    global_path: PathBuf,
    project_root: PathBuf,
}

impl StyleStore {
    pub fn new(global_path: impl Into<PathBuf>, project_root: impl Into<PathBuf>) -> Self {
        Self {
            global_path: global_path.into(),
            project_root: project_root.into(),
        }
    }

    /// Global file under ~/.toolmark, project root from `project_root` or the working directory
    pub fn from_home(project_root: Option<PathBuf>) -> Self {
        let project_root = project_root
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(crate::config::toolmark_home().join(STYLE_FILE_NAME), project_root)
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn set_project_root(&mut self, root: impl Into<PathBuf>) {
        self.project_root = root.into();
        debug!(root = %self.project_root.display(), "Project root set");
    }

    pub fn scope_path(&self, scope: StyleScope) -> PathBuf {
        match scope {
            StyleScope::Global => self.global_path.clone(),
            StyleScope::Project => self
                .project_root
                .join(PROJECT_STYLE_DIR)
                .join(STYLE_FILE_NAME),
        }
    }

    /// Read one scope; missing or malformed files read as empty
    pub async fn read_scope(&self, scope: StyleScope) -> StyleConfig {
        let path = self.scope_path(scope);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Ignoring malformed style file");
                    StyleConfig::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StyleConfig::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read style file");
                StyleConfig::default()
            }
        }
    }

    pub async fn write_scope(&self, scope: StyleScope, config: &StyleConfig) -> Result<()> {
        let path = self.scope_path(scope);
        let json = serde_json::to_string_pretty(config)?;
        persist::write_contents(&path, json.as_bytes()).await?;
        debug!(scope = %scope, path = %path.display(), "Style file written");
        Ok(())
    }

    /// Global overlaid by project; recomputed on every call
    pub async fn merge(&self) -> MergedStyleConfig {
        let global = self.read_scope(StyleScope::Global).await;
        let project = self.read_scope(StyleScope::Project).await;
        resolve::merge(&global, &project)
    }

    /// Create or replace a style. Tags are stored as given.
    pub async fn save_style(&self, name: &str, tags: Vec<String>, scope: StyleScope) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ToolmarkError::InvalidInput("style name must not be empty".into()));
        }
        if tags.is_empty() {
            return Err(ToolmarkError::InvalidInput(format!(
                "style '{}' needs at least one tag",
                name
            )));
        }

        let mut config = self.read_scope(scope).await;
        config.styles.insert(name.to_string(), tags);
        self.write_scope(scope, &config).await
    }

    /// Remove a style and every folder in the same scope that points at it.
    ///
    /// Returns whether the style existed. Folders in the other scope are left alone.
    pub async fn delete_style(&self, name: &str, scope: StyleScope) -> Result<bool> {
        let name = name.trim();
        let mut config = self.read_scope(scope).await;
        if config.styles.remove(name).is_none() {
            return Ok(false);
        }

        let before = config.folders.len();
        config.folders.retain(|_, style| style != name);
        let cascaded = before - config.folders.len();
        if cascaded > 0 {
            debug!(style = name, scope = %scope, cascaded, "Removed folder associations with deleted style");
        }

        self.write_scope(scope, &config).await?;
        Ok(true)
    }

    /// Associate a folder with a style. The style is not checked for existence here.
    pub async fn set_folder_style(&self, folder: &str, style_name: &str, scope: StyleScope) -> Result<()> {
        let key = normalize_folder(folder.trim());
        if key.is_empty() {
            return Err(ToolmarkError::InvalidInput("folder must not be empty".into()));
        }

        let mut config = self.read_scope(scope).await;
        config.folders.insert(key, style_name.trim().to_string());
        self.write_scope(scope, &config).await
    }

    /// Returns whether an association was removed
    pub async fn remove_folder_style(&self, folder: &str, scope: StyleScope) -> Result<bool> {
        let key = normalize_folder(folder.trim());
        let mut config = self.read_scope(scope).await;
        if config.folders.remove(&key).is_none() {
            return Ok(false);
        }
        self.write_scope(scope, &config).await?;
        Ok(true)
    }

    /// Effective style for `folder`, inherited from the nearest ancestor if needed
    pub async fn resolve_folder(&self, folder: &str) -> Option<FolderStyleMatch> {
        let merged = self.merge().await;
        resolve::resolve(&merged, folder.trim())
    }
}
