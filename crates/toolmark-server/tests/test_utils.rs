//! Test utilities for toolmark integration tests

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use toolmark::config::LedgerSettings;
use toolmark::styles::StyleStore;
use toolmark::tools::ToolContext;
use toolmark::Telemetry;

/// Test context that implements ToolContext over a scratch directory
pub struct TestContext {
    pub telemetry: Telemetry,
    pub styles: StyleStore,
    dir: TempDir,
}

impl TestContext {
    /// Ledger under `<tmp>/metrics`, global styles under `<tmp>/home`, project at `<tmp>/repo`
    pub async fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let telemetry = Telemetry::start(&settings_in(dir.path())).await;
        let styles = StyleStore::new(global_styles_path(dir.path()), dir.path().join("repo"));
        Self {
            telemetry,
            styles,
            dir,
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn settings(&self) -> LedgerSettings {
        settings_in(self.dir.path())
    }

    /// Tear down the ledger workers, then start fresh ones over the same files
    pub async fn restart(&mut self) {
        self.telemetry.shutdown().await;
        self.telemetry = Telemetry::start(&self.settings()).await;
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

pub fn settings_in(root: &Path) -> LedgerSettings {
    LedgerSettings::in_dir(root.join("metrics"), "test-server")
}

pub fn global_styles_path(root: &Path) -> PathBuf {
    root.join("home").join("styles.json")
}

pub fn read_json(path: &Path) -> serde_json::Value {
    let contents = std::fs::read_to_string(path).expect("Failed to read file");
    serde_json::from_str(&contents).expect("File is not valid JSON")
}
