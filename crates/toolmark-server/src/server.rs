// crates/toolmark-server/src/server.rs
// Server context shared by every tool call

use crate::config::{EnvConfig, LedgerSettings, ToolmarkConfig};
use crate::styles::StyleStore;
use crate::telemetry::Telemetry;
use crate::tools::ToolContext;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone)]
pub struct ToolmarkServer {
    pub telemetry: Telemetry,
    pub styles: Arc<StyleStore>,
}

impl ToolmarkServer {
    pub fn new(telemetry: Telemetry, styles: StyleStore) -> Self {
        Self {
            telemetry,
            styles: Arc::new(styles),
        }
    }

    /// Resolve settings from env and ~/.toolmark/config.toml, then start the ledger
    pub async fn from_config(
        env: &EnvConfig,
        file: &ToolmarkConfig,
        project_root: Option<PathBuf>,
    ) -> Self {
        let settings = LedgerSettings::resolve(env, file);
        let telemetry = Telemetry::start(&settings).await;
        let styles = StyleStore::from_home(project_root.or_else(|| env.project_root.clone()));
        tracing::debug!(project_root = %styles.project_root().display(), "Style store ready");
        Self::new(telemetry, styles)
    }

    pub async fn shutdown(&self) {
        self.telemetry.shutdown().await;
    }
}

impl ToolContext for ToolmarkServer {
    fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    fn styles(&self) -> &StyleStore {
        &self.styles
    }
}
