// crates/toolmark-server/src/cli/mod.rs
// CLI module for toolmark commands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod inspect;
pub mod serve;
pub mod styles;
pub mod tool;

pub use inspect::{run_config, run_issues, run_stats};
pub use serve::run_serve;
pub use styles::run_styles;
pub use tool::run_tool;

#[derive(Parser)]
#[command(name = "toolmark")]
#[command(about = "Tool-call ledger, issue reports and layered style preferences")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Project root for project-scoped styles (default: current directory)
    #[arg(long, global = true, env = "TOOLMARK_PROJECT_ROOT")]
    pub project_root: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve tool calls as JSON lines on stdin/stdout (default)
    Serve,

    /// Execute a tool directly
    Tool {
        /// Tool name (e.g. get_folder_style, report_issue)
        #[arg(index = 1)]
        name: String,

        /// JSON arguments (e.g. '{"folder": "/repo/icons"}')
        #[arg(index = 2, default_value = "{}")]
        args: String,
    },

    /// Show per-tool statistics from the invocation ledger
    Stats {
        /// Also list this many recent calls
        #[arg(short, long, default_value = "0")]
        recent: usize,
    },

    /// List reported issues, newest first
    Issues {
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// low | medium | high | critical
        #[arg(long)]
        severity: Option<String>,

        /// bug | feature_request | documentation | performance | security | other
        #[arg(long)]
        category: Option<String>,
    },

    /// Inspect and edit style preferences
    Styles {
        #[command(subcommand)]
        action: StyleAction,
    },

    /// Show effective configuration
    Config {
        /// Validate and exit non-zero on errors
        #[arg(long)]
        check: bool,
    },
}

#[derive(Subcommand)]
pub enum StyleAction {
    /// List merged styles and folder associations
    List,
    /// Resolve the effective style for a folder
    Resolve { folder: String },
    /// Create or replace a style
    Save {
        name: String,
        /// Tags in order
        #[arg(required = true, num_args = 1..)]
        tags: Vec<String>,
        #[arg(long, default_value = "global")]
        scope: String,
    },
    /// Delete a style and its same-scope folder associations
    Delete {
        name: String,
        #[arg(long, default_value = "global")]
        scope: String,
    },
    /// Associate a folder with a style
    SetFolder {
        folder: String,
        style: String,
        #[arg(long, default_value = "global")]
        scope: String,
    },
    /// Remove a folder association
    RemoveFolder {
        folder: String,
        #[arg(long, default_value = "global")]
        scope: String,
    },
}
