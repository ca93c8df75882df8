// crates/toolmark-server/src/lib.rs
// toolmark - tool-call ledger, issue reports and layered style preferences

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod config;
pub mod error;
pub mod ledger;
pub mod persist;
pub mod server;
pub mod styles;
pub mod telemetry;
pub mod tools;
pub mod utils;

pub use error::{Result, ToolmarkError};
pub use server::ToolmarkServer;
pub use telemetry::{Telemetry, TelemetrySnapshot};
