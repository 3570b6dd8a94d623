//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "cover", version, about = "Travel-time cover controller")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/covers.toml")]
    pub config: PathBuf,

    /// Cover to operate on; optional when the config defines exactly one
    #[arg(long, value_name = "NAME")]
    pub cover: Option<String>,

    /// Emit state updates and errors as JSON lines instead of pretty text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open fully (position 100)
    Open,
    /// Close fully (position 0)
    Close,
    /// Move to a position percent; out-of-range values clamp to [0, 100]
    SetPosition {
        /// Target position percent (0 = closed, 100 = open)
        position: i64,
    },
    /// Turn the switch off and freeze the position estimate
    Stop,
    /// Print the current state snapshot and exit
    Status,
}
