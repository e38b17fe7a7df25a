//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for supervising the OpenClaw gateway.
///
/// This is the top-level parser that handles global options and dispatches
/// to subcommands.
#[derive(Parser)]
#[command(name = "openclaw-desktop")]
#[command(about = "Run and supervise the OpenClaw gateway")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Default tracing filter directive when `RUST_LOG` is not set.
    pub const fn log_directive(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
