//! Command-line front end for the OpenClaw gateway supervisor.
//!
//! The `openclaw-desktop` binary is the composition root: it loads `.env`,
//! installs tracing, parses arguments and hands off to a handler that owns a
//! `GatewaySupervisor` for the lifetime of the command.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by the binary target only
use dotenvy as _;
use tracing_subscriber as _;

pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;

// Re-export primary types for convenient access
pub use commands::{Commands, LaunchArgs, RunArgs};
pub use error::CliError;
pub use parser::Cli;
