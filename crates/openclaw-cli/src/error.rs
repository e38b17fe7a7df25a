//! CLI-specific error types and mappings.
//!
//! This module provides error types for the CLI adapter and mappings
//! from domain errors to exit codes and user-facing messages.

use openclaw_core::{PathError, SettingsError};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid supervisor configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Path resolution failed.
    #[error("Path error: {0}")]
    Path(String),

    /// The gateway failed to start or exited while running.
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// IO error (signal handler setup, stdout).
    #[error("IO error: {0}")]
    Io(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow sysexits.h where one fits.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 78,  // EX_CONFIG
            Self::Path(_) => 72,    // EX_OSFILE
            Self::Gateway(_) => 69, // EX_UNAVAILABLE
            Self::Io(_) => 74,      // EX_IOERR
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        Self::Path(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
