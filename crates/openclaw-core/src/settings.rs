//! Supervisor settings and validation.
//!
//! Pure configuration types. Adapters fill these from CLI flags or
//! environment variables and validate before building a supervisor.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Port the gateway listens on when none is given.
pub const DEFAULT_GATEWAY_PORT: u16 = 18789;

/// Number of log records kept in memory.
pub const DEFAULT_LOG_CAPACITY: usize = 500;

/// Number of records returned by a log query without an explicit limit.
pub const DEFAULT_LOG_LIMIT: usize = 50;

/// Gateway executable looked up on `PATH`.
#[cfg(not(windows))]
pub const DEFAULT_GATEWAY_PROGRAM: &str = "openclaw";

/// Gateway executable looked up on `PATH` (npm installs a `.cmd` shim).
#[cfg(windows)]
pub const DEFAULT_GATEWAY_PROGRAM: &str = "openclaw.cmd";

const DEFAULT_STARTUP_GRACE_MS: u64 = 2000;
const DEFAULT_STOP_TIMEOUT_MS: u64 = 3000;

/// How the supervisor launches and manages the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SupervisorSettings {
    /// Gateway executable.
    pub program: String,

    /// Arguments placed before `--port <port>`.
    pub args: Vec<String>,

    /// Port used when a start request does not name one.
    pub default_port: u16,

    /// Delay after spawn before the gateway is considered running.
    pub startup_grace_ms: u64,

    /// Time a SIGTERM'd gateway gets before it is killed.
    pub stop_timeout_ms: u64,

    /// Maximum number of log records kept.
    pub log_capacity: usize,

    /// Explicit OpenClaw home. Resolved from the environment when `None`.
    pub home_dir: Option<PathBuf>,
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            program: DEFAULT_GATEWAY_PROGRAM.to_string(),
            args: vec!["gateway".to_string()],
            default_port: DEFAULT_GATEWAY_PORT,
            startup_grace_ms: DEFAULT_STARTUP_GRACE_MS,
            stop_timeout_ms: DEFAULT_STOP_TIMEOUT_MS,
            log_capacity: DEFAULT_LOG_CAPACITY,
            home_dir: None,
        }
    }
}

impl SupervisorSettings {
    pub const fn startup_grace(&self) -> Duration {
        Duration::from_millis(self.startup_grace_ms)
    }

    pub const fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }
}

/// Settings validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("Gateway program cannot be empty")]
    EmptyProgram,

    #[error("Gateway port cannot be 0")]
    InvalidPort,

    #[error("Log capacity must be at least 1")]
    ZeroLogCapacity,

    #[error("Stop timeout must be greater than 0ms")]
    ZeroStopTimeout,
}

/// Validate settings values.
pub fn validate_settings(settings: &SupervisorSettings) -> Result<(), SettingsError> {
    if settings.program.trim().is_empty() {
        return Err(SettingsError::EmptyProgram);
    }

    if settings.default_port == 0 {
        return Err(SettingsError::InvalidPort);
    }

    if settings.log_capacity == 0 {
        return Err(SettingsError::ZeroLogCapacity);
    }

    if settings.stop_timeout_ms == 0 {
        return Err(SettingsError::ZeroStopTimeout);
    }

    Ok(())
}
