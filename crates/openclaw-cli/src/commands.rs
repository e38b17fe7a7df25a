//! Subcommands and their arguments.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use openclaw_core::{DEFAULT_GATEWAY_PORT, DEFAULT_GATEWAY_PROGRAM, SupervisorSettings};

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Start the gateway in the foreground and stream its events until Ctrl-C
    Run(RunArgs),

    /// Show the resolved OpenClaw home and gateway launch settings
    Paths(LaunchArgs),
}

/// Which gateway to launch and where; shared by `run` and `paths`.
#[derive(Args, Debug, Clone)]
pub struct LaunchArgs {
    /// Port the gateway listens on
    #[arg(short, long, env = "OPENCLAW_GATEWAY_PORT", default_value_t = DEFAULT_GATEWAY_PORT)]
    pub port: u16,

    /// Gateway executable
    #[arg(long, env = "OPENCLAW_GATEWAY_BIN", default_value = DEFAULT_GATEWAY_PROGRAM)]
    pub program: String,
}

impl LaunchArgs {
    /// Default settings with this program and port.
    pub fn to_settings(&self) -> SupervisorSettings {
        SupervisorSettings {
            program: self.program.clone(),
            default_port: self.port,
            ..SupervisorSettings::default()
        }
    }
}

/// Arguments for `run`.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub launch: LaunchArgs,

    /// Milliseconds to wait after spawn before reporting the gateway as running
    #[arg(long = "grace-ms", default_value_t = 2000)]
    pub grace_ms: u64,

    /// Milliseconds a stopping gateway gets before it is killed
    #[arg(long = "stop-timeout-ms", default_value_t = 3000)]
    pub stop_timeout_ms: u64,

    /// Number of gateway log records kept in memory
    #[arg(long = "log-capacity", default_value_t = 500)]
    pub log_capacity: usize,

    /// OpenClaw home directory passed to the gateway
    #[arg(long, env = "OPENCLAW_HOME")]
    pub home: Option<PathBuf>,

    /// Print events as JSON lines instead of text
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    /// Supervisor settings for these arguments.
    pub fn to_settings(&self) -> SupervisorSettings {
        SupervisorSettings {
            startup_grace_ms: self.grace_ms,
            stop_timeout_ms: self.stop_timeout_ms,
            log_capacity: self.log_capacity,
            home_dir: self.home.clone(),
            ..self.launch.to_settings()
        }
    }
}
