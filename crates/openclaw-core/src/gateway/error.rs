//! Gateway failure taxonomy.
//!
//! Supervisor operations never return these as `Err`. They are rendered
//! into status error messages and log records instead.

use std::time::Duration;

use thiserror::Error;

/// Ways a supervised gateway can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The executable is missing or the OS rejected the launch.
    #[error("Failed to spawn gateway: {0}")]
    SpawnFailure(String),

    /// The process exited on its own with a nonzero code.
    #[error("Process exited with code {code}")]
    UnexpectedExit { code: i32 },

    /// The process was killed by a signal without an exit code.
    #[error("Process terminated by signal {signal}")]
    KilledBySignal { signal: i32 },

    /// The exit status could not be collected.
    #[error("Lost track of gateway process: {0}")]
    WaitFailed(String),

    /// The process ignored the graceful termination signal.
    #[error("Gateway did not exit within {}ms of SIGTERM", .0.as_millis())]
    GracefulStopTimeout(Duration),
}
