//! Process termination primitives for the gateway.
//!
//! Provides the two capabilities the supervisor's stop sequence needs:
//! - `terminate_pid`: graceful termination request (SIGTERM on Unix)
//! - `force_kill_pid`: unconditional kill (SIGKILL on Unix, `taskkill /T /F` on Windows)
//!
//! Waiting for exit and reaping are done by the process watcher, which owns
//! the `Child`.

mod force;
mod graceful;

pub use force::force_kill_pid;
pub use graceful::terminate_pid;

/// True when the platform supports graceful termination signals.
pub const SUPPORTS_GRACEFUL_STOP: bool = cfg!(unix);
