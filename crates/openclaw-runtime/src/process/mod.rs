//! Process-level building blocks for the gateway supervisor.
//!
//! # Structure
//!
//! - `LogClassifier` - raw output bytes to leveled, sourced `LogRecord`s
//! - `LogBuffer` - bounded FIFO of recent records
//! - `EventBus` / `Subscription` - status and log event fan-out
//! - `spawn_stream_reader` - stdout/stderr reader tasks feeding a `LogSink`
//! - `shutdown` - graceful and forced termination by PID

mod broadcaster;
mod classify;
mod logs;
pub mod shutdown;
mod stream;

pub use broadcaster::{EventBus, Subscription};
pub use classify::{LogClassifier, OutputStream};
pub use logs::LogBuffer;
pub use shutdown::{force_kill_pid, terminate_pid};
pub use stream::{LogSink, spawn_stream_reader};
