//! Gateway domain types.
//!
//! - `status` - status snapshot and lifecycle state
//! - `log` - classified log records
//! - `error` - failure taxonomy used for status messages

mod error;
mod log;
mod status;

pub use error::GatewayError;
pub use log::{LogLevel, LogRecord, LogSource};
pub use status::{GatewayState, GatewayStatus};
