//! Gateway events delivered to subscribers.
//!
//! Subscribers (the UI bridge, the CLI printer) receive these as the push
//! side of the supervisor. Anything missed before subscribing must be read
//! back through the status and log snapshot queries.

use serde::{Deserialize, Serialize};

use crate::gateway::{GatewayStatus, LogRecord};

/// Bridge channel carrying status snapshots.
pub const STATUS_CHANGED_CHANNEL: &str = "gateway:status-changed";

/// Bridge channel carrying single log records.
pub const NEW_LOG_CHANNEL: &str = "gateway:new-log";

/// Supervisor event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum GatewayEvent {
    /// The authoritative status changed.
    StatusChanged(GatewayStatus),
    /// A log record was appended.
    NewLog(LogRecord),
}

impl GatewayEvent {
    /// Bridge channel name for this event.
    pub const fn channel(&self) -> &'static str {
        match self {
            Self::StatusChanged(_) => STATUS_CHANGED_CHANNEL,
            Self::NewLog(_) => NEW_LOG_CHANNEL,
        }
    }

    pub const fn as_status(&self) -> Option<&GatewayStatus> {
        match self {
            Self::StatusChanged(status) => Some(status),
            Self::NewLog(_) => None,
        }
    }

    pub const fn as_log(&self) -> Option<&LogRecord> {
        match self {
            Self::NewLog(record) => Some(record),
            Self::StatusChanged(_) => None,
        }
    }
}
