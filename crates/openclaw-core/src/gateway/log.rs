//! Classified gateway log records.

use std::fmt;

use chrono::Local;
use serde::{Deserialize, Serialize};

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Debug,
}

impl LogLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Debug => "debug",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subsystem or channel that produced a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSource {
    Whatsapp,
    Telegram,
    Discord,
    Slack,
    Webchat,
    Agent,
    /// Fallback for gateway output that names no channel.
    Gateway,
    /// Records written by the supervisor itself.
    System,
}

impl LogSource {
    /// Channel sources in match priority order.
    pub const CHANNELS: [Self; 6] = [
        Self::Whatsapp,
        Self::Telegram,
        Self::Discord,
        Self::Slack,
        Self::Webchat,
        Self::Agent,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Whatsapp => "whatsapp",
            Self::Telegram => "telegram",
            Self::Discord => "discord",
            Self::Slack => "slack",
            Self::Webchat => "webchat",
            Self::Agent => "agent",
            Self::Gateway => "gateway",
            Self::System => "system",
        }
    }
}

impl fmt::Display for LogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified, timestamped line of gateway output.
///
/// Records are never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Local wall-clock time, `HH:MM:SS`.
    time: String,
    level: LogLevel,
    message: String,
    source: LogSource,
}

impl LogRecord {
    /// Create a record stamped with the current local time.
    pub fn new(level: LogLevel, message: impl Into<String>, source: LogSource) -> Self {
        Self::at(Local::now().format("%H:%M:%S").to_string(), level, message, source)
    }

    /// Create a record with an explicit timestamp.
    pub fn at(
        time: impl Into<String>,
        level: LogLevel,
        message: impl Into<String>,
        source: LogSource,
    ) -> Self {
        Self {
            time: time.into(),
            level,
            message: message.into(),
            source,
        }
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    pub const fn level(&self) -> LogLevel {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn source(&self) -> LogSource {
        self.source
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] [{}] {}",
            self.time, self.level, self.source, self.message
        )
    }
}
