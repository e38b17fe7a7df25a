//! Gateway output classification.
//!
//! Turns raw bytes from the gateway's stdout/stderr into leveled, sourced
//! `LogRecord`s. Level and source detection are plain substring checks in a
//! fixed priority order; the first rule that matches wins.

use openclaw_core::{LogLevel, LogRecord, LogSource};

/// Level markers in precedence order: bracketed tag, then lowercase keyword.
const LEVEL_MARKERS: [(LogLevel, &str, &str); 4] = [
    (LogLevel::Info, "[INFO]", "info"),
    (LogLevel::Warn, "[WARN]", "warn"),
    (LogLevel::Error, "[ERROR]", "error"),
    (LogLevel::Debug, "[DEBUG]", "debug"),
];

/// Which gateway output stream a chunk came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl OutputStream {
    /// Level used when a line carries no marker.
    pub const fn default_level(self) -> LogLevel {
        match self {
            Self::Stdout => LogLevel::Info,
            Self::Stderr => LogLevel::Error,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

/// Stateless classifier for gateway output.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogClassifier;

impl LogClassifier {
    pub const fn new() -> Self {
        Self
    }

    /// Split a raw chunk into lines and classify each non-blank one.
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    pub fn classify_chunk(&self, chunk: &[u8], default_level: LogLevel) -> Vec<LogRecord> {
        String::from_utf8_lossy(chunk)
            .split('\n')
            .filter_map(|line| self.classify_line(line, default_level))
            .collect()
    }

    /// Classify one line. Returns `None` for blank lines.
    pub fn classify_line(&self, raw: &str, default_level: LogLevel) -> Option<LogRecord> {
        let message = raw.trim();
        if message.is_empty() {
            return None;
        }

        Some(LogRecord::new(
            self.detect_level(message).unwrap_or(default_level),
            message,
            self.detect_source(message),
        ))
    }

    /// First matching level marker, if any.
    pub fn detect_level(&self, message: &str) -> Option<LogLevel> {
        LEVEL_MARKERS
            .iter()
            .find(|(_, tag, keyword)| message.contains(tag) || message.contains(keyword))
            .map(|(level, _, _)| *level)
    }

    /// First matching channel keyword, or the gateway fallback.
    pub fn detect_source(&self, message: &str) -> LogSource {
        LogSource::CHANNELS
            .into_iter()
            .find(|source| message.contains(source.as_str()))
            .unwrap_or(LogSource::Gateway)
    }
}
