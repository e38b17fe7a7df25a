//! Bounded in-memory store of recent gateway log records.

use std::collections::VecDeque;

use openclaw_core::LogRecord;

/// Ring buffer of the most recent log records, oldest first.
#[derive(Debug)]
pub struct LogBuffer {
    records: VecDeque<LogRecord>,
    capacity: usize,
}

impl LogBuffer {
    /// Create an empty buffer. A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a record, evicting the oldest ones if over capacity.
    pub fn push(&mut self, record: LogRecord) {
        while self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// The last `limit` records, oldest to newest.
    pub fn tail(&self, limit: usize) -> Vec<LogRecord> {
        let skip = self.records.len().saturating_sub(limit);
        self.records.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(openclaw_core::DEFAULT_LOG_CAPACITY)
    }
}
