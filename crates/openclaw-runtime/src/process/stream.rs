//! Async stream log readers (non-UTF8-safe).
//!
//! The gateway is a Node process but its plugins can emit arbitrary bytes.
//! `BufReader::lines()` would end the reader task on invalid UTF-8, so lines
//! are read as bytes and handed to the classifier, which decodes lossily.

use std::sync::Arc;

use openclaw_core::LogRecord;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::debug;

use super::classify::{LogClassifier, OutputStream};

/// Destination for classified gateway output.
///
/// Implementations must be cheap and non-blocking; they are called from the
/// reader tasks for every line.
pub trait LogSink: Send + Sync {
    fn append(&self, record: LogRecord);
}

/// Read `stream` line by line until EOF, classifying each line into `sink`.
pub fn spawn_stream_reader(
    stream: impl AsyncRead + Unpin + Send + 'static,
    kind: OutputStream,
    classifier: LogClassifier,
    sink: Arc<dyn LogSink>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut buf: Vec<u8> = Vec::with_capacity(1024);

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break, // EOF
                Ok(_) => {
                    for record in classifier.classify_chunk(&buf, kind.default_level()) {
                        debug!(stream = kind.as_str(), "{}", record.message());
                        sink.append(record);
                    }
                }
                Err(e) => {
                    debug!(stream = kind.as_str(), error = %e, "log stream reader exiting due to read error");
                    break;
                }
            }
        }

        debug!(stream = kind.as_str(), "log stream reader task exiting");
    })
}
