//! Process runtime for the OpenClaw gateway.
//!
//! This crate owns everything that touches the operating system: spawning
//! the gateway, reading and classifying its output, terminating it, and
//! fanning status and log events out to subscribers. Domain types live in
//! `openclaw-core`.

#![deny(unsafe_code)]

pub mod process;
pub mod supervisor;

// Re-export the supervisor, the main entry point
pub use supervisor::{GatewaySupervisor, ProcessExit};

// Re-export event fan-out and log plumbing
pub use process::{EventBus, LogBuffer, LogClassifier, LogSink, OutputStream, Subscription};
