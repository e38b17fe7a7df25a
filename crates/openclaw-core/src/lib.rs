//! Core domain types for the OpenClaw gateway supervisor.
//!
//! This crate holds the pure, transport-agnostic pieces shared by the
//! runtime and the adapters:
//!
//! - [`GatewayStatus`] / [`GatewayState`] - the status snapshot and its state machine
//! - [`LogRecord`] / [`LogLevel`] - classified gateway output
//! - [`GatewayEvent`] - what subscribers receive
//! - [`SupervisorSettings`] - supervisor configuration and validation
//! - [`paths`] - OpenClaw home directory resolution
//!
//! Nothing here spawns processes or performs async I/O.
#![deny(unused_crate_dependencies)]

pub mod events;
pub mod gateway;
pub mod paths;
pub mod settings;

// Re-export commonly used types for convenience
pub use events::GatewayEvent;
pub use gateway::{GatewayError, GatewayState, GatewayStatus, LogLevel, LogRecord, LogSource};
pub use paths::{OPENCLAW_HOME_ENV, PathError, openclaw_home, resolve_openclaw_home};
pub use settings::{
    DEFAULT_GATEWAY_PORT, DEFAULT_GATEWAY_PROGRAM, DEFAULT_LOG_CAPACITY, DEFAULT_LOG_LIMIT,
    SettingsError, SupervisorSettings, validate_settings,
};
