//! Path utilities for the OpenClaw home directory.
//!
//! The gateway and the desktop shell share one home directory holding
//! `openclaw.json`, `.env` and the workspace. It is passed to the gateway
//! through `OPENCLAW_HOME`.
//!
//! # Design
//!
//! - Returns `PathBuf` and `PathError` for clear error handling
//! - Resolution is split into a pure resolver and an environment-reading wrapper

mod error;
mod home;

pub use error::PathError;
pub use home::{OPENCLAW_HOME_ENV, openclaw_home, resolve_openclaw_home};
