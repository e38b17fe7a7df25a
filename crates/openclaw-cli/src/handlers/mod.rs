//! Command handlers.
//!
//! Handlers are thin wrappers that:
//! 1. Turn CLI arguments into supervisor settings
//! 2. Call the supervisor
//! 3. Format output for the terminal

pub mod paths;
pub mod run;
