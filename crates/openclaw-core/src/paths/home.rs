//! OpenClaw home directory resolution.

use std::env;
use std::path::{Path, PathBuf};

use super::error::PathError;

/// Environment variable overriding the OpenClaw home directory.
pub const OPENCLAW_HOME_ENV: &str = "OPENCLAW_HOME";

/// Directory name under the user home when no override is set.
const DEFAULT_HOME_DIR_NAME: &str = ".openclaw";

/// Get the OpenClaw home directory.
///
/// Resolution order:
/// 1. `OPENCLAW_HOME` environment variable (if set and non-empty)
/// 2. `~/.openclaw`
pub fn openclaw_home() -> Result<PathBuf, PathError> {
    let override_value = env::var(OPENCLAW_HOME_ENV).ok();
    resolve_openclaw_home(override_value.as_deref(), dirs::home_dir().as_deref())
}

/// Pure resolver behind [`openclaw_home`].
pub fn resolve_openclaw_home(
    override_value: Option<&str>,
    user_home: Option<&Path>,
) -> Result<PathBuf, PathError> {
    if let Some(value) = override_value.map(str::trim).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(value));
    }

    user_home
        .map(|home| home.join(DEFAULT_HOME_DIR_NAME))
        .ok_or(PathError::NoHomeDir)
}
