//! Paths command handler.
//!
//! Displays the resolved OpenClaw home and how the gateway would be launched,
//! for diagnosing installs where the gateway cannot be found.

use std::path::Path;

use anyhow::Result;
use openclaw_core::{SupervisorSettings, openclaw_home};

use crate::commands::LaunchArgs;
use crate::error::CliError;

/// Execute the paths command for the launch `run` would perform with the
/// same arguments and environment.
pub fn execute(launch: &LaunchArgs) -> Result<()> {
    let home = openclaw_home().map_err(CliError::from)?;
    print!("{}", render(&home, &launch.to_settings()));
    Ok(())
}

/// `key = value` lines describing the launch environment.
fn render(home: &Path, settings: &SupervisorSettings) -> String {
    let mut command = vec![settings.program.clone()];
    command.extend(settings.args.iter().cloned());
    command.push(format!("--port {}", settings.default_port));

    format!(
        "openclaw_home = {}\ngateway_command = {}\ngateway_url = ws://127.0.0.1:{}\n",
        home.display(),
        command.join(" "),
        settings.default_port,
    )
}
