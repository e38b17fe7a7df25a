//! Forced, immediate termination by PID.

use std::io;

#[cfg(unix)]
use nix::errno::Errno;
#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

#[cfg(windows)]
use tokio::process::Command;

/// Kill a process without giving it a chance to clean up.
///
/// # Platform behavior
/// - Unix: sends SIGKILL to the process.
/// - Windows: runs `taskkill /PID <pid> /T /F`, which also kills the
///   process tree (the gateway runs under a `.cmd` shim).
///
/// A process that is already gone counts as success.
pub async fn force_kill_pid(pid: u32) -> io::Result<()> {
    #[cfg(unix)]
    {
        force_kill_unix(pid)
    }

    #[cfg(windows)]
    {
        force_kill_windows(pid).await
    }

    #[cfg(not(any(unix, windows)))]
    {
        let _ = pid;
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "forced kill by pid is not available on this platform",
        ))
    }
}

#[cfg(unix)]
fn force_kill_unix(pid: u32) -> io::Result<()> {
    let raw = i32::try_from(pid)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, format!("invalid pid {pid}")))?;

    match signal::kill(Pid::from_raw(raw), Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(e) => Err(io::Error::other(e)),
    }
}

#[cfg(windows)]
async fn force_kill_windows(pid: u32) -> io::Result<()> {
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;

    let output = Command::new("taskkill")
        .args(["/PID", &pid.to_string(), "/T", "/F"])
        .creation_flags(CREATE_NO_WINDOW)
        .output()
        .await?;

    if output.status.success() {
        return Ok(());
    }

    // 128: no such process
    if output.status.code() == Some(128) {
        return Ok(());
    }

    Err(io::Error::other(format!(
        "taskkill failed for pid {pid}: {}",
        String::from_utf8_lossy(&output.stderr).trim()
    )))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;
    use std::time::Duration;
    use tokio::process::Command;
    use tokio::time::timeout;

    #[tokio::test]
    async fn force_kill_handles_already_gone() {
        assert!(force_kill_pid(999_999).await.is_ok());
    }

    #[tokio::test]
    async fn force_kill_ignores_sigterm_trap() {
        let mut child = Command::new("sh")
            .args(["-c", "trap '' TERM; sleep 30"])
            .spawn()
            .expect("failed to spawn sh");
        let pid = child.id().expect("no PID");

        force_kill_pid(pid).await.unwrap();

        let status = timeout(Duration::from_secs(5), child.wait())
            .await
            .expect("process survived SIGKILL")
            .unwrap();
        assert_eq!(status.signal(), Some(9));
    }
}
