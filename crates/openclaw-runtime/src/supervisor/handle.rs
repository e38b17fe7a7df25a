//! Live gateway process handle and its watcher task.
//!
//! The watcher task owns the `Child`: it waits for exit, applies control
//! requests (terminate/kill) and publishes the exit exactly once. The
//! supervisor keeps a `ProcessHandle` that talks to the watcher through
//! channels, so no lock is ever held while waiting on the process.

use std::fmt;
use std::io;
use std::process::ExitStatus;

use openclaw_core::GatewayError;
use tokio::process::Child;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::process::shutdown::terminate_pid;

/// How a gateway process ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessExit {
    /// Exited with a status code.
    Code(i32),
    /// Killed by a signal (Unix only).
    Signal(i32),
    /// The exit status could not be collected.
    Unknown(String),
}

impl ProcessExit {
    fn from_wait(result: io::Result<ExitStatus>) -> Self {
        match result {
            Ok(status) => Self::from_status(status),
            Err(e) => Self::Unknown(e.to_string()),
        }
    }

    fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Self::Code(code);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Self::Signal(signal);
            }
        }

        Self::Unknown(status.to_string())
    }

    /// The failure this exit represents, or `None` for a clean exit.
    pub fn failure(&self) -> Option<GatewayError> {
        match self {
            Self::Code(0) => None,
            Self::Code(code) => Some(GatewayError::UnexpectedExit { code: *code }),
            Self::Signal(signal) => Some(GatewayError::KilledBySignal { signal: *signal }),
            Self::Unknown(reason) => Some(GatewayError::WaitFailed(reason.clone())),
        }
    }
}

impl fmt::Display for ProcessExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "code: {code}"),
            Self::Signal(signal) => write!(f, "signal: {signal}"),
            Self::Unknown(reason) => write!(f, "unknown: {reason}"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Control {
    Terminate,
    Kill,
}

/// Supervisor-side reference to a spawned gateway.
#[derive(Debug)]
pub struct ProcessHandle {
    pid: u32,
    generation: u64,
    control: mpsc::UnboundedSender<Control>,
    exit: watch::Receiver<Option<ProcessExit>>,
}

impl ProcessHandle {
    /// Hand `child` to a watcher task. `on_exit` runs once, after the exit
    /// has been published to the handle.
    pub fn watch<F>(child: Child, pid: u32, generation: u64, on_exit: F) -> Self
    where
        F: FnOnce(ProcessExit) + Send + 'static,
    {
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let (exit_tx, exit_rx) = watch::channel(None);

        tokio::spawn(run_watcher(child, pid, control_rx, exit_tx, on_exit));

        Self {
            pid,
            generation,
            control: control_tx,
            exit: exit_rx,
        }
    }

    pub const fn pid(&self) -> u32 {
        self.pid
    }

    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// The exit, if the process has already been reaped.
    pub fn exit(&self) -> Option<ProcessExit> {
        self.exit.borrow().clone()
    }

    pub fn has_exited(&self) -> bool {
        self.exit.borrow().is_some()
    }

    /// Request graceful termination (SIGTERM on Unix).
    pub fn terminate(&self) {
        let _ = self.control.send(Control::Terminate);
    }

    /// Request an immediate kill.
    pub fn kill(&self) {
        let _ = self.control.send(Control::Kill);
    }

    /// Resolves once the process has been reaped.
    ///
    /// The returned future does not borrow the handle, so it can be awaited
    /// after the handle has been stored elsewhere.
    pub fn wait_exit(&self) -> impl Future<Output = ProcessExit> + Send + use<> {
        let mut exit = self.exit.clone();
        async move {
            match exit.wait_for(Option::is_some).await {
                Ok(value) => value
                    .clone()
                    .unwrap_or_else(|| ProcessExit::Unknown(String::new())),
                Err(_) => ProcessExit::Unknown("process watcher stopped".to_string()),
            }
        }
    }
}

async fn run_watcher<F>(
    mut child: Child,
    pid: u32,
    mut control_rx: mpsc::UnboundedReceiver<Control>,
    exit_tx: watch::Sender<Option<ProcessExit>>,
    on_exit: F,
) where
    F: FnOnce(ProcessExit) + Send + 'static,
{
    let mut control_open = true;

    let exit = loop {
        tokio::select! {
            result = child.wait() => break ProcessExit::from_wait(result),
            command = control_rx.recv(), if control_open => match command {
                Some(Control::Terminate) => {
                    debug!(pid, "Sending graceful termination to gateway");
                    if let Err(e) = terminate_pid(pid) {
                        warn!(pid, error = %e, "Graceful termination failed, killing instead");
                        if let Err(e) = child.start_kill() {
                            warn!(pid, error = %e, "Failed to kill gateway process");
                        }
                    }
                }
                Some(Control::Kill) => {
                    debug!(pid, "Killing gateway process");
                    if let Err(e) = child.start_kill() {
                        warn!(pid, error = %e, "Failed to kill gateway process");
                    }
                }
                None => {
                    // Handle dropped without a stop: nobody owns the process any more.
                    control_open = false;
                    debug!(pid, "Gateway handle released, killing process");
                    let _ = child.start_kill();
                }
            },
        }
    };

    debug!(pid, %exit, "Gateway process reaped");
    exit_tx.send_replace(Some(exit.clone()));
    on_exit(exit);
}
