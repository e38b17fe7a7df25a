//! Gateway supervisor: owns the gateway child process and its lifecycle.
//!
//! The supervisor owns all state internally. Adapters (CLI, desktop shell)
//! hold a cheap clone and call methods on it without keeping process handles
//! themselves.
//!
//! Key design decisions:
//! - **Serialized operations**: `start`, `stop` and `restart` take one async
//!   operation lock, so a stop issued during a start waits for it to resolve.
//!   Each operation runs on its own task, so it completes even if the caller
//!   stops waiting
//! - **Generation counter**: every start and stop bumps the generation; exit
//!   reports from a superseded process never touch the current status
//! - **Short state lock**: shared state sits behind a `std::sync::Mutex` that
//!   is never held across an `.await`
//! - **Asymmetric exits**: a nonzero exit is an error only once the gateway
//!   was running; a failed startup settles to `Stopped`

mod handle;

use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};

use openclaw_core::{
    DEFAULT_LOG_LIMIT, GatewayError, GatewayEvent, GatewayState, GatewayStatus, LogLevel,
    LogRecord, LogSource, OPENCLAW_HOME_ENV, SupervisorSettings, openclaw_home,
};
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::process::shutdown::{SUPPORTS_GRACEFUL_STOP, force_kill_pid};
use crate::process::{
    EventBus, LogBuffer, LogClassifier, LogSink, OutputStream, Subscription, spawn_stream_reader,
};

pub use handle::{ProcessExit, ProcessHandle};

/// How long a killed gateway gets to be reaped before the stop gives up on it.
const REAP_TIMEOUT: Duration = Duration::from_secs(2);

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

struct SupervisorState {
    status: GatewayStatus,
    handle: Option<ProcessHandle>,
    started_at: Option<Instant>,
    generation: u64,
}

impl SupervisorState {
    fn snapshot(&self) -> GatewayStatus {
        let uptime_ms = self.started_at.map_or(0, |started| {
            u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
        });
        self.status.clone().with_uptime(uptime_ms)
    }

    fn owns(&self, generation: u64) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| handle.generation() == generation)
    }
}

struct Inner {
    settings: SupervisorSettings,
    classifier: LogClassifier,
    state: Mutex<SupervisorState>,
    logs: Mutex<LogBuffer>,
    bus: EventBus,
    ops: Arc<tokio::sync::Mutex<()>>,
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, SupervisorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_logs(&self) -> MutexGuard<'_, LogBuffer> {
        self.logs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the status and publish it while the state lock is held, so
    /// subscribers see transitions in the order they happened.
    fn set_status(&self, state: &mut SupervisorState, status: GatewayStatus) {
        debug!(status = %status, generation = state.generation, "Gateway status changed");
        state.status = status.clone();
        self.bus.publish(GatewayEvent::StatusChanged(status));
    }

    fn push_log(&self, record: LogRecord) {
        let mut logs = self.lock_logs();
        logs.push(record.clone());
        self.bus.publish(GatewayEvent::NewLog(record));
    }

    fn system_log(&self, level: LogLevel, message: impl Into<String>) {
        self.push_log(LogRecord::new(level, message, LogSource::System));
    }

    /// Called by the watcher task once the process of `generation` is reaped.
    fn on_process_exit(&self, generation: u64, exit: &ProcessExit) {
        {
            let mut state = self.lock_state();
            self.apply_exit(&mut state, generation, exit);
        }

        self.system_log(LogLevel::Info, format!("Gateway process exited ({exit})"));
    }

    /// Settle the status after an exit. No-op unless `generation` still owns
    /// the handle, which also makes repeated calls harmless.
    fn apply_exit(&self, state: &mut SupervisorState, generation: u64, exit: &ProcessExit) {
        if !state.owns(generation) {
            debug!(generation, current = state.generation, %exit, "Ignoring exit of superseded gateway");
            return;
        }

        state.handle = None;
        state.started_at = None;

        let port = state.status.port();
        let was_running = state.status.state() == GatewayState::Running;
        let next = match exit.failure() {
            Some(failure) if was_running => {
                warn!(port, generation, error = %failure, "Gateway exited unexpectedly");
                GatewayStatus::error(port, failure.to_string())
            }
            _ => {
                info!(port, generation, %exit, "Gateway exited");
                GatewayStatus::stopped(port)
            }
        };
        self.set_status(state, next);
    }
}

/// Routes classified gateway output into the supervisor's log buffer.
struct SupervisorSink {
    inner: Weak<Inner>,
}

impl LogSink for SupervisorSink {
    fn append(&self, record: LogRecord) {
        if let Some(inner) = self.inner.upgrade() {
            inner.push_log(record);
        }
    }
}

/// Supervisor for the OpenClaw gateway process.
///
/// Cloning is cheap; all clones share the same process, status, log buffer
/// and event bus.
///
/// # Example
///
/// ```ignore
/// let supervisor = GatewaySupervisor::new(SupervisorSettings::default());
/// let status = supervisor.start(18789).await;
/// println!("Status: {status}");
/// supervisor.stop().await;
/// ```
#[derive(Clone)]
pub struct GatewaySupervisor {
    inner: Arc<Inner>,
}

impl Default for GatewaySupervisor {
    fn default() -> Self {
        Self::new(SupervisorSettings::default())
    }
}

impl fmt::Debug for GatewaySupervisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewaySupervisor")
            .field("program", &self.inner.settings.program)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

impl GatewaySupervisor {
    /// Create a supervisor in the `Stopped` state on the default port.
    #[must_use]
    pub fn new(settings: SupervisorSettings) -> Self {
        let state = SupervisorState {
            status: GatewayStatus::stopped(settings.default_port),
            handle: None,
            started_at: None,
            generation: 0,
        };
        let logs = LogBuffer::new(settings.log_capacity);

        Self {
            inner: Arc::new(Inner {
                settings,
                classifier: LogClassifier::new(),
                state: Mutex::new(state),
                logs: Mutex::new(logs),
                bus: EventBus::new(),
                ops: Arc::new(tokio::sync::Mutex::new(())),
            }),
        }
    }

    pub fn settings(&self) -> &SupervisorSettings {
        &self.inner.settings
    }

    /// Start the gateway on `port`.
    ///
    /// Returns once the startup grace period has elapsed or the process exited
    /// during it. A gateway that is already running is left alone and its
    /// status returned. Spawn failures are reported through the returned
    /// status (`Error`) rather than as a `Result`.
    pub async fn start(&self, port: u16) -> GatewayStatus {
        self.run_operation(move |supervisor| async move { supervisor.start_locked(port).await })
            .await
    }

    /// Stop the gateway. Always ends in `Stopped`.
    pub async fn stop(&self) -> GatewayStatus {
        self.run_operation(|supervisor| async move { supervisor.stop_locked().await })
            .await
    }

    /// Stop, then start again on `port` or the current port. Port 0 means
    /// the current port.
    pub async fn restart(&self, port: Option<u16>) -> GatewayStatus {
        self.run_operation(move |supervisor| async move {
            supervisor
                .inner
                .system_log(LogLevel::Info, "Restarting Gateway...");
            let stopped = supervisor.stop_locked().await;
            let port = port.filter(|p| *p != 0).unwrap_or_else(|| stopped.port());
            supervisor.start_locked(port).await
        })
        .await
    }

    /// Run a lifecycle operation on its own task under the operation lock.
    ///
    /// The caller only awaits the task, so dropping the caller's future
    /// (timeout, `select!`, aborted request) never abandons a transition
    /// halfway.
    async fn run_operation<F, Fut>(&self, operation: F) -> GatewayStatus
    where
        F: FnOnce(Self) -> Fut + Send + 'static,
        Fut: Future<Output = GatewayStatus> + Send + 'static,
    {
        let supervisor = self.clone();
        let ops = Arc::clone(&self.inner.ops);

        let task = tokio::spawn(async move {
            let _op = ops.lock_owned().await;
            operation(supervisor).await
        });

        match task.await {
            Ok(status) => status,
            Err(e) => {
                error!(error = %e, "Gateway operation task failed");
                self.status()
            }
        }
    }

    /// Current status, with uptime computed as of now when running.
    pub fn status(&self) -> GatewayStatus {
        self.inner.lock_state().snapshot()
    }

    /// The most recent `limit` log records, oldest first.
    pub fn logs(&self, limit: usize) -> Vec<LogRecord> {
        self.inner.lock_logs().tail(limit)
    }

    /// The most recent records using the default limit.
    pub fn recent_logs(&self) -> Vec<LogRecord> {
        self.logs(DEFAULT_LOG_LIMIT)
    }

    /// Subscribe to status-changed and new-log events.
    pub fn subscribe(&self) -> Subscription {
        self.inner.bus.subscribe()
    }

    /// Kill any live gateway without waiting and without touching the status.
    ///
    /// Meant for application teardown, where there is no time for a graceful
    /// stop sequence.
    pub fn destroy(&self) {
        let handle = self.inner.lock_state().handle.take();
        let Some(handle) = handle else {
            return;
        };

        info!(pid = handle.pid(), "Destroying gateway process");

        #[cfg(windows)]
        {
            if let Ok(runtime) = tokio::runtime::Handle::try_current() {
                let pid = handle.pid();
                runtime.spawn(async move {
                    if let Err(e) = force_kill_pid(pid).await {
                        warn!(pid, error = %e, "Failed to kill gateway process tree");
                    }
                });
            }
        }

        handle.kill();
    }

    async fn start_locked(&self, port: u16) -> GatewayStatus {
        let generation = {
            let mut state = self.inner.lock_state();
            let alive = state.handle.as_ref().is_some_and(|h| !h.has_exited());
            if state.status.is_running() && alive {
                debug!(port = state.status.port(), "Gateway already running");
                return state.snapshot();
            }

            if let Some(stale) = state.handle.take() {
                debug!(pid = stale.pid(), "Discarding stale gateway handle");
                stale.kill();
            }

            state.generation += 1;
            state.started_at = None;
            self.inner
                .set_status(&mut state, GatewayStatus::starting(port));
            state.generation
        };

        let (mut child, pid) = match self.spawn_gateway(port) {
            Ok(spawned) => spawned,
            Err(failure) => {
                error!(port, error = %failure, "Failed to start gateway");
                {
                    let mut state = self.inner.lock_state();
                    self.inner
                        .set_status(&mut state, GatewayStatus::error(port, failure.to_string()));
                }
                let reason = match failure {
                    GatewayError::SpawnFailure(reason) => reason,
                    other => other.to_string(),
                };
                self.inner
                    .system_log(LogLevel::Error, format!("Gateway failed to start: {reason}"));
                return self.status();
            }
        };

        self.attach_output(&mut child);

        let weak = Arc::downgrade(&self.inner);
        let handle = ProcessHandle::watch(child, pid, generation, move |exit| {
            if let Some(inner) = weak.upgrade() {
                inner.on_process_exit(generation, &exit);
            }
        });
        let exited = handle.wait_exit();

        {
            let mut state = self.inner.lock_state();
            state.handle = Some(handle);
            state.started_at = Some(Instant::now());
        }
        info!(port, pid, generation, "Gateway process spawned");

        tokio::select! {
            () = tokio::time::sleep(self.inner.settings.startup_grace()) => {}
            exit = exited => debug!(pid, %exit, "Gateway exited during startup grace"),
        }

        let promoted = {
            let mut state = self.inner.lock_state();
            let outcome = state
                .handle
                .as_ref()
                .filter(|h| h.generation() == generation)
                .map(ProcessHandle::exit);

            match outcome {
                Some(None) => {
                    self.inner
                        .set_status(&mut state, GatewayStatus::running(port, pid, 0));
                    true
                }
                Some(Some(exit)) => {
                    // The watcher may not have reported yet; settle now.
                    self.inner.apply_exit(&mut state, generation, &exit);
                    false
                }
                None => false,
            }
        };

        if promoted {
            info!(port, pid, "Gateway running");
            self.inner.push_log(LogRecord::new(
                LogLevel::Info,
                format!("Gateway started on ws://127.0.0.1:{port}"),
                LogSource::Gateway,
            ));
        }

        self.status()
    }

    async fn stop_locked(&self) -> GatewayStatus {
        let (handle, port) = {
            let mut state = self.inner.lock_state();
            (state.handle.take(), state.status.port())
        };

        let Some(handle) = handle else {
            let mut state = self.inner.lock_state();
            state.started_at = None;
            self.inner
                .set_status(&mut state, GatewayStatus::stopped(port));
            return state.snapshot();
        };

        info!(pid = handle.pid(), port, "Stopping gateway");
        self.inner.system_log(LogLevel::Info, "Stopping Gateway...");

        self.shutdown(&handle).await;

        {
            let mut state = self.inner.lock_state();
            state.generation += 1;
            state.started_at = None;
            self.inner
                .set_status(&mut state, GatewayStatus::stopped(port));
        }

        info!(port, "Gateway stopped");
        self.inner.system_log(LogLevel::Info, "Gateway stopped");
        self.status()
    }

    /// Terminate `handle` and wait for it to be reaped.
    ///
    /// Unix: SIGTERM, then SIGKILL after the stop timeout. Elsewhere: forced
    /// kill of the process tree straight away.
    async fn shutdown(&self, handle: &ProcessHandle) {
        let pid = handle.pid();
        let stop_timeout = self.inner.settings.stop_timeout();

        if SUPPORTS_GRACEFUL_STOP {
            handle.terminate();
            if let Ok(exit) = timeout(stop_timeout, handle.wait_exit()).await {
                debug!(pid, %exit, "Gateway exited after SIGTERM");
                return;
            }

            let failure = GatewayError::GracefulStopTimeout(stop_timeout);
            warn!(pid, "{failure}, sending SIGKILL");
            self.inner.system_log(LogLevel::Warn, failure.to_string());
        } else if let Err(e) = force_kill_pid(pid).await {
            warn!(pid, error = %e, "Failed to kill gateway process tree");
        }

        handle.kill();
        if timeout(REAP_TIMEOUT, handle.wait_exit()).await.is_err() {
            warn!(pid, "Gateway process was not reaped after kill");
        }
    }

    fn gateway_home(&self) -> Result<PathBuf, GatewayError> {
        match &self.inner.settings.home_dir {
            Some(dir) => Ok(dir.clone()),
            None => openclaw_home().map_err(|e| GatewayError::SpawnFailure(e.to_string())),
        }
    }

    fn spawn_gateway(&self, port: u16) -> Result<(Child, u32), GatewayError> {
        let settings = &self.inner.settings;
        let home = self.gateway_home()?;

        let mut cmd = Command::new(&settings.program);
        cmd.args(&settings.args)
            .arg("--port")
            .arg(port.to_string())
            .env(OPENCLAW_HOME_ENV, &home)
            .env("NODE_ENV", "production")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(windows)]
        {
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        debug!(
            program = %settings.program,
            args = ?settings.args,
            port,
            home = %home.display(),
            "Spawning gateway"
        );

        let child = cmd
            .spawn()
            .map_err(|e| GatewayError::SpawnFailure(e.to_string()))?;
        let pid = child.id().ok_or_else(|| {
            GatewayError::SpawnFailure("process exited before reporting a pid".to_string())
        })?;

        Ok((child, pid))
    }

    fn attach_output(&self, child: &mut Child) {
        let sink: Arc<dyn LogSink> = Arc::new(SupervisorSink {
            inner: Arc::downgrade(&self.inner),
        });

        if let Some(stdout) = child.stdout.take() {
            spawn_stream_reader(
                stdout,
                OutputStream::Stdout,
                self.inner.classifier,
                Arc::clone(&sink),
            );
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_stream_reader(stderr, OutputStream::Stderr, self.inner.classifier, sink);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openclaw_core::DEFAULT_GATEWAY_PORT;

    #[test]
    fn test_new_supervisor_is_stopped() {
        let supervisor = GatewaySupervisor::default();
        let status = supervisor.status();

        assert_eq!(status.state(), GatewayState::Stopped);
        assert_eq!(status.port(), DEFAULT_GATEWAY_PORT);
        assert_eq!(status.pid(), None);
        assert!(supervisor.recent_logs().is_empty());
    }

    #[tokio::test]
    async fn test_stop_without_process() {
        let supervisor = GatewaySupervisor::default();
        let mut events = supervisor.subscribe();

        let status = supervisor.stop().await;

        assert_eq!(status.state(), GatewayState::Stopped);
        assert_eq!(status.port(), DEFAULT_GATEWAY_PORT);
        assert!(supervisor.logs(50).is_empty());

        let event = events.try_recv().expect("status event");
        assert_eq!(event.as_status().map(GatewayStatus::state), Some(GatewayState::Stopped));
    }

    #[test]
    fn test_destroy_without_process_is_noop() {
        let supervisor = GatewaySupervisor::default();
        supervisor.destroy();
        assert_eq!(supervisor.status().state(), GatewayState::Stopped);
    }

    #[tokio::test]
    async fn test_missing_program_sets_error() {
        let home = std::env::temp_dir();
        let supervisor = GatewaySupervisor::new(SupervisorSettings {
            program: "openclaw-definitely-not-installed".to_string(),
            home_dir: Some(home),
            ..SupervisorSettings::default()
        });

        let status = supervisor.start(DEFAULT_GATEWAY_PORT).await;

        assert_eq!(status.state(), GatewayState::Error);
        assert_eq!(status.port(), DEFAULT_GATEWAY_PORT);
        let message = status.error_message().unwrap_or_default();
        assert!(message.starts_with("Failed to spawn gateway: "));

        let logs = supervisor.recent_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].level(), LogLevel::Error);
        assert_eq!(logs[0].source(), LogSource::System);

        // The record carries the OS reason, not the status text.
        let os_reason = message.trim_start_matches("Failed to spawn gateway: ");
        assert_eq!(logs[0].message(), format!("Gateway failed to start: {os_reason}"));
    }

    #[test]
    fn test_stale_generation_exit_is_ignored() {
        let supervisor = GatewaySupervisor::default();
        supervisor
            .inner
            .on_process_exit(7, &ProcessExit::Code(1));

        let status = supervisor.status();
        assert_eq!(status.state(), GatewayState::Stopped);
        assert_eq!(status.error_message(), None);

        let logs = supervisor.recent_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].message(), "Gateway process exited (code: 1)");
    }

    #[test]
    fn test_settings_accessor() {
        let supervisor = GatewaySupervisor::new(SupervisorSettings {
            startup_grace_ms: 10,
            ..SupervisorSettings::default()
        });
        assert_eq!(supervisor.settings().startup_grace(), Duration::from_millis(10));
    }
}
