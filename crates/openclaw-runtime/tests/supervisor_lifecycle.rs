//! Integration tests for the `GatewaySupervisor` lifecycle.
//!
//! The gateway is stood in for by small `sh -c` scripts, so no OpenClaw
//! installation is needed. `sh -c <script> gateway --port N` makes the
//! appended `--port N` available to the script as `$1 $2`.
//!
//! # What is tested
//!
//! - Spawn failure, normal start/stop, idempotent start, restart
//! - Exit handling before and after promotion to `Running`
//! - Escalation to SIGKILL for a gateway that ignores SIGTERM
//! - Output capture, classification and environment injection
//! - Status event ordering and teardown with `destroy`
//! - Transitions completing after the caller's future is dropped

#![cfg(unix)]

use std::path::Path;
use std::time::Duration;

use openclaw_core::{
    DEFAULT_GATEWAY_PORT, GatewayState, GatewayStatus, LogLevel, LogSource, SupervisorSettings,
};
use openclaw_runtime::GatewaySupervisor;
use tempfile::TempDir;

// ── Helpers ────────────────────────────────────────────────────────

fn fake_gateway(script: &str, home: &Path) -> GatewaySupervisor {
    GatewaySupervisor::new(SupervisorSettings {
        program: "sh".to_string(),
        args: vec!["-c".to_string(), script.to_string(), "gateway".to_string()],
        startup_grace_ms: 200,
        stop_timeout_ms: 500,
        home_dir: Some(home.to_path_buf()),
        ..SupervisorSettings::default()
    })
}

fn home() -> TempDir {
    tempfile::tempdir().expect("failed to create temp home")
}

/// Poll `check` for up to five seconds.
async fn eventually(check: impl Fn() -> bool) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

fn has_log(supervisor: &GatewaySupervisor, message: &str) -> bool {
    supervisor
        .logs(500)
        .iter()
        .any(|record| record.message() == message)
}

// ── Start / stop ───────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_executable_reports_error() {
    let home = home();
    let supervisor = GatewaySupervisor::new(SupervisorSettings {
        program: "/nonexistent/openclaw".to_string(),
        home_dir: Some(home.path().to_path_buf()),
        ..SupervisorSettings::default()
    });

    let status = supervisor.start(DEFAULT_GATEWAY_PORT).await;
    assert_eq!(status.state(), GatewayState::Error);
    assert_eq!(status.port(), 18789);
    assert!(!status.error_message().unwrap_or_default().is_empty());

    let error_records: Vec<_> = supervisor
        .recent_logs()
        .into_iter()
        .filter(|r| r.level() == LogLevel::Error && r.source() == LogSource::System)
        .collect();
    assert_eq!(error_records.len(), 1);
    assert!(error_records[0].message().starts_with("Gateway failed to start: "));
    assert!(!error_records[0].message().contains("Failed to spawn gateway"));

    // Retrying is allowed and fails the same way.
    let status = supervisor.start(DEFAULT_GATEWAY_PORT).await;
    assert_eq!(status.state(), GatewayState::Error);
}

#[tokio::test]
async fn test_start_then_stop() {
    let home = home();
    let supervisor = fake_gateway("exec sleep 30", home.path());

    let status = supervisor.start(18790).await;
    assert_eq!(status.state(), GatewayState::Running);
    assert_eq!(status.port(), 18790);
    assert!(status.pid().is_some());
    assert!(status.uptime_ms().is_some());
    assert!(has_log(&supervisor, "Gateway started on ws://127.0.0.1:18790"));

    let status = supervisor.stop().await;
    assert_eq!(status.state(), GatewayState::Stopped);
    assert_eq!(status.port(), 18790);
    assert_eq!(status.pid(), None);
    assert_eq!(status.uptime_ms(), None);
    assert!(has_log(&supervisor, "Stopping Gateway..."));
    assert!(has_log(&supervisor, "Gateway stopped"));

    // Termination by SIGTERM during a stop is not an error.
    assert!(eventually(|| has_log(&supervisor, "Gateway process exited (signal: 15)")).await);
    assert_eq!(supervisor.status().state(), GatewayState::Stopped);
}

#[tokio::test]
async fn test_stop_when_nothing_runs() {
    let home = home();
    let supervisor = fake_gateway("exec sleep 30", home.path());

    let status = supervisor.stop().await;
    assert_eq!(status.state(), GatewayState::Stopped);
    assert_eq!(status.port(), DEFAULT_GATEWAY_PORT);
    assert!(supervisor.recent_logs().is_empty());
}

#[tokio::test]
async fn test_start_while_running_is_idempotent() {
    let home = home();
    let supervisor = fake_gateway("exec sleep 30", home.path());

    let first = supervisor.start(18791).await;
    let second = supervisor.start(18791).await;

    assert_eq!(second.state(), GatewayState::Running);
    assert_eq!(first.pid(), second.pid());

    supervisor.stop().await;
}

#[tokio::test]
async fn test_uptime_grows_while_running() {
    let home = home();
    let supervisor = fake_gateway("exec sleep 30", home.path());

    let first = supervisor.start(18792).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    let later = supervisor.status();

    assert!(later.uptime_ms().unwrap_or(0) >= first.uptime_ms().unwrap_or(0) + 100);

    supervisor.stop().await;
}

#[tokio::test]
async fn test_restart_spawns_new_process() {
    let home = home();
    let supervisor = fake_gateway("exec sleep 30", home.path());

    let before = supervisor.start(18793).await;
    let after = supervisor.restart(None).await;

    assert_eq!(after.state(), GatewayState::Running);
    assert_eq!(after.port(), 18793);
    assert_ne!(before.pid(), after.pid());
    assert!(has_log(&supervisor, "Restarting Gateway..."));

    let moved = supervisor.restart(Some(18794)).await;
    assert_eq!(moved.state(), GatewayState::Running);
    assert_eq!(moved.port(), 18794);

    // Port 0 keeps the current port.
    let kept = supervisor.restart(Some(0)).await;
    assert_eq!(kept.state(), GatewayState::Running);
    assert_eq!(kept.port(), 18794);

    supervisor.stop().await;
}

// ── Exit handling ──────────────────────────────────────────────────

#[tokio::test]
async fn test_crash_after_running_sets_error() {
    let home = home();
    let supervisor = fake_gateway("sleep 0.6; exit 3", home.path());

    let status = supervisor.start(18795).await;
    assert_eq!(status.state(), GatewayState::Running);

    assert!(eventually(|| supervisor.status().state() == GatewayState::Error).await);
    let status = supervisor.status();
    assert_eq!(status.error_message(), Some("Process exited with code 3"));
    assert_eq!(status.pid(), None);
    assert!(eventually(|| has_log(&supervisor, "Gateway process exited (code: 3)")).await);
}

#[tokio::test]
async fn test_crash_publishes_status_before_exit_record() {
    let home = home();
    let supervisor = fake_gateway("sleep 0.6; exit 3", home.path());
    let mut events = supervisor.subscribe();

    supervisor.start(18806).await;
    assert!(eventually(|| has_log(&supervisor, "Gateway process exited (code: 3)")).await);

    let mut error_at = None;
    let mut exit_record_at = None;
    let mut index = 0;
    while let Some(event) = events.try_recv() {
        if event
            .as_status()
            .is_some_and(|s| s.state() == GatewayState::Error)
        {
            error_at = Some(index);
        }
        if event
            .as_log()
            .is_some_and(|r| r.message() == "Gateway process exited (code: 3)")
        {
            exit_record_at = Some(index);
        }
        index += 1;
    }

    let error_at = error_at.expect("error status published");
    let exit_record_at = exit_record_at.expect("exit record published");
    assert!(error_at < exit_record_at);
}

#[tokio::test]
async fn test_clean_exit_during_grace_is_stopped() {
    let home = home();
    let supervisor = fake_gateway("exit 0", home.path());

    let status = supervisor.start(18796).await;
    assert_eq!(status.state(), GatewayState::Stopped);
    assert_eq!(status.error_message(), None);
    assert!(!has_log(&supervisor, "Gateway started on ws://127.0.0.1:18796"));
}

#[tokio::test]
async fn test_failed_exit_during_grace_is_stopped() {
    let home = home();
    let supervisor = fake_gateway("exit 5", home.path());

    let status = supervisor.start(18797).await;
    assert_eq!(status.state(), GatewayState::Stopped);
    assert_eq!(status.error_message(), None);
    assert!(eventually(|| has_log(&supervisor, "Gateway process exited (code: 5)")).await);
}

#[tokio::test]
async fn test_sigterm_ignored_escalates_to_kill() {
    let home = home();
    let supervisor = fake_gateway("trap '' TERM; exec sleep 30", home.path());

    let status = supervisor.start(18798).await;
    assert_eq!(status.state(), GatewayState::Running);

    let status = supervisor.stop().await;
    assert_eq!(status.state(), GatewayState::Stopped);

    let logs = supervisor.logs(500);
    assert!(
        logs.iter()
            .any(|r| r.level() == LogLevel::Warn && r.message().contains("did not exit within"))
    );
    assert!(eventually(|| has_log(&supervisor, "Gateway process exited (signal: 9)")).await);
}

// ── Cancelled callers ──────────────────────────────────────────────

#[tokio::test]
async fn test_cancelled_start_still_settles() {
    let home = home();
    let supervisor = fake_gateway("exec sleep 30", home.path());

    let cancelled = tokio::time::timeout(Duration::from_millis(50), supervisor.start(18807)).await;
    assert!(cancelled.is_err());

    // The grace period runs to completion without the caller.
    assert!(eventually(|| supervisor.status().state() == GatewayState::Running).await);
    assert!(has_log(&supervisor, "Gateway started on ws://127.0.0.1:18807"));

    supervisor.stop().await;
}

#[tokio::test]
async fn test_cancelled_stop_still_stops() {
    let home = home();
    let supervisor = fake_gateway("trap '' TERM; exec sleep 30", home.path());

    let status = supervisor.start(18808).await;
    assert_eq!(status.state(), GatewayState::Running);

    let cancelled = tokio::time::timeout(Duration::from_millis(1), supervisor.stop()).await;
    assert!(cancelled.is_err());

    assert!(eventually(|| has_log(&supervisor, "Gateway stopped")).await);
    let status = supervisor.status();
    assert_eq!(status.state(), GatewayState::Stopped);
    assert_eq!(status.pid(), None);
    assert_eq!(status.uptime_ms(), None);
}

// ── Output capture ─────────────────────────────────────────────────

#[tokio::test]
async fn test_output_is_classified() {
    let home = home();
    let supervisor = fake_gateway(
        "echo '[INFO] telegram bot connected'; echo 'plugin crashed' 1>&2; exec sleep 30",
        home.path(),
    );

    supervisor.start(18799).await;

    assert!(eventually(|| has_log(&supervisor, "plugin crashed")).await);
    let logs = supervisor.logs(500);

    let telegram = logs
        .iter()
        .find(|r| r.message() == "[INFO] telegram bot connected")
        .expect("stdout line captured");
    assert_eq!(telegram.level(), LogLevel::Info);
    assert_eq!(telegram.source(), LogSource::Telegram);

    let crashed = logs
        .iter()
        .find(|r| r.message() == "plugin crashed")
        .expect("stderr line captured");
    assert_eq!(crashed.level(), LogLevel::Error);
    assert_eq!(crashed.source(), LogSource::Gateway);

    supervisor.stop().await;
}

#[tokio::test]
async fn test_environment_is_injected() {
    let home = home();
    let supervisor = fake_gateway(
        "echo \"home=$OPENCLAW_HOME env=$NODE_ENV $1=$2\"; exec sleep 30",
        home.path(),
    );

    supervisor.start(18800).await;

    let expected = format!(
        "home={} env=production --port=18800",
        home.path().display()
    );
    assert!(eventually(|| has_log(&supervisor, &expected)).await);

    supervisor.stop().await;
}

#[tokio::test]
async fn test_log_limit_returns_newest() {
    let home = home();
    let supervisor = fake_gateway("echo one; echo two; echo three; exec sleep 30", home.path());

    supervisor.start(18801).await;
    assert!(eventually(|| has_log(&supervisor, "three")).await);
    supervisor.stop().await;

    let last = supervisor.logs(1);
    assert_eq!(last.len(), 1);
    assert_eq!(supervisor.logs(0).len(), 0);
}

// ── Events and teardown ────────────────────────────────────────────

#[tokio::test]
async fn test_status_events_in_order() {
    let home = home();
    let supervisor = fake_gateway("exec sleep 30", home.path());
    let mut events = supervisor.subscribe();

    supervisor.start(18802).await;
    supervisor.stop().await;

    let mut states = Vec::new();
    while let Some(event) = events.try_recv() {
        if let Some(status) = event.as_status() {
            states.push(status.state());
        }
    }

    assert_eq!(
        states,
        vec![
            GatewayState::Starting,
            GatewayState::Running,
            GatewayState::Stopped,
        ]
    );
}

#[tokio::test]
async fn test_log_events_are_published() {
    let home = home();
    let supervisor = fake_gateway("exec sleep 30", home.path());
    let mut events = supervisor.subscribe();

    supervisor.start(18803).await;

    let mut messages = Vec::new();
    while let Some(event) = events.try_recv() {
        if let Some(record) = event.as_log() {
            messages.push(record.message().to_string());
        }
    }
    assert!(messages.contains(&"Gateway started on ws://127.0.0.1:18803".to_string()));

    supervisor.stop().await;
}

#[tokio::test]
async fn test_destroy_kills_without_status_change() {
    let home = home();
    let supervisor = fake_gateway("exec sleep 30", home.path());

    let running = supervisor.start(18804).await;
    supervisor.destroy();

    // Status is left alone; the superseded exit is not applied.
    assert!(eventually(|| has_log(&supervisor, "Gateway process exited (signal: 9)")).await);
    assert_eq!(supervisor.status().state(), GatewayState::Running);

    // With the handle gone, a new start spawns a fresh process.
    let restarted = supervisor.start(18804).await;
    assert_eq!(restarted.state(), GatewayState::Running);
    assert_ne!(running.pid(), restarted.pid());

    supervisor.stop().await;
}

#[tokio::test]
async fn test_clones_share_state() {
    let home = home();
    let supervisor = fake_gateway("exec sleep 30", home.path());
    let clone = supervisor.clone();

    supervisor.start(18805).await;
    assert_eq!(clone.status().state(), GatewayState::Running);

    let stopped: GatewayStatus = clone.stop().await;
    assert_eq!(stopped.state(), GatewayState::Stopped);
    assert_eq!(supervisor.status().state(), GatewayState::Stopped);
}
