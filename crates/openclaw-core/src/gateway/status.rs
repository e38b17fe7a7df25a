//! Gateway status snapshot.
//!
//! A `GatewayStatus` is an immutable point-in-time view of the supervisor.
//! Fields are private and each state has its own constructor, so a snapshot
//! can only carry a pid/uptime while running and an error message while in
//! the error state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Gateway lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayState {
    /// No process is running.
    Stopped,
    /// Process spawned, waiting for the startup grace period.
    Starting,
    /// Process survived the grace period.
    Running,
    /// Spawn failed or the process exited unexpectedly.
    Error,
}

impl GatewayState {
    /// True for the states an operation can settle in.
    pub const fn is_settled(self) -> bool {
        !matches!(self, Self::Starting)
    }
}

impl fmt::Display for GatewayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "stopped"),
            Self::Starting => write!(f, "starting"),
            Self::Running => write!(f, "running"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Point-in-time view of the supervised gateway.
///
/// Serialized as `{status, port, pid?, uptime?, error?}` for the UI bridge.
/// Deserializing goes through the same per-state rules as the constructors,
/// so a snapshot read off the wire cannot carry a pid while stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawStatus")]
pub struct GatewayStatus {
    #[serde(rename = "status")]
    state: GatewayState,
    port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pid: Option<u32>,
    /// Milliseconds since the process was spawned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    uptime: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Deserialize)]
struct RawStatus {
    status: GatewayState,
    port: u16,
    #[serde(default)]
    pid: Option<u32>,
    #[serde(default)]
    uptime: Option<u64>,
    #[serde(default)]
    error: Option<String>,
}

impl TryFrom<RawStatus> for GatewayStatus {
    type Error = String;

    fn try_from(raw: RawStatus) -> Result<Self, Self::Error> {
        let RawStatus {
            status,
            port,
            pid,
            uptime,
            error,
        } = raw;

        match (status, pid, uptime, error) {
            (GatewayState::Stopped, None, None, None) => Ok(Self::stopped(port)),
            (GatewayState::Starting, None, None, None) => Ok(Self::starting(port)),
            (GatewayState::Running, Some(pid), uptime, None) => {
                Ok(Self::running(port, pid, uptime.unwrap_or(0)))
            }
            (GatewayState::Error, None, None, Some(message)) => Ok(Self::error(port, message)),
            (state, ..) => Err(format!("inconsistent fields for a {state} gateway status")),
        }
    }
}

impl GatewayStatus {
    pub const fn stopped(port: u16) -> Self {
        Self {
            state: GatewayState::Stopped,
            port,
            pid: None,
            uptime: None,
            error: None,
        }
    }

    pub const fn starting(port: u16) -> Self {
        Self {
            state: GatewayState::Starting,
            port,
            pid: None,
            uptime: None,
            error: None,
        }
    }

    pub const fn running(port: u16, pid: u32, uptime_ms: u64) -> Self {
        Self {
            state: GatewayState::Running,
            port,
            pid: Some(pid),
            uptime: Some(uptime_ms),
            error: None,
        }
    }

    pub fn error(port: u16, message: impl Into<String>) -> Self {
        Self {
            state: GatewayState::Error,
            port,
            pid: None,
            uptime: None,
            error: Some(message.into()),
        }
    }

    pub const fn state(&self) -> GatewayState {
        self.state
    }

    pub const fn port(&self) -> u16 {
        self.port
    }

    pub const fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub const fn uptime_ms(&self) -> Option<u64> {
        self.uptime
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub const fn is_running(&self) -> bool {
        matches!(self.state, GatewayState::Running)
    }

    /// Copy of this snapshot with a refreshed uptime. No-op unless running.
    #[must_use]
    pub fn with_uptime(mut self, uptime_ms: u64) -> Self {
        if self.is_running() {
            self.uptime = Some(uptime_ms);
        }
        self
    }
}

impl fmt::Display for GatewayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.state, self.pid, self.error.as_deref()) {
            (GatewayState::Running, Some(pid), _) => {
                write!(f, "running on port {} (pid {pid})", self.port)
            }
            (GatewayState::Error, _, Some(message)) => {
                write!(f, "error on port {}: {message}", self.port)
            }
            (state, _, _) => write!(f, "{state} (port {})", self.port),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_carries_pid_and_uptime_only() {
        let status = GatewayStatus::running(18789, 4242, 10);
        assert_eq!(status.state(), GatewayState::Running);
        assert_eq!(status.pid(), Some(4242));
        assert_eq!(status.uptime_ms(), Some(10));
        assert_eq!(status.error_message(), None);
    }

    #[test]
    fn test_error_carries_message_only() {
        let status = GatewayStatus::error(18789, "boom");
        assert_eq!(status.state(), GatewayState::Error);
        assert_eq!(status.pid(), None);
        assert_eq!(status.uptime_ms(), None);
        assert_eq!(status.error_message(), Some("boom"));
    }

    #[test]
    fn test_with_uptime_ignored_when_not_running() {
        let status = GatewayStatus::stopped(18789).with_uptime(500);
        assert_eq!(status.uptime_ms(), None);

        let status = GatewayStatus::running(18789, 1, 0).with_uptime(500);
        assert_eq!(status.uptime_ms(), Some(500));
    }

    #[test]
    fn test_starting_is_not_settled() {
        assert!(!GatewayState::Starting.is_settled());
        assert!(GatewayState::Stopped.is_settled());
        assert!(GatewayState::Running.is_settled());
        assert!(GatewayState::Error.is_settled());
    }

    #[test]
    fn test_status_serialization_shape() {
        let json = serde_json::to_value(GatewayStatus::running(18789, 7, 1500)).unwrap();
        assert_eq!(json["status"], "running");
        assert_eq!(json["port"], 18789);
        assert_eq!(json["pid"], 7);
        assert_eq!(json["uptime"], 1500);
        assert!(json.get("error").is_none());

        let json = serde_json::to_value(GatewayStatus::stopped(18789)).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "stopped", "port": 18789 }));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            GatewayStatus::running(18789, 12, 0).to_string(),
            "running on port 18789 (pid 12)"
        );
        assert_eq!(
            GatewayStatus::error(1, "no such file").to_string(),
            "error on port 1: no such file"
        );
        assert_eq!(GatewayStatus::starting(2).to_string(), "starting (port 2)");
    }

    #[test]
    fn test_deserialize_valid_snapshots() {
        let running: GatewayStatus =
            serde_json::from_str(r#"{"status":"running","port":18789,"pid":42,"uptime":7}"#)
                .unwrap();
        assert_eq!(running, GatewayStatus::running(18789, 42, 7));

        let error: GatewayStatus =
            serde_json::from_str(r#"{"status":"error","port":18789,"error":"boom"}"#).unwrap();
        assert_eq!(error.error_message(), Some("boom"));
    }

    #[test]
    fn test_deserialize_rejects_inconsistent_fields() {
        let stopped_with_pid =
            serde_json::from_str::<GatewayStatus>(r#"{"status":"stopped","port":18789,"pid":5}"#);
        assert!(stopped_with_pid.is_err());

        let running_without_pid =
            serde_json::from_str::<GatewayStatus>(r#"{"status":"running","port":18789}"#);
        assert!(running_without_pid.is_err());

        let error_without_message =
            serde_json::from_str::<GatewayStatus>(r#"{"status":"error","port":18789}"#);
        assert!(error_without_message.is_err());
    }
}
