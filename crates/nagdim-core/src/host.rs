//! Host bridge client.
//!
//! The terminal host owns session enumeration, profile storage, and event
//! monitors; we reach its scripting interface through a bridge executable
//! speaking JSON on stdout. This module wraps that subprocess with a
//! type-safe async interface: timeouts, bounded retries for safe reads, and
//! categorized error variants.
//!
//! ## JSON Model Design
//!
//! Bridge output can vary between host versions. We design for robustness:
//! - All non-ID fields are optional with sane defaults
//! - Unknown fields are preserved via `#[serde(flatten)]` with `Value`
//! - Malformed colors degrade to `None` instead of failing the parse

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::AsyncWriteExt;

use crate::Result;
use crate::color::{Rgb, lenient_color};
use crate::error::HostError;
use crate::trigger::Trigger;

/// Boxed future for host interface operations.
pub type HostFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Shared handle to a host interface implementation.
pub type HostHandle = Arc<dyn HostInterface>;

/// Abstraction layer over the host's automation API.
///
/// This allows swapping the real bridge client with mock implementations
/// for tests without changing call sites.
pub trait HostInterface: Send + Sync {
    /// List all sessions across all windows and tabs.
    fn list_sessions(&self) -> HostFuture<'_, Vec<SessionInfo>>;
    /// The currently focused session, if any.
    fn current_session(&self) -> HostFuture<'_, Option<SessionId>>;
    /// Read a session's profile (triggers and colors).
    fn get_profile(&self, session: &SessionId) -> HostFuture<'_, Profile>;
    /// Replace a session's trigger list (whole-profile write).
    fn set_triggers(&self, session: &SessionId, triggers: Vec<Trigger>) -> HostFuture<'_, ()>;
    /// Block until the next host event.
    fn next_event(&self) -> HostFuture<'_, HostEvent>;
}

/// Create a default host handle backed by the bridge subprocess.
#[must_use]
pub fn default_host_handle() -> HostHandle {
    Arc::new(BridgeClient::new())
}

/// Opaque host session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One session from `list-sessions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Session ID (required).
    pub session_id: SessionId,
    /// Window containing this session.
    #[serde(default)]
    pub window_id: Option<u64>,
    /// Tab containing this session.
    #[serde(default)]
    pub tab_id: Option<u64>,
    /// Session title, if the host reports one.
    #[serde(default)]
    pub title: Option<String>,
    /// Whether this is the focused session.
    #[serde(default)]
    pub is_active: bool,
    /// Unrecognized fields (forward compatibility).
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// A session profile as reported by `get-profile`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    /// Profile name, if reported.
    #[serde(default)]
    pub name: Option<String>,
    /// Ordered trigger list.
    #[serde(default)]
    pub triggers: Vec<Trigger>,
    /// Background color; `None` when absent or malformed.
    #[serde(default, deserialize_with = "lenient_color")]
    pub background_color: Option<Rgb>,
    /// Foreground color; `None` when absent or malformed.
    #[serde(default, deserialize_with = "lenient_color")]
    pub foreground_color: Option<Rgb>,
    /// Unrecognized fields (forward compatibility).
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Events surfaced by the bridge's `wait-event` subcommand, mapping the
/// host's new-session monitor and session/app variable monitors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum HostEvent {
    /// A new session was created.
    NewSession {
        /// The new session.
        session_id: SessionId,
    },
    /// A session's profile changed (colors may differ now).
    ProfileChanged {
        /// The affected session.
        session_id: SessionId,
    },
    /// The OS theme changed (dark/light); all colors may differ now.
    ThemeChanged,
}

/// Default bridge command timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Default retry attempts for safe (read-only) operations.
const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
/// Default delay between retries (ms).
const DEFAULT_RETRY_DELAY_MS: u64 = 200;
/// Environment variable to override the bridge binary path.
const BRIDGE_ENV: &str = "NAGDIM_BRIDGE";
/// Default bridge binary name.
const DEFAULT_BRIDGE: &str = "nagdim-bridge";

/// Resolve the bridge binary path, respecting `NAGDIM_BRIDGE`.
fn bridge_binary() -> String {
    std::env::var(BRIDGE_ENV).unwrap_or_else(|_| DEFAULT_BRIDGE.to_string())
}

/// Subprocess client for the host bridge.
///
/// # Error Handling
///
/// Stable error variants help callers distinguish failure modes:
/// - `BridgeNotFound`: bridge binary not in PATH
/// - `NotRunning`: the terminal host is not reachable
/// - `SessionNotFound`: the session closed under us
/// - `Timeout`: command took too long
#[derive(Debug, Clone)]
pub struct BridgeClient {
    /// Explicit bridge binary override (takes precedence over the env var).
    bridge_path: Option<String>,
    /// Command timeout in seconds.
    timeout_secs: u64,
    /// Retry attempts for safe operations.
    retry_attempts: u32,
    /// Delay between retries in milliseconds.
    retry_delay_ms: u64,
}

impl Default for BridgeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl BridgeClient {
    /// Create a client with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bridge_path: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }

    /// Use a specific bridge binary instead of `NAGDIM_BRIDGE`/PATH lookup.
    #[must_use]
    pub fn with_bridge_path(mut self, path: impl Into<String>) -> Self {
        self.bridge_path = Some(path.into());
        self
    }

    /// Set the command timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set retry attempts for safe operations.
    #[must_use]
    pub fn with_retries(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts.max(1);
        self
    }

    /// Set retry delay in milliseconds.
    #[must_use]
    pub fn with_retry_delay_ms(mut self, delay_ms: u64) -> Self {
        self.retry_delay_ms = delay_ms;
        self
    }

    /// List all sessions.
    pub async fn list_sessions(&self) -> Result<Vec<SessionInfo>> {
        let output = self
            .run_with_retry(&["list-sessions", "--format", "json"])
            .await?;
        let sessions: Vec<SessionInfo> = serde_json::from_str(&output)
            .map_err(|e| HostError::ParseError(e.to_string()))?;
        Ok(sessions)
    }

    /// The currently focused session, if any.
    pub async fn current_session(&self) -> Result<Option<SessionId>> {
        let output = self.run_with_retry(&["current-session"]).await?;
        let id = output.trim();
        if id.is_empty() {
            Ok(None)
        } else {
            Ok(Some(SessionId(id.to_string())))
        }
    }

    /// Read a session's profile.
    pub async fn get_profile(&self, session: &SessionId) -> Result<Profile> {
        let output = self
            .run_session_checked(&["get-profile", "--session", &session.0], session)
            .await?;
        let profile: Profile =
            serde_json::from_str(&output).map_err(|e| HostError::ParseError(e.to_string()))?;
        Ok(profile)
    }

    /// Replace a session's trigger list. Not retried: a write that already
    /// landed must not be repeated blindly.
    pub async fn set_triggers(&self, session: &SessionId, triggers: &[Trigger]) -> Result<()> {
        let payload = serde_json::to_string(triggers)
            .map_err(|e| HostError::ParseError(e.to_string()))?;
        self.run_bridge(
            &["set-triggers", "--session", &session.0],
            Some(&payload),
            Some(Duration::from_secs(self.timeout_secs)),
        )
        .await
        .map_err(|e| Self::map_session_error(e, session))?;
        Ok(())
    }

    /// Block until the next host event. No timeout: the host may be idle
    /// for a long time between events.
    pub async fn next_event(&self) -> Result<HostEvent> {
        let output = self.run_bridge(&["wait-event"], None, None).await?;
        let event: HostEvent =
            serde_json::from_str(output.trim()).map_err(|e| HostError::ParseError(e.to_string()))?;
        Ok(event)
    }

    async fn run_session_checked(&self, args: &[&str], session: &SessionId) -> Result<String> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self
                .run_bridge(args, None, Some(Duration::from_secs(self.timeout_secs)))
                .await
            {
                Ok(output) => return Ok(output),
                Err(err) => {
                    let err = Self::map_session_error(err, session);
                    if attempt >= self.retry_attempts || !is_retryable(&err) {
                        return Err(err);
                    }
                    tokio::time::sleep(Duration::from_millis(self.retry_delay_ms)).await;
                }
            }
        }
    }

    async fn run_with_retry(&self, args: &[&str]) -> Result<String> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self
                .run_bridge(args, None, Some(Duration::from_secs(self.timeout_secs)))
                .await
            {
                Ok(output) => return Ok(output),
                Err(err) => {
                    if attempt >= self.retry_attempts || !is_retryable(&err) {
                        return Err(err);
                    }
                    tokio::time::sleep(Duration::from_millis(self.retry_delay_ms)).await;
                }
            }
        }
    }

    /// Run a bridge command, optionally feeding `stdin` and bounding by
    /// `timeout`.
    async fn run_bridge(
        &self,
        args: &[&str],
        stdin: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<String> {
        use tokio::process::Command;

        let binary = self
            .bridge_path
            .clone()
            .unwrap_or_else(bridge_binary);
        let mut cmd = Command::new(binary);
        cmd.args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            });

        let mut child = cmd.spawn().map_err(|e| categorize_io_error(&e))?;

        if let Some(payload) = stdin {
            if let Some(mut pipe) = child.stdin.take() {
                pipe.write_all(payload.as_bytes())
                    .await
                    .map_err(|e| HostError::CommandFailed(e.to_string()))?;
                // Close stdin so the bridge sees EOF.
                drop(pipe);
            }
        }

        let output = match timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(result) => result.map_err(|e| categorize_io_error(&e))?,
                Err(_) => return Err(HostError::Timeout(self.timeout_secs).into()),
            },
            None => child
                .wait_with_output()
                .await
                .map_err(|e| categorize_io_error(&e))?,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            if stderr.contains("Connection refused")
                || stderr.contains("not running")
                || stderr.contains("could not connect")
            {
                return Err(HostError::NotRunning.into());
            }
            return Err(HostError::CommandFailed(stderr).into());
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Re-categorize a command failure as `SessionNotFound` when the stderr
    /// points at a missing session.
    fn map_session_error(err: crate::Error, session: &SessionId) -> crate::Error {
        match err {
            crate::Error::Host(HostError::CommandFailed(ref stderr))
                if stderr.contains("session")
                    && (stderr.contains("not found")
                        || stderr.contains("does not exist")
                        || stderr.contains("no such")) =>
            {
                HostError::SessionNotFound(session.0.clone()).into()
            }
            other => other,
        }
    }
}

/// Categorize I/O errors into specific host error variants.
fn categorize_io_error(e: &std::io::Error) -> HostError {
    match e.kind() {
        std::io::ErrorKind::NotFound => HostError::BridgeNotFound,
        std::io::ErrorKind::PermissionDenied => {
            HostError::CommandFailed("Permission denied".to_string())
        }
        _ => HostError::CommandFailed(e.to_string()),
    }
}

fn is_retryable(err: &crate::Error) -> bool {
    match err {
        crate::Error::Host(host) => host.is_retryable(),
        _ => false,
    }
}

impl HostInterface for BridgeClient {
    fn list_sessions(&self) -> HostFuture<'_, Vec<SessionInfo>> {
        Box::pin(self.list_sessions())
    }

    fn current_session(&self) -> HostFuture<'_, Option<SessionId>> {
        Box::pin(self.current_session())
    }

    fn get_profile(&self, session: &SessionId) -> HostFuture<'_, Profile> {
        let session = session.clone();
        Box::pin(async move { BridgeClient::get_profile(self, &session).await })
    }

    fn set_triggers(&self, session: &SessionId, triggers: Vec<Trigger>) -> HostFuture<'_, ()> {
        let session = session.clone();
        Box::pin(async move { BridgeClient::set_triggers(self, &session, &triggers).await })
    }

    fn next_event(&self) -> HostFuture<'_, HostEvent> {
        Box::pin(self.next_event())
    }
}
