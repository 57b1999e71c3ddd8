//! Error types for nagdim-core.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Host bridge failures (subprocess, parse, session lookup).
    #[error(transparent)]
    Host(#[from] HostError),

    /// Configuration loading failures.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A synthesized pattern failed to compile as a regex.
    #[error("invalid synthesized pattern for group '{group}': {source}")]
    InvalidPattern {
        /// Dimmer group whose combined pattern failed validation.
        group: String,
        /// Underlying regex compilation error.
        #[source]
        source: Box<regex::Error>,
    },

    /// A named dimmer group does not exist in the registry.
    #[error("unknown dimmer group '{0}'")]
    UnknownGroup(String),
}

/// Errors from the host bridge subprocess.
///
/// Stable variants so callers can distinguish "bridge missing" from
/// "host not running" from "this one session is gone".
#[derive(Debug, Error)]
pub enum HostError {
    /// Bridge binary not found in PATH.
    #[error("host bridge binary not found in PATH (set NAGDIM_BRIDGE to override)")]
    BridgeNotFound,

    /// The terminal host is not running or unreachable.
    #[error("terminal host is not running")]
    NotRunning,

    /// The requested session does not exist (it may have closed).
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// The bridge command exited nonzero.
    #[error("bridge command failed: {0}")]
    CommandFailed(String),

    /// Bridge output could not be parsed.
    #[error("failed to parse bridge output: {0}")]
    ParseError(String),

    /// The bridge command did not complete in time.
    #[error("bridge command timed out after {0}s")]
    Timeout(u64),
}

impl HostError {
    /// Whether a retry of a safe (read-only) operation might succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NotRunning | Self::Timeout(_) | Self::CommandFailed(_)
        )
    }
}

/// Errors while loading or validating the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for our schema.
    #[error("failed to parse config {path}: {source}")]
    Parse {
        /// Path that failed to parse.
        path: String,
        /// Underlying TOML error.
        #[source]
        source: Box<toml::de::Error>,
    },

    /// A config value is out of range.
    #[error("invalid config value: {0}")]
    Invalid(String),
}
