//! Configuration file loading.
//!
//! The config lives at `~/.config/nagdim/nagdim.toml` (or a path given on
//! the command line). Everything is optional; an absent file means pure
//! defaults.
//!
//! ```toml
//! dim_factor = 0.25
//! min_tail_len = 10
//! groups = ["taskmaster"]            # enabled subset; omit for all
//! bridge_timeout_secs = 30
//!
//! [[extra]]
//! name = "taskmaster"                # append to a builtin group
//! phrases = ["another nag phrase"]
//!
//! [[extra]]
//! name = "my-hook"                   # or define a new group
//! phrases = ["custom reminder text"]
//! raw_patterns = ['Saw \d+ warnings']
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::DIM_FACTOR;
use crate::error::{ConfigError, Result};
use crate::synth::DEFAULT_MIN_TAIL_LEN;

/// Phrases and raw patterns to merge into the registry, keyed by group name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupConfig {
    /// Group to extend, or a new group's name.
    pub name: String,
    /// Literal phrases to add.
    pub phrases: Vec<String>,
    /// Raw regex patterns to add.
    pub raw_patterns: Vec<String>,
}

/// Tool configuration, all fields defaulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How far from background toward foreground the dim color sits.
    pub dim_factor: f64,
    /// Minimum character length for generated tail fragments.
    pub min_tail_len: usize,
    /// Enabled group subset; empty means all groups.
    pub groups: Vec<String>,
    /// Timeout for bridge commands, in seconds.
    pub bridge_timeout_secs: u64,
    /// Registry additions.
    pub extra: Vec<GroupConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dim_factor: DIM_FACTOR,
            min_tail_len: DEFAULT_MIN_TAIL_LEN,
            groups: Vec::new(),
            bridge_timeout_secs: 30,
            extra: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist and parse. Without one, the default
    /// location is used if present, otherwise defaults are returned.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let resolved = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) if p.exists() => p,
                _ => return Ok(Self::default()),
            },
        };

        let text = std::fs::read_to_string(&resolved).map_err(|source| ConfigError::Io {
            path: resolved.display().to_string(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: resolved.display().to_string(),
            source: Box::new(source),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Range-check values that would silently misbehave downstream.
    pub fn validate(&self) -> Result<()> {
        if !self.dim_factor.is_finite() || !(0.0..=1.0).contains(&self.dim_factor) {
            return Err(ConfigError::Invalid(format!(
                "dim_factor must be within 0.0..=1.0, got {}",
                self.dim_factor
            ))
            .into());
        }
        if self.bridge_timeout_secs == 0 {
            return Err(ConfigError::Invalid("bridge_timeout_secs must be nonzero".into()).into());
        }
        Ok(())
    }
}

/// Default config file location under the user config dir.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("nagdim").join("nagdim.toml"))
}
