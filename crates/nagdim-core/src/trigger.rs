//! Wire model of a host profile trigger.
//!
//! ## JSON Model Design
//!
//! Trigger descriptors come back from the host's profile storage and are
//! written back whole. Fields beyond the ones we manage are preserved via
//! `#[serde(flatten)]` so a round-trip never drops host or user data.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Host action that recolors an entire matched output line.
pub const HIGHLIGHT_LINE_ACTION: &str = "iTermHighlightLineTrigger";

/// One trigger descriptor in a profile's ordered trigger list.
///
/// Reconciliation identity is the `regex` string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    /// Match pattern (required).
    pub regex: String,
    /// Host action identifier.
    #[serde(default)]
    pub action: String,
    /// Action parameter; for highlight actions, the color markup.
    #[serde(default)]
    pub parameter: String,
    /// Whether the trigger fires on partial (in-progress) lines.
    #[serde(default)]
    pub partial: bool,
    /// Whether the trigger is disabled.
    #[serde(default)]
    pub disabled: bool,
    /// Unrecognized fields, preserved across rewrites.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Trigger {
    /// A fresh self-owned highlight-line trigger: partial-match, enabled.
    #[must_use]
    pub fn highlight_line(pattern: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self {
            regex: pattern.into(),
            action: HIGHLIGHT_LINE_ACTION.to_string(),
            parameter: parameter.into(),
            partial: true,
            disabled: false,
            extra: HashMap::new(),
        }
    }

    /// Whether the trigger is active.
    #[must_use]
    pub fn enabled(&self) -> bool {
        !self.disabled
    }
}
