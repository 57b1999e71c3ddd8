//! Phrase registry: the catalog of nag phrases, organized into dimmer groups.
//!
//! The registry is built once at startup and is read-only afterwards. It is
//! passed explicitly into the synthesizer and reconciler, so tests can swap
//! in a small catalog without touching global state.

use crate::config::Config;

/// Phrases from the TASKMASTER stop hook, chosen to be short enough to
/// survive line-wrapping and specific enough to avoid false positives.
const TASKMASTER_PHRASES: &[&str] = &[
    "TASKMASTER",
    "Incomplete tasks or recent",
    "detected in the session",
    "Verify that all work",
    "complete before stopping",
    "Before stopping",
    "do each of these checks",
    "RE-READ THE ORIGINAL",
    "USER MESSAGE",
    "discrete request",
    "acceptance criterion",
    "confirm it is fully",
    "fully addressed",
    "FULLY done",
    "explicitly changed",
    "withdrew a request",
    "told you to stop",
    "treat that item",
    "as resolved",
    "NOT continue working",
    "CHECK THE TASK LIST",
    "Review every task",
    "marked completed",
    "Do it now",
    "user indicated",
    "no longer wanted",
    "CHECK THE PLAN",
    "Walk through each step",
    "skipped or partially",
    "deprioritized",
    "CHECK FOR ERRORS",
    "tool call, build",
    "lint fail",
    "Fix it",
    "CHECK FOR LOOSE ENDS",
    "TODO comments",
    "placeholder code",
    "missing tests",
    "not acted on",
    "IMPORTANT:",
    "latest instructions",
    "always take priority",
    "said to stop, move on",
    "respect that",
    "force completion",
    "no longer wants",
    "genuinely 100",
    "confirm completion",
    "immediately continue",
    "whatever remains",
    "do not just describe",
    "ACTUALLY DO IT",
    "working on it",
    "partially done",
    "Finish it",
    "user redirected",
];

const TASKMASTER_RAW_PATTERNS: &[&str] = &[r"Ran \d+ stop hook"];

/// Phrases from the claude-sessions discoveries hook.
const CLAUDE_SESSIONS_PHRASES: &[&str] = &[
    "Stop hook error",
    "Discoveries check",
    "Review existing entries",
    "disproven or superseded",
    "correct or remove them now",
    "new findings to add",
    "run_in_background to append",
    "just acknowledge and continue",
    "Archive has grown",
    "compact discoveries",
];

/// A named set of literal phrases plus raw regex patterns, independently
/// toggleable. Identity is the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimmerGroup {
    /// Group name (e.g. "taskmaster").
    pub name: String,
    /// Literal phrase fragments expected in the nag output.
    pub phrases: Vec<String>,
    /// Raw regex patterns appended to the combined alternation verbatim.
    pub raw_patterns: Vec<String>,
}

impl DimmerGroup {
    /// Create a group from string slices.
    pub fn new(name: &str, phrases: &[&str], raw_patterns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            phrases: phrases.iter().map(ToString::to_string).collect(),
            raw_patterns: raw_patterns.iter().map(ToString::to_string).collect(),
        }
    }
}

/// The immutable phrase catalog: an ordered list of dimmer groups.
///
/// Order matters for determinism (legacy recognition strings depend on group
/// iteration order), so groups are a `Vec`, not a map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    groups: Vec<DimmerGroup>,
}

impl Registry {
    /// The built-in catalog.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            groups: vec![
                DimmerGroup::new("taskmaster", TASKMASTER_PHRASES, TASKMASTER_RAW_PATTERNS),
                DimmerGroup::new("claude-sessions", CLAUDE_SESSIONS_PHRASES, &[]),
            ],
        }
    }

    /// Build a registry from an explicit group list (mainly for tests).
    #[must_use]
    pub fn from_groups(groups: Vec<DimmerGroup>) -> Self {
        Self { groups }
    }

    /// The built-in catalog merged with config additions.
    ///
    /// Config entries whose name matches an existing group append phrases and
    /// raw patterns to it; other entries become new groups. When the config
    /// names an enabled subset, groups outside it are dropped.
    #[must_use]
    pub fn with_config(config: &Config) -> Self {
        let mut registry = Self::builtin();

        for extra in &config.extra {
            if let Some(group) = registry
                .groups
                .iter_mut()
                .find(|g| g.name == extra.name)
            {
                group.phrases.extend(extra.phrases.iter().cloned());
                group.raw_patterns.extend(extra.raw_patterns.iter().cloned());
            } else {
                registry.groups.push(DimmerGroup {
                    name: extra.name.clone(),
                    phrases: extra.phrases.clone(),
                    raw_patterns: extra.raw_patterns.clone(),
                });
            }
        }

        if !config.groups.is_empty() {
            registry
                .groups
                .retain(|g| config.groups.iter().any(|name| name == &g.name));
        }

        registry
    }

    /// Groups in catalog order.
    pub fn groups(&self) -> &[DimmerGroup] {
        &self.groups
    }

    /// Look up a group by name.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&DimmerGroup> {
        self.groups.iter().find(|g| g.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GroupConfig;

    #[test]
    fn builtin_groups_present() {
        let registry = Registry::builtin();
        assert!(registry.group("taskmaster").is_some());
        assert!(registry.group("claude-sessions").is_some());
        assert_eq!(registry.groups().len(), 2);
    }

    #[test]
    fn builtin_group_names_unique() {
        let registry = Registry::builtin();
        let mut names: Vec<_> = registry.groups().iter().map(|g| &g.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), registry.groups().len());
    }

    #[test]
    fn taskmaster_carries_raw_pattern() {
        let registry = Registry::builtin();
        let group = registry.group("taskmaster").unwrap();
        assert_eq!(group.raw_patterns, vec![r"Ran \d+ stop hook".to_string()]);
    }

    #[test]
    fn config_appends_to_existing_group() {
        let mut config = Config::default();
        config.extra.push(GroupConfig {
            name: "taskmaster".to_string(),
            phrases: vec!["brand new phrase".to_string()],
            raw_patterns: vec![],
        });
        let registry = Registry::with_config(&config);
        let group = registry.group("taskmaster").unwrap();
        assert!(group.phrases.iter().any(|p| p == "brand new phrase"));
    }

    #[test]
    fn config_adds_new_group_and_filters_enabled() {
        let mut config = Config::default();
        config.extra.push(GroupConfig {
            name: "custom".to_string(),
            phrases: vec!["custom nag line".to_string()],
            raw_patterns: vec![],
        });
        config.groups = vec!["custom".to_string()];
        let registry = Registry::with_config(&config);
        assert_eq!(registry.groups().len(), 1);
        assert!(registry.group("custom").is_some());
        assert!(registry.group("taskmaster").is_none());
    }
}
