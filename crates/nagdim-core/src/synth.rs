//! Regex synthesis: null-safe match patterns, reflow-tolerant tail
//! fragments, per-group combined alternations, and the recognition set.
//!
//! The recognition set is the union of every pattern string any version of
//! this tool, under any configuration, could have installed. It exists so
//! install/remove can identify self-owned triggers in a profile without
//! disturbing user-authored ones, even across upgrades that changed the
//! generation scheme and config changes that narrowed the catalog.

use std::collections::{BTreeSet, HashSet};

use crate::error::{Error, Result};
use crate::registry::{DimmerGroup, Registry};

/// Minimum character length for a generated tail fragment.
pub const DEFAULT_MIN_TAIL_LEN: usize = 10;

/// Replace each space with a class matching a space or a NUL byte.
///
/// The assistant's TUI pads rendered lines with NUL bytes, so a trigger for
/// "Do it now" must also match "Do\x00it\x00now".
#[must_use]
pub fn null_safe(phrase: &str) -> String {
    phrase.replace(' ', "[\\x00 ]")
}

/// Generate reflow-tolerant tail fragments for a phrase list.
///
/// For every phrase of 3+ words, each word-suffix that keeps at least two
/// words (and is never the whole phrase) is a candidate; candidates shorter
/// than `min_len` characters are dropped. The result is deduplicated, has
/// any fragment equal to an original phrase removed, and is sorted so the
/// alternation order is deterministic across runs.
///
/// When the terminal reflows text on resize, a phrase like "no longer
/// wanted" can split so "longer wanted" lands on its own screen line with no
/// matching trigger. These tails cover those fragments.
#[must_use]
pub fn tail_fragments(phrases: &[String], min_len: usize) -> Vec<String> {
    let originals: HashSet<&str> = phrases.iter().map(String::as_str).collect();
    let mut tails = BTreeSet::new();

    for phrase in phrases {
        let words: Vec<&str> = phrase.split_whitespace().collect();
        if words.len() < 3 {
            continue;
        }
        for start in 1..words.len() - 1 {
            let tail = words[start..].join(" ");
            if tail.chars().count() >= min_len && !originals.contains(tail.as_str()) {
                tails.insert(tail);
            }
        }
    }

    tails.into_iter().collect()
}

/// Build one group's combined alternation: null-safe phrases, then null-safe
/// tail fragments, then raw regex patterns, joined with `|`.
#[must_use]
pub fn combined_pattern(group: &DimmerGroup, min_len: usize) -> String {
    let mut parts: Vec<String> = group.phrases.iter().map(|p| null_safe(p)).collect();
    parts.extend(
        tail_fragments(&group.phrases, min_len)
            .iter()
            .map(|t| null_safe(t)),
    );
    parts.extend(group.raw_patterns.iter().cloned());
    parts.join("|")
}

/// Historical pattern-generation schemes, oldest first.
///
/// Each generator is a pure function from the registry to the full set of
/// pattern strings that scheme could have installed. The recognition set is
/// the union over all of them plus the current scheme, so adding a future
/// legacy scheme here is all it takes to keep removal working after an
/// upgrade.
mod legacy {
    use super::{null_safe, tail_fragments};
    use crate::registry::Registry;

    /// v1: one trigger per pattern. Plain and null-safe variants of every
    /// phrase and tail fragment, plus the raw patterns.
    pub fn individual_patterns(registry: &Registry, min_len: usize) -> Vec<String> {
        let mut out = Vec::new();
        for group in registry.groups() {
            let tails = tail_fragments(&group.phrases, min_len);
            out.extend(group.phrases.iter().cloned());
            out.extend(tails.iter().cloned());
            out.extend(group.phrases.iter().map(|p| null_safe(p)));
            out.extend(tails.iter().map(|t| null_safe(t)));
            out.extend(group.raw_patterns.iter().cloned());
        }
        out
    }

    /// v2: a single fully-combined regex across all groups, phrases then
    /// tails per group in catalog order, raw patterns last.
    pub fn combined_all(registry: &Registry, min_len: usize) -> Vec<String> {
        let mut parts = Vec::new();
        for group in registry.groups() {
            parts.extend(group.phrases.iter().map(|p| null_safe(p)));
            parts.extend(
                tail_fragments(&group.phrases, min_len)
                    .iter()
                    .map(|t| null_safe(t)),
            );
        }
        for group in registry.groups() {
            parts.extend(group.raw_patterns.iter().cloned());
        }
        vec![parts.join("|")]
    }
}

/// Registered legacy generators, oldest first.
const LEGACY_GENERATORS: &[(&str, fn(&Registry, usize) -> Vec<String>)] = &[
    ("v1-individual", legacy::individual_patterns),
    ("v2-combined-all", legacy::combined_all),
];

/// One group's current combined pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
struct GroupPattern {
    name: String,
    pattern: String,
}

/// Derived pattern state for a registry: the current per-group combined
/// patterns plus the recognition set covering every historical scheme.
///
/// Built once at startup; read-only and safe to share across tasks.
#[derive(Debug, Clone)]
pub struct PatternSet {
    groups: Vec<GroupPattern>,
    recognition: HashSet<String>,
}

impl PatternSet {
    /// Synthesize patterns for `registry`.
    ///
    /// Every combined pattern is compiled once to catch a bad phrase or raw
    /// pattern at startup instead of installing a trigger the host cannot
    /// evaluate.
    pub fn build(registry: &Registry, min_tail_len: usize) -> Result<Self> {
        let mut groups = Vec::with_capacity(registry.groups().len());
        for group in registry.groups() {
            let pattern = combined_pattern(group, min_tail_len);
            regex::Regex::new(&pattern).map_err(|e| Error::InvalidPattern {
                group: group.name.clone(),
                source: Box::new(e),
            })?;
            groups.push(GroupPattern {
                name: group.name.clone(),
                pattern,
            });
        }

        // Cleanup must span whatever any configuration could have
        // installed, not just the active one: a changed tail length or a
        // disabled group must not orphan triggers installed under the old
        // settings. So recognition also covers the builtin catalog, at both
        // the configured and the default tail length.
        let mut recognition: HashSet<String> = HashSet::new();
        let builtin = Registry::builtin();
        for source in [registry, &builtin] {
            for len in [min_tail_len, DEFAULT_MIN_TAIL_LEN] {
                for (_, generator) in LEGACY_GENERATORS {
                    recognition.extend(generator(source, len));
                }
                for group in source.groups() {
                    recognition.insert(combined_pattern(group, len));
                }
            }
        }

        Ok(Self {
            groups,
            recognition,
        })
    }

    /// Build with the default minimum tail length.
    pub fn for_registry(registry: &Registry) -> Result<Self> {
        Self::build(registry, DEFAULT_MIN_TAIL_LEN)
    }

    /// Group names in catalog order.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }

    /// The current combined pattern for a group, if it exists.
    #[must_use]
    pub fn group_pattern(&self, name: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|g| g.name == name)
            .map(|g| g.pattern.as_str())
    }

    /// Whether `pattern` was produced by any scheme, ever (i.e. the trigger
    /// carrying it is ours).
    #[must_use]
    pub fn recognizes(&self, pattern: &str) -> bool {
        self.recognition.contains(pattern)
    }

    /// Whether `pattern` is one of the current per-group combined patterns.
    #[must_use]
    pub fn is_current_group_pattern(&self, pattern: &str) -> bool {
        self.groups.iter().any(|g| g.pattern == pattern)
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether the set has no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
