//! Profile reconciliation: pure transforms over a profile's trigger list.
//!
//! Every function here takes the current trigger list and returns the full
//! replacement list, because the host storage model takes whole-profile
//! writes. Self-owned triggers are identified through the recognition set,
//! so stale rules from any prior version are replaced while user-authored
//! triggers pass through untouched.

use crate::error::{Error, Result};
use crate::synth::PatternSet;
use crate::trigger::Trigger;

/// Install one group's trigger, replacing any stale self-owned triggers.
///
/// Other groups' current combined triggers are kept; everything else the
/// recognition set claims is dropped before the fresh trigger is appended.
/// Calling this twice in a row yields the same list (idempotent).
pub fn install_group(
    existing: &[Trigger],
    set: &PatternSet,
    group: &str,
    dim_param: &str,
) -> Result<Vec<Trigger>> {
    let pattern = set
        .group_pattern(group)
        .ok_or_else(|| Error::UnknownGroup(group.to_string()))?;

    let mut kept: Vec<Trigger> = existing
        .iter()
        .filter(|t| {
            !set.recognizes(&t.regex)
                || (set.is_current_group_pattern(&t.regex) && t.regex != pattern)
        })
        .cloned()
        .collect();
    kept.push(Trigger::highlight_line(pattern, dim_param));
    Ok(kept)
}

/// Install one trigger per group, replacing all self-owned triggers.
pub fn install_all(existing: &[Trigger], set: &PatternSet, dim_param: &str) -> Vec<Trigger> {
    let mut kept: Vec<Trigger> = existing
        .iter()
        .filter(|t| !set.recognizes(&t.regex))
        .cloned()
        .collect();
    for name in set.group_names() {
        if let Some(pattern) = set.group_pattern(name) {
            kept.push(Trigger::highlight_line(pattern, dim_param));
        }
    }
    kept
}

/// Remove one group's current trigger. Returns the new list and how many
/// triggers were dropped.
pub fn remove_group(
    existing: &[Trigger],
    set: &PatternSet,
    group: &str,
) -> Result<(Vec<Trigger>, usize)> {
    let pattern = set
        .group_pattern(group)
        .ok_or_else(|| Error::UnknownGroup(group.to_string()))?;
    let kept: Vec<Trigger> = existing
        .iter()
        .filter(|t| t.regex != pattern)
        .cloned()
        .collect();
    let removed = existing.len() - kept.len();
    Ok((kept, removed))
}

/// Remove every self-owned trigger from any version. Returns the new list
/// and how many triggers were dropped.
pub fn remove_all(existing: &[Trigger], set: &PatternSet) -> (Vec<Trigger>, usize) {
    let kept: Vec<Trigger> = existing
        .iter()
        .filter(|t| !set.recognizes(&t.regex))
        .cloned()
        .collect();
    let removed = existing.len() - kept.len();
    (kept, removed)
}

/// Whether a specific group's current trigger is installed.
pub fn group_installed(existing: &[Trigger], set: &PatternSet, group: &str) -> Result<bool> {
    let pattern = set
        .group_pattern(group)
        .ok_or_else(|| Error::UnknownGroup(group.to_string()))?;
    Ok(existing.iter().any(|t| t.regex == pattern))
}

/// Whether any self-owned trigger (from any version) is installed.
#[must_use]
pub fn any_installed(existing: &[Trigger], set: &PatternSet) -> bool {
    existing.iter().any(|t| set.recognizes(&t.regex))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{DimmerGroup, Registry};
    use crate::synth::{PatternSet, null_safe};
    use crate::trigger::HIGHLIGHT_LINE_ACTION;
    use proptest::prelude::*;

    fn test_set() -> PatternSet {
        let registry = Registry::from_groups(vec![
            DimmerGroup::new(
                "taskmaster",
                &["no longer wanted", "Do it now"],
                &[r"Ran \d+ stop hook"],
            ),
            DimmerGroup::new("claude-sessions", &["Stop hook error"], &[]),
        ]);
        PatternSet::for_registry(&registry).unwrap()
    }

    fn user_trigger(pattern: &str) -> Trigger {
        Trigger {
            regex: pattern.to_string(),
            action: "BellTrigger".to_string(),
            parameter: String::new(),
            partial: false,
            disabled: false,
            extra: std::collections::HashMap::new(),
        }
    }

    #[test]
    fn install_into_empty_profile() {
        let set = test_set();
        let rules = install_group(&[], &set, "taskmaster", "{#404040,}").unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].regex, set.group_pattern("taskmaster").unwrap());
        assert_eq!(rules[0].action, HIGHLIGHT_LINE_ACTION);
        assert_eq!(rules[0].parameter, "{#404040,}");
        assert!(rules[0].partial);
        assert!(rules[0].enabled());
        assert!(group_installed(&rules, &set, "taskmaster").unwrap());
    }

    #[test]
    fn install_all_into_empty_profile() {
        let set = test_set();
        let rules = install_all(&[], &set, "{#404040,}");
        assert_eq!(rules.len(), 2);
        assert!(rules.iter().all(|t| t.partial && t.enabled()));
        assert!(rules.iter().all(|t| t.parameter == "{#404040,}"));
        assert!(any_installed(&rules, &set));
    }

    #[test]
    fn install_is_idempotent() {
        let set = test_set();
        let existing = vec![user_trigger("foo")];
        let once = install_group(&existing, &set, "taskmaster", "{#404040,}").unwrap();
        let twice = install_group(&once, &set, "taskmaster", "{#404040,}").unwrap();
        assert_eq!(once, twice);

        let once_all = install_all(&existing, &set, "{#404040,}");
        let twice_all = install_all(&once_all, &set, "{#404040,}");
        assert_eq!(once_all, twice_all);
    }

    #[test]
    fn install_replaces_stale_legacy_triggers_and_keeps_user_rules() {
        let set = test_set();
        // A user rule plus stale self-owned rules from the per-phrase era.
        let existing = vec![
            user_trigger("foo"),
            Trigger::highlight_line(null_safe("no longer wanted"), "{#111111,}"),
            Trigger::highlight_line("longer wanted", "{#111111,}"),
            Trigger::highlight_line(r"Ran \d+ stop hook", "{#111111,}"),
        ];
        let rules = install_all(&existing, &set, "{#404040,}");

        assert!(rules.iter().any(|t| t.regex == "foo"));
        assert!(!rules.iter().any(|t| t.parameter == "{#111111,}"));
        // Exactly one fresh trigger per group.
        for group in ["taskmaster", "claude-sessions"] {
            let pattern = set.group_pattern(group).unwrap();
            assert_eq!(rules.iter().filter(|t| t.regex == pattern).count(), 1);
        }
        assert_eq!(rules.len(), 3);
    }

    #[test]
    fn install_group_keeps_other_groups_current_trigger() {
        let set = test_set();
        let with_sessions =
            install_group(&[], &set, "claude-sessions", "{#222222,}").unwrap();
        let with_both =
            install_group(&with_sessions, &set, "taskmaster", "{#404040,}").unwrap();
        assert!(group_installed(&with_both, &set, "claude-sessions").unwrap());
        assert!(group_installed(&with_both, &set, "taskmaster").unwrap());
        assert_eq!(with_both.len(), 2);
    }

    #[test]
    fn reinstall_refreshes_color() {
        let set = test_set();
        let old = install_group(&[], &set, "taskmaster", "{#111111,}").unwrap();
        let new = install_group(&old, &set, "taskmaster", "{#404040,}").unwrap();
        assert_eq!(new.len(), 1);
        assert_eq!(new[0].parameter, "{#404040,}");
    }

    #[test]
    fn remove_round_trip_leaves_only_user_rules() {
        let set = test_set();
        let existing = vec![user_trigger("foo"), user_trigger("bar")];
        let installed = install_all(&existing, &set, "{#404040,}");
        let (after, removed) = remove_all(&installed, &set);
        assert_eq!(removed, 2);
        assert_eq!(after, existing);
        assert!(!any_installed(&after, &set));
    }

    #[test]
    fn remove_group_only_touches_that_group() {
        let set = test_set();
        let installed = install_all(&[user_trigger("foo")], &set, "{#404040,}");
        let (after, removed) = remove_group(&installed, &set, "taskmaster").unwrap();
        assert_eq!(removed, 1);
        assert!(!group_installed(&after, &set, "taskmaster").unwrap());
        assert!(group_installed(&after, &set, "claude-sessions").unwrap());
        assert!(after.iter().any(|t| t.regex == "foo"));
    }

    #[test]
    fn remove_cleans_up_legacy_triggers() {
        let set = test_set();
        let existing = vec![
            user_trigger("foo"),
            Trigger::highlight_line("no longer wanted", "{#111111,}"),
            Trigger::highlight_line(null_safe("Do it now"), "{#111111,}"),
        ];
        let (after, removed) = remove_all(&existing, &set);
        assert_eq!(removed, 2);
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].regex, "foo");
    }

    #[test]
    fn remove_cleans_triggers_installed_under_default_tail_length() {
        let default_set = PatternSet::for_registry(&Registry::builtin()).unwrap();
        let installed = install_all(&[], &default_set, "{#404040,}");

        // min_tail_len raised in config after installation.
        let reconfigured = PatternSet::build(&Registry::builtin(), 12).unwrap();
        let (after, removed) = remove_all(&installed, &reconfigured);
        assert_eq!(removed, installed.len());
        assert!(after.is_empty());
    }

    #[test]
    fn remove_cleans_triggers_from_groups_no_longer_enabled() {
        let default_set = PatternSet::for_registry(&Registry::builtin()).unwrap();
        let installed = install_all(&[], &default_set, "{#404040,}");

        // Config later restricts the enabled groups to taskmaster only; the
        // claude-sessions trigger must still be cleaned up.
        let taskmaster_only = Registry::from_groups(vec![
            Registry::builtin().group("taskmaster").unwrap().clone(),
        ]);
        let set = PatternSet::for_registry(&taskmaster_only).unwrap();
        let (after, removed) = remove_all(&installed, &set);
        assert_eq!(removed, installed.len());
        assert!(after.is_empty());
    }

    #[test]
    fn unknown_group_is_an_error() {
        let set = test_set();
        assert!(matches!(
            install_group(&[], &set, "nope", "{#404040,}"),
            Err(Error::UnknownGroup(_))
        ));
        assert!(matches!(
            remove_group(&[], &set, "nope"),
            Err(Error::UnknownGroup(_))
        ));
        assert!(matches!(
            group_installed(&[], &set, "nope"),
            Err(Error::UnknownGroup(_))
        ));
    }

    proptest! {
        /// For any user-authored trigger list, install is idempotent and
        /// remove(install(x)) preserves exactly the user triggers.
        #[test]
        fn install_remove_preserves_user_triggers(
            patterns in proptest::collection::vec("[a-zA-Z0-9 ]{1,20}", 0..8)
        ) {
            let set = test_set();
            let existing: Vec<Trigger> = patterns
                .iter()
                // A random literal could collide with a recognized phrase;
                // those are fair game for replacement, so skip them.
                .filter(|p| !set.recognizes(p))
                .map(|p| user_trigger(p))
                .collect();

            let once = install_all(&existing, &set, "{#404040,}");
            let twice = install_all(&once, &set, "{#404040,}");
            prop_assert_eq!(&once, &twice);
            prop_assert!(any_installed(&once, &set));

            let (after, removed) = remove_all(&once, &set);
            prop_assert_eq!(removed, set.len());
            prop_assert_eq!(after, existing);
        }
    }
}
