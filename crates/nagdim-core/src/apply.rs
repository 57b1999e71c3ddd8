//! Per-session apply/remove operations and batch reports.
//!
//! A single session's failure never aborts a batch: each session's outcome
//! is recorded in the report and the loop moves on. Watch mode retries
//! naturally on the next triggering event, so there is no retry policy here.

use tracing::{debug, warn};

use crate::Result;
use crate::color::dim_parameter;
use crate::host::{HostInterface, SessionId};
use crate::reconcile;
use crate::synth::PatternSet;

/// Which triggers an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope<'a> {
    /// Every dimmer group.
    All,
    /// One named group.
    Group(&'a str),
}

/// A session that failed during a batch operation, with the reason.
#[derive(Debug)]
pub struct SessionFailure {
    /// The session that failed.
    pub session: SessionId,
    /// Why it failed.
    pub error: crate::Error,
}

/// Outcome of a batch operation across sessions.
#[derive(Debug, Default)]
pub struct ApplyReport {
    /// Sessions updated successfully.
    pub updated: usize,
    /// Total triggers removed (remove operations only).
    pub removed: usize,
    /// Per-session failures.
    pub failures: Vec<SessionFailure>,
}

impl ApplyReport {
    /// Number of failed sessions.
    #[must_use]
    pub fn errors(&self) -> usize {
        self.failures.len()
    }
}

/// Install triggers into one session, replacing any stale self-owned ones.
///
/// Reads the profile, derives the dim color from its current colors, and
/// writes back the full replacement trigger list.
pub async fn apply_to_session(
    host: &dyn HostInterface,
    set: &PatternSet,
    factor: f64,
    session: &SessionId,
    scope: Scope<'_>,
) -> Result<()> {
    let profile = host.get_profile(session).await?;
    let dim_param = dim_parameter(profile.background_color, profile.foreground_color, factor);
    let triggers = match scope {
        Scope::All => reconcile::install_all(&profile.triggers, set, &dim_param),
        Scope::Group(name) => reconcile::install_group(&profile.triggers, set, name, &dim_param)?,
    };
    host.set_triggers(session, triggers).await?;
    debug!(session = %session, ?scope, "installed dim triggers");
    Ok(())
}

/// Remove self-owned triggers from one session. Returns how many were
/// dropped; skips the write when nothing changed.
pub async fn remove_from_session(
    host: &dyn HostInterface,
    set: &PatternSet,
    session: &SessionId,
    scope: Scope<'_>,
) -> Result<usize> {
    let profile = host.get_profile(session).await?;
    let (triggers, removed) = match scope {
        Scope::All => reconcile::remove_all(&profile.triggers, set),
        Scope::Group(name) => reconcile::remove_group(&profile.triggers, set, name)?,
    };
    if removed > 0 {
        host.set_triggers(session, triggers).await?;
    }
    debug!(session = %session, removed, "removed dim triggers");
    Ok(removed)
}

/// Whether a session currently has self-owned triggers installed.
pub async fn session_dimmed(
    host: &dyn HostInterface,
    set: &PatternSet,
    session: &SessionId,
    scope: Scope<'_>,
) -> Result<bool> {
    let profile = host.get_profile(session).await?;
    match scope {
        Scope::All => Ok(reconcile::any_installed(&profile.triggers, set)),
        Scope::Group(name) => reconcile::group_installed(&profile.triggers, set, name),
    }
}

/// Install triggers into every session. Per-session failures are logged,
/// counted, and do not stop the batch.
pub async fn apply_all(
    host: &dyn HostInterface,
    set: &PatternSet,
    factor: f64,
    scope: Scope<'_>,
) -> Result<ApplyReport> {
    let sessions = host.list_sessions().await?;
    let mut report = ApplyReport::default();
    for info in sessions {
        match apply_to_session(host, set, factor, &info.session_id, scope).await {
            Ok(()) => report.updated += 1,
            Err(error) => {
                warn!(session = %info.session_id, %error, "failed to apply triggers");
                report.failures.push(SessionFailure {
                    session: info.session_id,
                    error,
                });
            }
        }
    }
    Ok(report)
}

/// Remove triggers from every session. Per-session failures are logged,
/// counted, and do not stop the batch.
pub async fn remove_all_sessions(
    host: &dyn HostInterface,
    set: &PatternSet,
    scope: Scope<'_>,
) -> Result<ApplyReport> {
    let sessions = host.list_sessions().await?;
    let mut report = ApplyReport::default();
    for info in sessions {
        match remove_from_session(host, set, &info.session_id, scope).await {
            Ok(removed) => {
                report.updated += 1;
                report.removed += removed;
            }
            Err(error) => {
                warn!(session = %info.session_id, %error, "failed to remove triggers");
                report.failures.push(SessionFailure {
                    session: info.session_id,
                    error,
                });
            }
        }
    }
    Ok(report)
}

/// Inspect the current session's install state and flip it everywhere.
///
/// Returns the new state (`true` = dimming on) and the batch report. When
/// no session is focused, the first listed session decides; with no
/// sessions at all, toggling turns dimming on (a no-op batch).
pub async fn toggle_all(
    host: &dyn HostInterface,
    set: &PatternSet,
    factor: f64,
) -> Result<(bool, ApplyReport)> {
    let probe = match host.current_session().await? {
        Some(id) => Some(id),
        None => host
            .list_sessions()
            .await?
            .into_iter()
            .next()
            .map(|info| info.session_id),
    };

    let currently_on = match probe {
        Some(ref id) => session_dimmed(host, set, id, Scope::All).await?,
        None => false,
    };

    let report = if currently_on {
        remove_all_sessions(host, set, Scope::All).await?
    } else {
        apply_all(host, set, factor, Scope::All).await?
    };

    Ok((!currently_on, report))
}
