//! Watch mode: keep dim triggers current as sessions, profiles, and themes
//! change.
//!
//! The loop applies to all existing sessions, then reacts to host events
//! indefinitely. Per-event failures are logged and the loop continues; the
//! affected session gets retried naturally on its next event. Event-wait
//! failures are retried with capped backoff, so a bridge restart picks the
//! loop back up. Termination is by external interruption (Ctrl-C).

use std::time::Duration;

use tracing::{info, warn};

use crate::Result;
use crate::apply::{Scope, apply_all, apply_to_session};
use crate::host::{HostEvent, HostInterface};
use crate::synth::PatternSet;

/// Initial delay before re-polling events after a failure.
const EVENT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Backoff cap for repeated event-wait failures.
const EVENT_RETRY_MAX_DELAY: Duration = Duration::from_secs(60);

/// Run the watch loop. Applies to all sessions up front, then reapplies on
/// new-session, profile-change, and theme-change events. Never returns on
/// its own after startup; event-wait failures back off and retry so the
/// loop survives a bridge or host restart.
pub async fn watch(host: &dyn HostInterface, set: &PatternSet, factor: f64) -> Result<()> {
    let report = apply_all(host, set, factor, Scope::All).await?;
    info!(
        updated = report.updated,
        errors = report.errors(),
        "initial apply complete; watching for changes"
    );

    let mut retry_delay = EVENT_RETRY_DELAY;
    loop {
        let event = match host.next_event().await {
            Ok(event) => {
                retry_delay = EVENT_RETRY_DELAY;
                event
            }
            Err(error) => {
                warn!(%error, "event wait failed; retrying");
                tokio::time::sleep(retry_delay).await;
                retry_delay = (retry_delay * 2).min(EVENT_RETRY_MAX_DELAY);
                continue;
            }
        };

        handle_event(host, set, factor, &event).await;
    }
}

/// React to one host event. Failures are logged, never propagated: a single
/// session's failure must not kill the watch loop.
async fn handle_event(
    host: &dyn HostInterface,
    set: &PatternSet,
    factor: f64,
    event: &HostEvent,
) {
    match event {
        HostEvent::NewSession { session_id } => {
            match apply_to_session(host, set, factor, session_id, Scope::All).await {
                Ok(()) => info!(session = %session_id, "applied triggers to new session"),
                Err(error) => {
                    warn!(session = %session_id, %error, "failed to apply to new session");
                }
            }
        }
        HostEvent::ProfileChanged { session_id } => {
            // Colors may have changed; reapply to refresh the dim parameter.
            match apply_to_session(host, set, factor, session_id, Scope::All).await {
                Ok(()) => info!(session = %session_id, "reapplied after profile change"),
                Err(error) => {
                    warn!(session = %session_id, %error, "failed to reapply after profile change");
                }
            }
        }
        HostEvent::ThemeChanged => match apply_all(host, set, factor, Scope::All).await {
            Ok(report) => info!(
                updated = report.updated,
                errors = report.errors(),
                "reapplied after theme change"
            ),
            Err(error) => warn!(%error, "failed to reapply after theme change"),
        },
    }
}
