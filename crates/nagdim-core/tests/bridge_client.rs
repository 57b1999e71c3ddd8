//! BridgeClient tests against a fake bridge script.
//!
//! The fake is a shell script that answers the bridge subcommands with
//! canned JSON and records `set-triggers` payloads to a file, so the client
//! side of the contract can be tested without a terminal host.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use nagdim_core::HostError;
use nagdim_core::host::{BridgeClient, HostEvent, SessionId};
use nagdim_core::trigger::Trigger;

fn write_fake_bridge(dir: &Path) -> String {
    let written = dir.join("written.json");
    let script = dir.join("fake-bridge");
    fs::write(
        &script,
        format!(
            r#"#!/bin/sh
case "$1" in
  list-sessions)
    echo '[{{"session_id":"s1","window_id":0,"tab_id":0,"is_active":true}}]'
    ;;
  current-session)
    echo 's1'
    ;;
  get-profile)
    echo '{{"name":"Default","triggers":[{{"regex":"foo"}}],"background_color":{{"red":0,"green":0,"blue":0}},"foreground_color":{{"red":255,"green":255,"blue":255}}}}'
    ;;
  set-triggers)
    cat > '{written}'
    ;;
  wait-event)
    echo '{{"kind":"theme-changed"}}'
    ;;
  *)
    echo "unknown command: $1" >&2
    exit 1
    ;;
esac
"#,
            written = written.display()
        ),
    )
    .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    script.display().to_string()
}

#[tokio::test]
async fn bridge_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let client = BridgeClient::new().with_bridge_path(write_fake_bridge(dir.path()));

    let sessions = client.list_sessions().await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].session_id, SessionId::from("s1"));
    assert!(sessions[0].is_active);

    let current = client.current_session().await.unwrap();
    assert_eq!(current, Some(SessionId::from("s1")));

    let profile = client.get_profile(&SessionId::from("s1")).await.unwrap();
    assert_eq!(profile.triggers.len(), 1);
    assert!(profile.background_color.is_some());
    assert!(profile.foreground_color.is_some());

    let triggers = vec![Trigger::highlight_line("bar", "{#404040,}")];
    client
        .set_triggers(&SessionId::from("s1"), &triggers)
        .await
        .unwrap();
    let written = fs::read_to_string(dir.path().join("written.json")).unwrap();
    let round_trip: Vec<Trigger> = serde_json::from_str(&written).unwrap();
    assert_eq!(round_trip, triggers);

    let event = client.next_event().await.unwrap();
    assert_eq!(event, HostEvent::ThemeChanged);
}

#[tokio::test]
async fn missing_bridge_binary_is_categorized() {
    let client = BridgeClient::new()
        .with_bridge_path("/nonexistent/nagdim-bridge")
        .with_retries(1);
    let err = client.list_sessions().await.unwrap_err();
    assert!(matches!(
        err,
        nagdim_core::Error::Host(HostError::BridgeNotFound)
    ));
}

#[tokio::test]
async fn failing_bridge_command_is_surfaced() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("broken-bridge");
    fs::write(&script, "#!/bin/sh\necho 'boom' >&2\nexit 1\n").unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    let client = BridgeClient::new()
        .with_bridge_path(script.display().to_string())
        .with_retries(1)
        .with_retry_delay_ms(0);
    let err = client.list_sessions().await.unwrap_err();
    assert!(matches!(
        err,
        nagdim_core::Error::Host(HostError::CommandFailed(_))
    ));
}
