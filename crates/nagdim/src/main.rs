//! nagdim CLI: dim AI-assistant nag output via terminal highlight triggers.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use nagdim_core::apply::{self, Scope};
use nagdim_core::config::Config;
use nagdim_core::host::{BridgeClient, HostInterface};
use nagdim_core::registry::Registry;
use nagdim_core::synth::PatternSet;
use nagdim_core::{logging, reconcile, watch};

#[derive(Parser)]
#[command(
    name = "nagdim",
    version,
    about = "Dim AI-assistant nag output via terminal highlight triggers",
    long_about = "Installs highlight-line triggers into terminal session profiles so that \
                  automated reminder output from AI coding-assistant session hooks is \
                  visually dimmed instead of removed."
)]
struct Cli {
    /// Config file path (default: ~/.config/nagdim/nagdim.toml).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Install dim triggers into all sessions (one-shot).
    Apply {
        /// Target a single dimmer group instead of all of them.
        #[arg(long)]
        group: Option<String>,
    },
    /// Remove dim triggers from all sessions.
    Remove {
        /// Target a single dimmer group instead of all of them.
        #[arg(long)]
        group: Option<String>,
    },
    /// Flip dimming on or off everywhere, based on the current session.
    Toggle,
    /// Apply to all sessions, then keep them current as sessions, profiles,
    /// and themes change (runs until interrupted).
    Watch,
    /// Show per-session, per-group install state.
    Status {
        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

fn scope(group: Option<&String>) -> Scope<'_> {
    group.map_or(Scope::All, |g| Scope::Group(g.as_str()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = Config::load(cli.config.as_deref()).context("loading config")?;
    let registry = Registry::with_config(&config);
    let set = PatternSet::build(&registry, config.min_tail_len)
        .context("synthesizing trigger patterns")?;
    let host = Arc::new(BridgeClient::new().with_timeout(config.bridge_timeout_secs));

    match cli.command {
        Command::Apply { group } => {
            let report =
                apply::apply_all(host.as_ref(), &set, config.dim_factor, scope(group.as_ref()))
                    .await?;
            println!(
                "Applied triggers to {} sessions ({} errors)",
                report.updated,
                report.errors()
            );
        }
        Command::Remove { group } => {
            let report =
                apply::remove_all_sessions(host.as_ref(), &set, scope(group.as_ref())).await?;
            println!(
                "Removed triggers from {} sessions ({} errors)",
                report.updated,
                report.errors()
            );
        }
        Command::Toggle => {
            let (now_on, report) = apply::toggle_all(host.as_ref(), &set, config.dim_factor)
                .await?;
            let state = if now_on { "ON" } else { "OFF" };
            println!("Dimming turned {state} ({} sessions)", report.updated);
        }
        Command::Watch => {
            println!("Watching for sessions... (Ctrl-C to stop)");
            watch::watch(host.as_ref(), &set, config.dim_factor).await?;
        }
        Command::Status { json } => {
            status(host.as_ref(), &set, json).await?;
        }
    }

    Ok(())
}

async fn status(host: &dyn HostInterface, set: &PatternSet, json: bool) -> anyhow::Result<()> {
    let sessions = host.list_sessions().await?;
    let mut rows = Vec::new();
    for info in sessions {
        // One profile read per session covers every group.
        let profile = host.get_profile(&info.session_id).await?;
        let mut groups = Vec::new();
        for name in set.group_names() {
            let installed = reconcile::group_installed(&profile.triggers, set, name)?;
            groups.push((name.to_string(), installed));
        }
        rows.push((info.session_id, groups));
    }

    if json {
        let value: Vec<serde_json::Value> = rows
            .iter()
            .map(|(session, groups)| {
                serde_json::json!({
                    "session_id": session,
                    "groups": groups
                        .iter()
                        .map(|(name, on)| serde_json::json!({"name": name, "installed": on}))
                        .collect::<Vec<_>>(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else if rows.is_empty() {
        println!("No sessions");
    } else {
        for (session, groups) in rows {
            let summary: Vec<String> = groups
                .iter()
                .map(|(name, on)| format!("{name}={}", if *on { "on" } else { "off" }))
                .collect();
            println!("{session}: {}", summary.join(" "));
        }
    }
    Ok(())
}
