//! Waybill CLI Application
//!
//! Command-line front end for the waybill package dispatch workflow. The
//! CLI drives the core client against the bundled in-memory substrate,
//! seeded from (and persisted back to) an optional JSON state file, acting
//! as the user named by `--actor`/`--role`.

mod args;
mod cli;
mod renderer;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use log::info;
use renderer::TerminalRenderer;
use waybill_core::models::{Actor, UserRole};
use waybill_core::transport::memory::MemoryTransport;
use waybill_core::{Transport, WorkflowClientBuilder};
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        state_file,
        actor,
        role,
        no_color,
        command,
    } = Args::parse();

    let role: UserRole = role
        .parse()
        .map_err(anyhow::Error::msg)
        .context("invalid --role")?;

    let transport = Arc::new(load_transport(state_file.as_deref())?);
    transport.set_current_user(actor.as_str());

    let client = WorkflowClientBuilder::new()
        .with_transport(Arc::clone(&transport) as Arc<dyn Transport>)
        .with_actor(Actor::new(actor, role))
        .build()
        .context("Failed to configure workflow client")?;
    client
        .refresh()
        .await
        .context("Failed to load the package register")?;

    let renderer = TerminalRenderer::new(!no_color);
    let cli = Cli::new(client, renderer);

    info!("Waybill started as {role}");

    let outcome = match command {
        Some(Submit(submit_args)) => cli.submit(submit_args).await,
        Some(Approve { id, notes }) => cli.approve(&id, notes).await,
        Some(Reject { id, reason }) => cli.reject(&id, reason).await,
        Some(Resubmit { id }) => cli.resubmit(&id).await,
        Some(Dispatch { id, notes }) => cli.dispatch(&id, notes).await,
        Some(Return(return_args)) => cli.record_return(return_args).await,
        Some(Assign { id, manager }) => cli.assign(&id, &manager).await,
        Some(List(list_args)) => cli.list(&list_args),
        Some(Show { id }) => cli.show(&id),
        Some(Managers) => cli.managers().await,
        None => cli.list(&Default::default()),
    };
    outcome?;

    if let Some(path) = state_file.as_deref() {
        save_state(path, &transport)?;
    }
    Ok(())
}

/// Builds the local substrate from the state file, when one is given.
///
/// The file holds either `{"packages": [...], "managers": [...]}` or a bare
/// array of package records. A missing file starts an empty register.
fn load_transport(state_file: Option<&Path>) -> Result<MemoryTransport> {
    let Some(path) = state_file else {
        return Ok(MemoryTransport::new());
    };
    if !path.exists() {
        return Ok(MemoryTransport::new());
    }

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read state file {}", path.display()))?;
    let state: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("State file {} is not valid JSON", path.display()))?;

    let (packages, managers) = match state {
        serde_json::Value::Array(packages) => (packages, Vec::new()),
        serde_json::Value::Object(mut object) => {
            let packages = match object.remove("packages") {
                Some(serde_json::Value::Array(packages)) => packages,
                _ => Vec::new(),
            };
            let managers = match object.remove("managers") {
                Some(serde_json::Value::Array(managers)) => managers,
                _ => Vec::new(),
            };
            (packages, managers)
        }
        _ => anyhow::bail!(
            "State file {} must hold an object or an array",
            path.display()
        ),
    };

    let transport = MemoryTransport::with_records(packages);
    transport.seed_managers(managers);
    Ok(transport)
}

/// Writes the substrate's state back so the next invocation sees it.
fn save_state(path: &Path, transport: &MemoryTransport) -> Result<()> {
    let state = serde_json::json!({
        "packages": transport.dump_records(),
        "managers": transport.dump_managers(),
    });
    let pretty = serde_json::to_string_pretty(&state)?;
    std::fs::write(path, pretty)
        .with_context(|| format!("Failed to write state file {}", path.display()))
}
