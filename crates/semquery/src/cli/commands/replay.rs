use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use futures::executor::block_on;

use super::{ScopeArgs, load_field_catalog, load_session};
use crate::backend::FixtureBackend;
use crate::cli::envelope::Envelope;
use crate::config::RuntimePaths;
use crate::panel::PanelController;
use crate::panel::driver::replay;

#[derive(Debug, Clone, Args)]
pub struct ReplayArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,

    #[arg(long, value_name = "PATH")]
    pub session: PathBuf,

    /// Canned compile and execute responses.
    #[arg(long, value_name = "PATH")]
    pub responses: PathBuf,
}

pub fn run(args: &ReplayArgs, runtime_paths: &RuntimePaths) -> Result<()> {
    let catalog = load_field_catalog("replay", &args.scope, runtime_paths)?;
    let actions = load_session(&runtime_paths.resolve_input(&args.session)?)?;
    let backend = FixtureBackend::load(&runtime_paths.resolve_input(&args.responses)?)?;
    let action_count = actions.len();

    let mut panel = PanelController::new(catalog);
    let rejected = block_on(replay(&mut panel, &backend, actions));
    let snapshot = panel.snapshot();

    Envelope::ok("replay", &snapshot)?
        .with_count("actions", action_count)
        .with_count("rejected", rejected.len())
        .with_count("compile_calls", backend.compile_calls().len())
        .with_count("execute_calls", backend.execute_calls().len())
        .with_hints(&rejected)
        .with_hints(&snapshot.hints)
        .print()
}
