use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde_json::json;

use super::{ScopeArgs, load_field_catalog, load_session};
use crate::builder::build_execute_request;
use crate::cli::envelope::Envelope;
use crate::config::RuntimePaths;
use crate::panel::PanelController;
use crate::panel::driver::replay_offline;

#[derive(Debug, Clone, Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,

    #[arg(long, value_name = "PATH")]
    pub session: PathBuf,

    /// Wrap the query in an execute request (adds the result format hint).
    #[arg(long, default_value_t = false)]
    pub execute: bool,
}

pub fn run(args: &BuildArgs, runtime_paths: &RuntimePaths) -> Result<()> {
    let catalog = load_field_catalog("build", &args.scope, runtime_paths)?;
    let actions = load_session(&runtime_paths.resolve_input(&args.session)?)?;
    let action_count = actions.len();

    let mut panel = PanelController::new(catalog);
    let rejected = replay_offline(&mut panel, actions);

    let data = if args.execute {
        serde_json::to_value(build_execute_request(
            panel.selection(),
            panel.catalog().topic.as_deref(),
        ))?
    } else {
        serde_json::to_value(panel.request())?
    };

    Envelope::ok("build", &json!({ "request": data }))?
        .with_count("actions", action_count)
        .with_count("rejected", rejected.len())
        .with_hints(&rejected)
        .with_hints(&panel.hints())
        .print()
}
