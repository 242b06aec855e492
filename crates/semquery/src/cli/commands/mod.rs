pub mod build;
pub mod fields;
pub mod replay;
pub mod schema;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use serde_json::json;

use crate::catalog::{CatalogScope, load_catalog_document};
use crate::cli::envelope::{Envelope, ErrorCode};
use crate::config::RuntimePaths;
use crate::models::FieldCatalog;
use crate::panel::PanelAction;

/// Catalog source and the view or topic whose fields the panel offers.
#[derive(Debug, Clone, Args)]
pub struct ScopeArgs {
    #[arg(long, value_name = "PATH")]
    pub catalog: PathBuf,

    #[arg(long, value_name = "NAME", required_unless_present = "topic")]
    pub view: Option<String>,

    #[arg(long, value_name = "NAME", conflicts_with = "view")]
    pub topic: Option<String>,
}

impl ScopeArgs {
    #[must_use]
    pub fn scope(&self) -> Option<CatalogScope> {
        self.topic
            .clone()
            .map(CatalogScope::Topic)
            .or_else(|| self.view.clone().map(CatalogScope::View))
    }
}

/// Loads the catalog and flattens the requested scope. Lookup failures become
/// an error envelope so the caller can print it verbatim.
pub fn load_field_catalog(
    command: &'static str,
    args: &ScopeArgs,
    runtime_paths: &RuntimePaths,
) -> Result<FieldCatalog> {
    let Some(scope) = args.scope() else {
        bail!("pass --view or --topic to pick the catalog scope");
    };
    let path = runtime_paths.resolve_input(&args.catalog)?;
    let document = load_catalog_document(&path)?;
    document.field_catalog(&scope).map_err(|error| {
        Envelope::error(command, ErrorCode::CatalogScopeNotFound, error.to_string())
            .with_details(json!({ "catalog": path.display().to_string() }))
            .into_failure()
    })
}

pub fn load_session(path: &Path) -> Result<Vec<PanelAction>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read session file: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse session file: {}", path.display()))
}
