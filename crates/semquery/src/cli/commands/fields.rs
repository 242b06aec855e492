use anyhow::Result;
use clap::Args;
use serde::Serialize;
use serde_json::json;

use super::{ScopeArgs, load_field_catalog};
use crate::cli::envelope::{Envelope, Hint};
use crate::config::RuntimePaths;
use crate::models::{FieldKind, FieldType};
use crate::validate::operators_for;

#[derive(Debug, Clone, Args)]
pub struct FieldsArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldRow {
    pub kind: FieldKind,
    pub name: String,
    pub full_name: String,
    pub field_type: Option<FieldType>,
    pub operators: Vec<String>,
}

pub fn run(args: &FieldsArgs, runtime_paths: &RuntimePaths) -> Result<()> {
    let catalog = load_field_catalog("fields", &args.scope, runtime_paths)?;
    let rows = catalog
        .iter()
        .map(|(kind, field)| FieldRow {
            kind,
            name: field.name.clone(),
            full_name: field.full_name.clone(),
            field_type: field.field_type,
            operators: operators_for(field.field_type)
                .into_iter()
                .map(|op| op.as_str().to_string())
                .collect(),
        })
        .collect::<Vec<_>>();

    let mut envelope = Envelope::ok(
        "fields",
        &json!({ "topic": catalog.topic, "fields": rows }),
    )?
    .with_count("dimensions", catalog.dimensions.len())
    .with_count("measures", catalog.measures.len());
    if catalog.is_empty() {
        envelope = envelope.with_hint(Hint::Catalog {
            message: "scope has no dimensions or measures; nothing can be selected".to_string(),
        });
    }
    envelope.print()
}
