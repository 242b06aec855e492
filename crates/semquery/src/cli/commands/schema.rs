use anyhow::Result;
use clap::Args;

use crate::cli::envelope::Envelope;
use crate::models::json_schema;

#[derive(Debug, Clone, Args)]
pub struct SchemaArgs {}

pub fn run(_args: &SchemaArgs) -> Result<()> {
    Envelope::ok("schema", &json_schema()?)?.print()
}
