use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::commands::{build::BuildArgs, fields::FieldsArgs, replay::ReplayArgs, schema::SchemaArgs};

#[derive(Debug, Parser)]
#[command(
    name = "semquery",
    version,
    about = "Semantic query builder over view and topic catalogs"
)]
pub struct Cli {
    #[command(flatten)]
    pub runtime: RuntimeArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Args)]
pub struct RuntimeArgs {
    #[arg(long, global = true, value_name = "PATH")]
    pub home_dir: Option<PathBuf>,

    #[arg(long, global = true, value_name = "PATH")]
    pub cwd: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the flattened fields of a view or topic.
    Fields(FieldsArgs),
    /// Replay a session and print the request it builds.
    Build(BuildArgs),
    /// Replay a session against canned compile/execute responses.
    Replay(ReplayArgs),
    /// Print the JSON schema of the execute request.
    Schema(SchemaArgs),
}

impl Command {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Fields(_) => "fields",
            Self::Build(_) => "build",
            Self::Replay(_) => "replay",
            Self::Schema(_) => "schema",
        }
    }
}
