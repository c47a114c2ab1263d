//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    audit::AuditArgs, classify::ClassifyArgs, config::ConfigCommands, rules::RulesCommands,
    spec::SpecArgs,
};

#[derive(Parser)]
#[command(name = "rollaudit")]
#[command(author, version, about = "Audit core for roll delivery inspection documents")]
#[command(long_about = "Checks extracted roll delivery documents for dimensional, \
    accounting, process-history and header consistency problems.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format (default: config `default_format`, then table)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Only print errors
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Explicit config file, applied over global and project config
    #[arg(long, global = true, env = "ROLLAUDIT_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full audit over an extraction document
    Audit(AuditArgs),

    /// Show category, track and stage for item titles
    Classify(ClassifyArgs),

    /// Parse a free-text tolerance spec
    Spec(SpecArgs),

    /// Inspect the rule table
    #[command(subcommand)]
    Rules(RulesCommands),

    /// Show configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Colored tables for the terminal
    #[default]
    Table,
    /// Markdown tables
    Md,
    /// JSON (for programming)
    Json,
    /// YAML (full fidelity)
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
    }
}
