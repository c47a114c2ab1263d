//! CLI module - argument parsing, command dispatch and report rendering

pub mod args;
pub mod commands;
pub mod helpers;
pub mod output;

pub use args::{Cli, Commands, GlobalOpts, OutputFormat};

/// Initialize stderr logging; `ROLLAUDIT_LOG` overrides the flag-derived level
pub fn init_tracing(quiet: bool, verbose: bool) -> miette::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("ROLLAUDIT_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| miette::miette!("failed to initialize logging: {}", e))
}

/// Dispatch a parsed command line
pub fn run(cli: Cli) -> miette::Result<()> {
    let global = cli.global;
    match cli.command {
        Commands::Audit(args) => commands::audit::run(args, &global),
        Commands::Classify(args) => commands::classify::run(args, &global),
        Commands::Spec(args) => commands::spec::run(args, &global),
        Commands::Rules(cmd) => commands::rules::run(cmd, &global),
        Commands::Config(cmd) => commands::config::run(cmd, &global),
    }
}
