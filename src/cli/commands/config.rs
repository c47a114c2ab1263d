//! `rollaudit config` command - inspect configuration

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{load_config, resolve_format, to_structured};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective audit configuration
    Show,

    /// Show paths to configuration files
    Path,
}

pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show => run_show(global),
        ConfigCommands::Path => run_path(global),
    }
}

fn run_show(global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let format = resolve_format(global, &config);
    let audit = config.audit_config();

    if format == OutputFormat::Json {
        print!("{}", to_structured(&audit, format)?);
        return Ok(());
    }

    if format == OutputFormat::Table && !global.quiet {
        println!("{}", style("Effective Configuration").bold().underlined());
        println!();
        match &config.rules {
            Some(path) => println!("rules: {}", path.display()),
            None => println!("rules: {}", style("(not set)").dim()),
        }
    }
    print!("{}", serde_yml::to_string(&audit).into_diagnostic()?);

    if format == OutputFormat::Table && !global.quiet {
        println!();
        println!("{}", style("Config sources (later wins):").dim());
        println!("  1. Global config (~/.config/rollaudit/config.yaml)");
        println!("  2. Project config (.rollaudit.yaml)");
        println!("  3. Environment variables (ROLLAUDIT_RULES, ROLLAUDIT_FORMAT)");
        println!("  4. --config <FILE>");
    }
    Ok(())
}

fn run_path(global: &GlobalOpts) -> Result<()> {
    let show = |label: &str, path: Option<std::path::PathBuf>| match path {
        Some(p) => {
            let marker = if p.exists() {
                style("(exists)").green()
            } else {
                style("(not found)").dim()
            };
            println!("{}: {} {}", label, p.display(), marker);
        }
        None => println!("{}: {}", label, style("(unavailable)").dim()),
    };

    show("global", Config::global_config_path());
    show("project", Config::project_config_path());
    if let Some(explicit) = &global.config {
        show("explicit", Some(explicit.clone()));
    }
    Ok(())
}
