//! `rollaudit audit` command - run every engine over a document

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{load_config, load_rules, resolve_format, to_structured, write_output};
use crate::cli::output::render_report;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::engine::run_audit;
use crate::input;

#[derive(clap::Args, Debug)]
pub struct AuditArgs {
    /// Extraction document (JSON)
    pub document: PathBuf,

    /// Rule table (CSV); overrides the configured one
    #[arg(long, short = 'r')]
    pub rules: Option<PathBuf>,

    /// Page export (JSON array) replacing the document's pages
    #[arg(long)]
    pub pages: Option<PathBuf>,

    /// List issues before consolidation
    #[arg(long)]
    pub raw: bool,

    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Exit with an error when the audit finds errors
    #[arg(long)]
    pub fail_on_error: bool,
}

pub fn run(args: AuditArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let format = resolve_format(global, &config);
    let audit_config = config.audit_config();
    let rules = load_rules(args.rules.as_deref(), &config)?;

    let mut doc = input::load_document(&args.document)?;
    if let Some(pages) = &args.pages {
        doc.pages = input::load_pages(pages)?;
    }

    let report = run_audit(&doc, &rules, &audit_config);

    let content = match format {
        OutputFormat::Json | OutputFormat::Yaml => to_structured(&report, format)?,
        OutputFormat::Table | OutputFormat::Md => render_report(&report, format, args.raw),
    };
    write_output(&content, args.output.as_ref())?;

    if !global.quiet && args.output.is_some() {
        eprintln!(
            "{} {} issue(s), {} consolidated",
            style("→").dim(),
            report.summary.raw_issues,
            report.summary.consolidated_issues
        );
    }

    if args.fail_on_error && !report.summary.passed {
        return Err(miette::miette!(
            "audit found {} error(s)",
            report.summary.real_errors
        ));
    }
    Ok(())
}
