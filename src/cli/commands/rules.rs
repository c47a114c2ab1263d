//! `rollaudit rules` command - inspect the rule table

use clap::Subcommand;
use console::style;
use miette::Result;
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{load_config, load_rules, resolve_format, to_structured, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::vocab::normalize;
use crate::entities::RuleRecord;
use crate::input;

#[derive(Subcommand, Debug)]
pub enum RulesCommands {
    /// List every rule
    List(ListArgs),

    /// Show the rule a title resolves to
    Match(MatchArgs),

    /// Rules whose names appear in a document's text
    Hits(HitsArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Rule table (CSV); overrides the configured one
    #[arg(long, short = 'r')]
    pub rules: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct MatchArgs {
    /// Item title
    pub title: String,

    /// Rule table (CSV); overrides the configured one
    #[arg(long, short = 'r')]
    pub rules: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct HitsArgs {
    /// Extraction document (JSON)
    pub document: PathBuf,

    /// Page export (JSON array) replacing the document's pages
    #[arg(long)]
    pub pages: Option<PathBuf>,

    /// Rule table (CSV); overrides the configured one
    #[arg(long, short = 'r')]
    pub rules: Option<PathBuf>,

    /// Minimum score (0-100); defaults to config `rule_hit_threshold`
    #[arg(long)]
    pub threshold: Option<u8>,
}

pub fn run(cmd: RulesCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        RulesCommands::List(args) => run_list(args, global),
        RulesCommands::Match(args) => run_match(args, global),
        RulesCommands::Hits(args) => run_hits(args, global),
    }
}

fn print_table(builder: Builder, format: OutputFormat) {
    let mut table = builder.build();
    if format == OutputFormat::Md {
        table.with(Style::markdown());
    } else {
        table.with(Style::rounded());
    }
    println!("{}", table);
}

fn rule_row(rule: &RuleRecord) -> [String; 6] {
    let field = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
    [
        rule.item_name.clone(),
        truncate_str(rule.spec.as_deref().unwrap_or("-"), 30),
        field(&rule.unit_local),
        field(&rule.unit_aggregate),
        field(&rule.category_override),
        truncate_str(rule.logic_note.as_deref().unwrap_or("-"), 40),
    ]
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let format = resolve_format(global, &config);
    let rules = load_rules(args.rules.as_deref(), &config)?;
    let all: Vec<&RuleRecord> = rules.iter().collect();

    match format {
        OutputFormat::Json | OutputFormat::Yaml => print!("{}", to_structured(&all, format)?),
        OutputFormat::Table | OutputFormat::Md => {
            let mut builder = Builder::default();
            builder.push_record(["Name", "Spec", "Local", "Aggregate", "Override", "Note"]);
            for rule in &all {
                builder.push_record(rule_row(rule));
            }
            print_table(builder, format);
            if !global.quiet {
                println!("{} rule(s)", style(all.len()).cyan());
            }
        }
    }
    Ok(())
}

fn run_match(args: MatchArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let format = resolve_format(global, &config);
    let rules = load_rules(args.rules.as_deref(), &config)?;

    let Some(matched) = rules.resolve(&args.title) else {
        return Err(miette::miette!(
            "No rule matches '{}' (normalized: {})",
            args.title,
            normalize(&args.title)
        ));
    };

    match format {
        OutputFormat::Json | OutputFormat::Yaml => {
            print!("{}", to_structured(matched.rule, format)?)
        }
        OutputFormat::Table | OutputFormat::Md => {
            println!(
                "{} {} ({})",
                style("Matched:").bold(),
                style(&matched.rule.item_name).cyan(),
                matched.how
            );
            let mut builder = Builder::default();
            builder.push_record(["Name", "Spec", "Local", "Aggregate", "Override", "Note"]);
            builder.push_record(rule_row(matched.rule));
            print_table(builder, format);
        }
    }
    Ok(())
}

fn run_hits(args: HitsArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let format = resolve_format(global, &config);
    let rules = load_rules(args.rules.as_deref(), &config)?;
    let threshold = args
        .threshold
        .unwrap_or(config.audit_config().rule_hit_threshold);

    let mut doc = input::load_document(&args.document)?;
    if let Some(pages) = &args.pages {
        doc.pages = input::load_pages(pages)?;
    }
    let hits = rules.hits(&doc.full_text(), threshold);

    match format {
        OutputFormat::Json | OutputFormat::Yaml => {
            let rows: Vec<serde_json::Value> = hits
                .iter()
                .map(|(score, rule)| serde_json::json!({ "score": score, "rule": rule }))
                .collect();
            print!("{}", to_structured(&rows, format)?);
        }
        OutputFormat::Table | OutputFormat::Md => {
            if hits.is_empty() {
                if !global.quiet {
                    println!("No rules reach score {}", threshold);
                }
                return Ok(());
            }
            let mut builder = Builder::default();
            builder.push_record(["Score", "Name", "Spec", "Local"]);
            for (score, rule) in &hits {
                builder.push_record([
                    score.to_string(),
                    rule.item_name.clone(),
                    truncate_str(rule.spec.as_deref().unwrap_or("-"), 30),
                    rule.unit_local.clone().unwrap_or_else(|| "-".into()),
                ]);
            }
            print_table(builder, format);
        }
    }
    Ok(())
}
