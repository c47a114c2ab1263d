//! `rollaudit classify` command - show how item titles are classified

use miette::Result;
use serde::Serialize;
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{load_config, load_rules, resolve_format, to_structured};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::RuleTable;
use crate::engine::{classify, track_and_stage};
use crate::entities::{Category, Stage, Track};

#[derive(clap::Args, Debug)]
pub struct ClassifyArgs {
    /// Item titles to classify
    #[arg(required = true)]
    pub titles: Vec<String>,

    /// Rule table (CSV); overrides the configured one
    #[arg(long, short = 'r')]
    pub rules: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct Classification {
    title: String,
    category: Category,
    track: Option<Track>,
    stage: Option<Stage>,
    /// Rule name and how it matched
    rule: Option<String>,
}

fn classify_title(title: &str, rules: &RuleTable) -> Classification {
    let matched = rules.resolve(title);
    let rule = matched.as_ref().map(|m| m.rule);
    let (track, stage) = track_and_stage(title, rule);
    Classification {
        title: title.to_string(),
        category: classify(title, rule),
        track,
        stage,
        rule: matched.map(|m| format!("{} ({})", m.rule.item_name, m.how)),
    }
}

pub fn run(args: ClassifyArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let format = resolve_format(global, &config);
    let rules = load_rules(args.rules.as_deref(), &config)?;

    let rows: Vec<Classification> = args
        .titles
        .iter()
        .map(|t| classify_title(t, &rules))
        .collect();

    match format {
        OutputFormat::Json | OutputFormat::Yaml => print!("{}", to_structured(&rows, format)?),
        OutputFormat::Table | OutputFormat::Md => {
            let mut builder = Builder::default();
            builder.push_record(["Title", "Category", "Track", "Stage", "Rule"]);
            for row in &rows {
                builder.push_record([
                    row.title.clone(),
                    row.category.to_string(),
                    row.track.map(|t| t.to_string()).unwrap_or_else(|| "-".into()),
                    row.stage
                        .map(|s| format!("{} ({})", s.number(), s))
                        .unwrap_or_else(|| "-".into()),
                    row.rule.clone().unwrap_or_else(|| "-".into()),
                ]);
            }
            let mut table = builder.build();
            if format == OutputFormat::Md {
                table.with(Style::markdown());
            } else {
                table.with(Style::rounded());
            }
            println!("{}", table);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::RuleRecord;

    #[test]
    fn test_classify_title_with_rule() {
        let rules = RuleTable::new(vec![RuleRecord::new("軸頸加工").with_override("研磨")]);
        let row = classify_title("軸頸加工", &rules);
        assert_eq!(row.track, Some(Track::Journal));
        assert_eq!(row.stage, Some(Stage::Ground));
        assert_eq!(row.rule.as_deref(), Some("軸頸加工 (exact)"));

        let row = classify_title("本體銲補", &RuleTable::empty());
        assert_eq!(row.category, Category::MinLimit);
        assert!(row.rule.is_none());
    }
}
