//! `rollaudit spec` command - parse a free-text tolerance spec

use console::style;
use miette::Result;

use crate::cli::helpers::{load_config, resolve_format, to_structured};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::engine::parse_spec;
use crate::entities::issue::format_quantity;

#[derive(clap::Args, Debug)]
pub struct SpecArgs {
    /// Spec text, e.g. "300±0.1mm"
    pub text: String,
}

pub fn run(args: SpecArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let format = resolve_format(global, &config);
    let parsed = parse_spec(&args.text, config.audit_config().trusted_min_magnitude);

    match format {
        OutputFormat::Json | OutputFormat::Yaml => print!("{}", to_structured(&parsed, format)?),
        OutputFormat::Table | OutputFormat::Md => {
            let trusted: Vec<String> = parsed.trusted.iter().map(|n| format_quantity(*n)).collect();
            if parsed.intervals.is_empty() {
                println!("{} {}", style("Intervals:").bold(), style("none").dim());
            } else {
                println!("{} {}", style("Intervals:").bold(), parsed.describe_intervals());
            }
            if trusted.is_empty() {
                println!("{} {}", style("Trusted:").bold(), style("none").dim());
            } else {
                println!("{} {}", style("Trusted:").bold(), trusted.join(", "));
            }
        }
    }
    Ok(())
}
