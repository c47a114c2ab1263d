//! Shared helper functions for CLI commands

use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Config, RuleTable};

/// Load layered config, honoring `--config`
pub fn load_config(global: &GlobalOpts) -> Result<Config> {
    Config::load(global.config.as_deref()).map_err(|e| miette::miette!("{}", e))
}

/// Output format: flag, then config, then table
pub fn resolve_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    if let Some(format) = global.format {
        return format;
    }
    match config.default_format.as_deref().map(str::parse::<OutputFormat>) {
        Some(Ok(format)) => format,
        Some(Err(_)) => {
            tracing::warn!(
                format = config.default_format.as_deref().unwrap_or(""),
                "unknown default_format in config, using table"
            );
            OutputFormat::Table
        }
        None => OutputFormat::Table,
    }
}

/// Rule table from `--rules`, falling back to the configured path
///
/// An explicit path must load; a configured one falls back to an empty
/// table with a warning.
pub fn load_rules(explicit: Option<&Path>, config: &Config) -> Result<RuleTable> {
    let threshold = config.audit_config().rule_similarity_threshold;
    let table = match explicit {
        Some(path) => RuleTable::load(path).map_err(|e| miette::miette!("{}", e))?,
        None => RuleTable::load_or_empty(config.rules.as_deref()),
    };
    Ok(table.with_threshold(threshold))
}

/// Truncate to `max_chars` characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Write to a file or stdout
pub fn write_output(content: &str, output_path: Option<&PathBuf>) -> Result<()> {
    match output_path {
        Some(path) => {
            let file = File::create(path).into_diagnostic()?;
            let mut writer = BufWriter::new(file);
            writer.write_all(content.as_bytes()).into_diagnostic()?;
            writer.flush().into_diagnostic()?;
            eprintln!(
                "{} Report written to {}",
                style("✓").green(),
                style(path.display()).cyan()
            );
        }
        None => print!("{}", content),
    }
    Ok(())
}

/// Serialize a value in a machine-readable format
pub fn to_structured<T: serde::Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => serde_yml::to_string(value).into_diagnostic(),
        _ => {
            let mut text = serde_json::to_string_pretty(value).into_diagnostic()?;
            text.push('\n');
            Ok(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("本體再生車修加工", 5), "本體...");
    }

    #[test]
    fn test_resolve_format() {
        let global = GlobalOpts {
            format: None,
            quiet: false,
            verbose: false,
            config: None,
        };
        let config = Config {
            default_format: Some("json".into()),
            ..Default::default()
        };
        assert_eq!(resolve_format(&global, &config), OutputFormat::Json);
        assert_eq!(resolve_format(&global, &Config::default()), OutputFormat::Table);

        let flagged = GlobalOpts {
            format: Some(OutputFormat::Md),
            ..global
        };
        assert_eq!(resolve_format(&flagged, &config), OutputFormat::Md);
    }
}
