//! JSON input diagnostics rendered through miette

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// JSON syntax or shape error with source location
#[derive(Debug, Error, Diagnostic)]
#[error("invalid input document: {message}")]
#[diagnostic(code(rollaudit::input::syntax))]
pub struct InputSyntaxError {
    #[source_code]
    src: NamedSource<String>,

    #[label("here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    message: String,
}

impl InputSyntaxError {
    /// Build from a serde_json error; line and column are 1-based
    pub fn from_serde_error(err: &serde_json::Error, source: &str, filename: &str) -> Self {
        let offset = line_col_to_offset(source, err.line().max(1), err.column().max(1));
        let message = err.to_string();
        let help = generate_help(err, &message);

        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: SourceSpan::from(offset..offset.saturating_add(1).min(source.len().max(1))),
            help,
            message,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Byte offset of a 1-based (line, column) position, clamped to the source
fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let line_start = source
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum::<usize>()
        .min(source.len());
    let rest = &source[line_start..];
    let line_len = rest.find('\n').unwrap_or(rest.len());
    let mut offset = line_start + (column - 1).min(line_len);
    while offset > 0 && !source.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

fn generate_help(err: &serde_json::Error, message: &str) -> Option<String> {
    use serde_json::error::Category;

    let lower = message.to_lowercase();
    match err.classify() {
        Category::Eof => Some("The document ends early. Check for a missing '}' or ']'.".to_string()),
        Category::Syntax if lower.contains("trailing comma") => {
            Some("Remove the comma after the last element.".to_string())
        }
        Category::Syntax if lower.contains("key must be a string") => {
            Some("Object keys must be double-quoted strings.".to_string())
        }
        Category::Syntax if lower.contains("control character") => {
            Some("Escape line breaks inside strings as \\n.".to_string())
        }
        Category::Data if lower.contains("invalid type") => Some(
            "A field has the wrong type. Measurement strings look like \"id:value|id:value\"."
                .to_string(),
        ),
        _ => None,
    }
}
