//! Input loading: extraction documents and per-page OCR exports

pub mod diagnostics;
pub mod layout;

use miette::Diagnostic;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use diagnostics::InputSyntaxError;
pub use layout::{LayoutResult, LayoutTable};

use crate::entities::{lenient, AuditDocument, PageText};

#[derive(Debug, Error, Diagnostic)]
pub enum InputError {
    #[error("input file not found: {0}")]
    #[diagnostic(code(rollaudit::input::not_found))]
    NotFound(PathBuf),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] InputSyntaxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One page as saved by the review session export
#[derive(Debug, Clone, Default, Deserialize)]
struct ExportedPage {
    #[serde(default, deserialize_with = "lenient::opt_string_or_number")]
    real_page: Option<String>,

    #[serde(default, alias = "header_snippet")]
    header_text: String,

    #[serde(default, alias = "full_content_text")]
    full_text: String,

    #[serde(default, alias = "markdown_output")]
    table_md: String,

    /// Layout analysis result the page text was derived from
    #[serde(default)]
    raw_json: Option<serde_json::Value>,
}

impl ExportedPage {
    fn into_page_text(self) -> PageText {
        let rebuilt = self
            .raw_json
            .as_ref()
            .and_then(LayoutResult::from_value)
            .map(|l| layout::to_page_text(&l));

        let mut page = PageText {
            real_page: self.real_page,
            header_text: self.header_text,
            full_text: self.full_text,
            table_md: self.table_md,
        };
        if let Some(rebuilt) = rebuilt {
            if page.table_md.trim().is_empty() {
                page.table_md = rebuilt.table_md;
            }
            if page.full_text.trim().is_empty() {
                page.full_text = rebuilt.full_text;
            }
            if page.header_text.trim().is_empty() {
                page.header_text = rebuilt.header_text;
            }
            if page.real_page.is_none() {
                page.real_page = rebuilt.real_page;
            }
        }
        if page.real_page.is_none() {
            page.real_page = layout::page_hint(&page.full_text);
        }
        page
    }
}

fn read_source(path: &Path) -> Result<String, InputError> {
    if !path.exists() {
        return Err(InputError::NotFound(path.to_path_buf()));
    }
    Ok(std::fs::read_to_string(path)?)
}

fn parse<T: serde::de::DeserializeOwned>(source: &str, path: &Path) -> Result<T, InputError> {
    serde_json::from_str(source).map_err(|e| {
        InputError::Syntax(InputSyntaxError::from_serde_error(
            &e,
            source,
            &path.display().to_string(),
        ))
    })
}

/// Parse an audit document from JSON text
pub fn parse_document(source: &str, name: &str) -> Result<AuditDocument, InputError> {
    parse(source, Path::new(name))
}

/// Load an audit document from a JSON file
pub fn load_document(path: &Path) -> Result<AuditDocument, InputError> {
    let source = read_source(path)?;
    let doc: AuditDocument = parse(&source, path)?;
    tracing::debug!(
        path = %path.display(),
        items = doc.items.len(),
        summary_rows = doc.summary_rows.len(),
        pages = doc.pages.len(),
        "loaded document"
    );
    Ok(doc)
}

/// Parse a page export (JSON array of pages)
pub fn parse_pages(source: &str, name: &str) -> Result<Vec<PageText>, InputError> {
    let pages: Vec<ExportedPage> = parse(source, Path::new(name))?;
    Ok(pages.into_iter().map(ExportedPage::into_page_text).collect())
}

/// Load a page export file
pub fn load_pages(path: &Path) -> Result<Vec<PageText>, InputError> {
    let source = read_source(path)?;
    let pages = parse_pages(&source, &path.display().to_string())?;
    tracing::debug!(path = %path.display(), pages = pages.len(), "loaded page export");
    Ok(pages)
}
