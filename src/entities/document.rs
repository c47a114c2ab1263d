//! Audit document - the extraction record plus per-page OCR text

use serde::{Deserialize, Serialize};

use super::issue::EvidenceRow;
use super::item::ExtractedItem;
use super::lenient;
use super::summary::SummaryRow;

/// OCR text of one page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageText {
    /// Page number printed in the footer, when one was found
    #[serde(default, deserialize_with = "lenient::opt_string_or_number")]
    pub real_page: Option<String>,

    /// First part of the page content, where the header fields live
    #[serde(default, alias = "header_snippet")]
    pub header_text: String,

    /// Full page content
    #[serde(default, alias = "full_content_text")]
    pub full_text: String,

    /// Page-tagged table markdown
    #[serde(default, alias = "markdown_output")]
    pub table_md: String,
}

impl PageText {
    /// Page label used by the header checker, `index` is zero-based
    pub fn label(&self, index: usize) -> String {
        match self.real_page.as_deref() {
            Some(page) if !page.eq_ignore_ascii_case("unknown") => page.to_string(),
            _ => format!("P{}", index + 1),
        }
    }
}

/// Issue reported by the extraction service itself
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportedIssue {
    #[serde(default, deserialize_with = "lenient::string_or_number")]
    pub page: String,

    #[serde(default)]
    pub item: String,

    #[serde(default)]
    pub issue_type: String,

    #[serde(default, alias = "common_reason")]
    pub reason: String,

    #[serde(default, alias = "failures")]
    pub evidence: Vec<EvidenceRow>,
}

/// Everything one audit run consumes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditDocument {
    /// Job number as read by the extraction service
    #[serde(default, deserialize_with = "lenient::opt_string_or_number")]
    pub job_no: Option<String>,

    /// Freight total declared on the summary page
    #[serde(default, deserialize_with = "lenient::quantity")]
    pub freight_target: f64,

    #[serde(default)]
    pub summary_rows: Vec<SummaryRow>,

    #[serde(default, alias = "dimension_data")]
    pub items: Vec<ExtractedItem>,

    /// Issues reported by the extraction service
    #[serde(default)]
    pub issues: Vec<ReportedIssue>,

    /// Per-page OCR text; drives the header checker and rule hits
    #[serde(default)]
    pub pages: Vec<PageText>,
}

impl AuditDocument {
    /// Concatenated text of every page, used for document-level rule hits
    pub fn full_text(&self) -> String {
        self.pages
            .iter()
            .map(|p| {
                if p.full_text.is_empty() {
                    p.table_md.as_str()
                } else {
                    p.full_text.as_str()
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
