//! Audit engines
//!
//! Classification runs first; the dimensional, accounting, process and
//! header checks then run independently over the classified items. Their
//! issues are concatenated in that order together with the issues the
//! extraction service reported, and finally consolidated.

pub mod accounting;
pub mod classifier;
pub mod consolidate;
pub mod dimensional;
pub mod header;
pub mod process;
pub mod spec_parser;

use serde::Serialize;
use std::collections::BTreeMap;

use crate::core::config::AuditConfig;
use crate::core::rules::RuleLookup;
use crate::entities::{AuditDocument, ExtractedItem, HeaderInfo, Issue, Severity};

pub use classifier::{classify, classify_items, track_and_stage};
pub use consolidate::consolidate;
pub use spec_parser::{parse_spec, AcceptanceInterval, ParsedSpec};

/// Counts over one audit run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportSummary {
    pub items: usize,
    pub raw_issues: usize,
    pub consolidated_issues: usize,
    pub by_engine: BTreeMap<String, usize>,
    pub by_severity: BTreeMap<Severity, usize>,
    /// Consolidated issues at error severity or above
    pub real_errors: usize,
    pub passed: bool,
}

impl ReportSummary {
    fn from_issues(items: usize, raw: &[Issue], consolidated: &[Issue]) -> Self {
        let mut summary = ReportSummary {
            items,
            raw_issues: raw.len(),
            consolidated_issues: consolidated.len(),
            ..Default::default()
        };
        for issue in consolidated {
            *summary.by_engine.entry(issue.engine.to_string()).or_default() += 1;
            *summary.by_severity.entry(issue.severity).or_default() += 1;
            if issue.severity >= Severity::Error {
                summary.real_errors += 1;
            }
        }
        summary.passed = summary.real_errors == 0;
        summary
    }
}

/// Result of one audit run
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub header: HeaderInfo,
    /// Items with the category the classifier assigned
    pub items: Vec<ExtractedItem>,
    /// Flat issue list, before consolidation
    pub issues: Vec<Issue>,
    pub consolidated: Vec<Issue>,
    pub summary: ReportSummary,
}

/// Run every engine over a document
///
/// Never fails: every abnormal condition in the input surfaces as an issue.
pub fn run_audit(doc: &AuditDocument, rules: &dyn RuleLookup, config: &AuditConfig) -> AuditReport {
    let items = classify_items(&doc.items, rules);
    tracing::info!(items = items.len(), pages = doc.pages.len(), "running audit");

    let mut issues = Vec::new();
    issues.extend(dimensional::audit(&items, rules, config));
    issues.extend(accounting::audit(
        &items,
        &doc.summary_rows,
        doc.freight_target,
        rules,
        config,
    ));
    issues.extend(process::audit(&items, rules, config));

    let (header, header_issues) = header::check(&doc.pages, doc.job_no.as_deref(), config);
    issues.extend(header_issues);
    issues.extend(consolidate::reported_issues(&doc.issues));

    let consolidated = consolidate(issues.clone());
    let summary = ReportSummary::from_issues(items.len(), &issues, &consolidated);
    tracing::info!(
        raw = summary.raw_issues,
        consolidated = summary.consolidated_issues,
        real_errors = summary.real_errors,
        "audit finished"
    );

    AuditReport {
        header,
        items,
        issues,
        consolidated,
        summary,
    }
}
