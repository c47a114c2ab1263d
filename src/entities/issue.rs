//! Issue entity - a finding raised by one of the audit engines

use serde::{Deserialize, Serialize, Serializer};

use super::category::Category;
use super::lenient;

/// Engine that raised an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    Dimensional,
    Accounting,
    Process,
    Header,
    /// Reported by the extraction service itself
    Extraction,
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Engine::Dimensional => write!(f, "dimensional"),
            Engine::Accounting => write!(f, "accounting"),
            Engine::Process => write!(f, "process"),
            Engine::Header => write!(f, "header"),
            Engine::Extraction => write!(f, "extraction"),
        }
    }
}

/// How urgently an issue needs review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
    Severe,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
            Severity::Severe => write!(f, "severe"),
        }
    }
}

/// Issue type; part of the consolidation key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IssueKind {
    /// Measurement failed the rules of its category
    Dimension(Category),
    /// Illegible value in a weight-mode item
    DamagedData,
    /// Item count differs from the title-declared quantity
    LocalQuantityMismatch,
    /// Part id repeated more often than the part allows
    DuplicateId,
    /// Summary bucket total differs from the accumulated items
    TotalQuantityMismatch,
    /// Freight total differs from the computed freight
    FreightMismatch,
    /// Summary row applied and delivered quantities differ
    SummaryQuantityMismatch,
    /// Stage missing below the furthest recorded stage
    TraceabilityGap,
    /// Stage values violate the expected size ordering
    SizeOrder,
    /// Page header disagrees with the cross-page majority
    HeaderMismatch,
    /// Pages carry different well-formed job numbers
    MixedJobNumber,
    /// Reported job number has the wrong shape
    JobNumberFormat,
    /// Scheduled date is after the actual date
    DateOrder,
    /// Carried over from the extraction service
    Reported(String),
}

impl IssueKind {
    pub fn default_severity(&self) -> Severity {
        match self {
            IssueKind::DuplicateId | IssueKind::HeaderMismatch => Severity::Warning,
            IssueKind::MixedJobNumber => Severity::Severe,
            _ => Severity::Error,
        }
    }
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueKind::Dimension(category) => write!(f, "dimension({})", category),
            IssueKind::DamagedData => write!(f, "damaged-data"),
            IssueKind::LocalQuantityMismatch => write!(f, "local-quantity-mismatch"),
            IssueKind::DuplicateId => write!(f, "duplicate-id"),
            IssueKind::TotalQuantityMismatch => write!(f, "total-quantity-mismatch"),
            IssueKind::FreightMismatch => write!(f, "freight-mismatch"),
            IssueKind::SummaryQuantityMismatch => write!(f, "summary-quantity-mismatch"),
            IssueKind::TraceabilityGap => write!(f, "traceability-gap"),
            IssueKind::SizeOrder => write!(f, "size-order"),
            IssueKind::HeaderMismatch => write!(f, "header-mismatch"),
            IssueKind::MixedJobNumber => write!(f, "mixed-job-number"),
            IssueKind::JobNumberFormat => write!(f, "job-number-format"),
            IssueKind::DateOrder => write!(f, "date-order"),
            IssueKind::Reported(kind) => write!(f, "reported({})", kind),
        }
    }
}

impl Serialize for IssueKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// One row of supporting evidence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceRow {
    /// Part id, item title or label
    #[serde(default, deserialize_with = "lenient::string_or_number")]
    pub id: String,

    /// Observed or computed value
    #[serde(alias = "val", default, deserialize_with = "lenient::string_or_number")]
    pub value: String,

    /// Reference the value was compared against
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_string_or_number"
    )]
    pub target: Option<String>,

    /// How the value was derived
    #[serde(
        alias = "calc",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_string_or_number"
    )]
    pub note: Option<String>,
}

impl EvidenceRow {
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
            target: None,
            note: None,
        }
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// A finding raised by an engine
///
/// Before consolidation `pages` holds exactly one entry; consolidated issues
/// hold the sorted union of all merged pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub pages: Vec<String>,
    pub item: String,
    pub kind: IssueKind,
    pub reason: String,
    pub evidence: Vec<EvidenceRow>,
    pub engine: Engine,
    pub severity: Severity,
}

impl Issue {
    pub fn new(
        page: impl Into<String>,
        item: impl Into<String>,
        kind: IssueKind,
        reason: impl Into<String>,
        engine: Engine,
    ) -> Self {
        let severity = kind.default_severity();
        Self {
            pages: vec![page.into()],
            item: item.into(),
            kind,
            reason: reason.into(),
            evidence: Vec::new(),
            engine,
            severity,
        }
    }

    pub fn with_evidence(mut self, rows: Vec<EvidenceRow>) -> Self {
        self.evidence = rows;
        self
    }

    pub fn push_evidence(&mut self, row: EvidenceRow) {
        self.evidence.push(row);
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Pages joined for display, e.g. `1, 3, 5`
    pub fn page_display(&self) -> String {
        self.pages.join(", ")
    }

    /// Consolidation key: (item, type, reason)
    pub fn merge_key(&self) -> (&str, &IssueKind, &str) {
        (&self.item, &self.kind, &self.reason)
    }
}

/// Format a quantity without trailing zeros (`10`, `2.5`, `0.3333`)
pub fn format_quantity(value: f64) -> String {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        let text = format!("{:.4}", rounded);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_kind_display() {
        assert_eq!(IssueKind::Dimension(Category::Range).to_string(), "dimension(range)");
        assert_eq!(IssueKind::TraceabilityGap.to_string(), "traceability-gap");
        assert_eq!(
            serde_json::to_string(&IssueKind::MixedJobNumber).unwrap(),
            "\"mixed-job-number\""
        );
    }

    #[test]
    fn test_default_severity() {
        let issue = Issue::new("1", "x", IssueKind::MixedJobNumber, "r", Engine::Header);
        assert_eq!(issue.severity, Severity::Severe);
        let issue = Issue::new("1", "x", IssueKind::DuplicateId, "r", Engine::Accounting);
        assert_eq!(issue.severity, Severity::Warning);
        let issue = Issue::new("1", "x", IssueKind::SizeOrder, "r", Engine::Process);
        assert_eq!(issue.severity, Severity::Error);
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(10.0), "10");
        assert_eq!(format_quantity(2.5), "2.5");
        assert_eq!(format_quantity(1.0 / 3.0), "0.3333");
        assert_eq!(format_quantity(8.000001), "8");
    }

    #[test]
    fn test_evidence_row_from_extraction() {
        let row: EvidenceRow =
            serde_json::from_str(r#"{"id": "V100", "val": 349.9, "calc": "manual"}"#).unwrap();
        assert_eq!(row.value, "349.9");
        assert_eq!(row.note.as_deref(), Some("manual"));
        assert_eq!(row.target, None);
    }
}
