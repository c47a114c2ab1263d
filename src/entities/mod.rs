//! Entity type definitions
//!
//! Records flowing through an audit run:
//!
//! **Extraction input:**
//! - [`ExtractedItem`] - One engineering line-item on one page with its measurements
//! - [`SummaryRow`] - One row of the delivery summary table (a reconciliation bucket)
//! - [`AuditDocument`] - The full extraction record plus per-page OCR text
//!
//! **Rule table:**
//! - [`RuleRecord`] - Per-item overrides for spec, category and unit conversion
//!
//! **Findings:**
//! - [`Issue`] - A finding raised by one of the engines, with evidence rows
//! - [`HeaderInfo`] - Job number and delivery dates resolved across pages

pub mod category;
pub mod document;
pub mod header;
pub mod issue;
pub mod item;
pub mod lenient;
pub mod rule;
pub mod summary;

pub use category::{Category, Stage, Track};
pub use document::{AuditDocument, PageText, ReportedIssue};
pub use header::{HeaderInfo, PageHeader};
pub use issue::{Engine, EvidenceRow, Issue, IssueKind, Severity};
pub use item::{ExtractedItem, MeasuredValue, Measurement};
pub use rule::RuleRecord;
pub use summary::SummaryRow;
