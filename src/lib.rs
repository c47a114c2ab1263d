//! rollaudit: audit core for roll delivery inspection documents
//!
//! Takes the structured record an extraction service produced from a
//! scanned delivery document and checks it for dimensional, accounting,
//! process-history and header consistency problems.

pub mod cli;
pub mod core;
pub mod engine;
pub mod entities;
pub mod input;

pub use engine::{run_audit, AuditReport, ReportSummary};
