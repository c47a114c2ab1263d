//! Report rendering for terminal and markdown output

use console::style;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::truncate_str;
use crate::cli::OutputFormat;
use crate::engine::AuditReport;
use crate::entities::{EvidenceRow, Issue, Severity};

const ITEM_WIDTH: usize = 28;
const REASON_WIDTH: usize = 48;

fn build(builder: Builder, format: OutputFormat) -> String {
    let mut table = builder.build();
    match format {
        OutputFormat::Md => table.with(Style::markdown()),
        _ => table.with(Style::rounded()),
    };
    table.to_string()
}

fn heading(text: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Md => format!("## {}\n\n", text),
        _ => format!("{}\n", style(text).bold().underlined()),
    }
}

/// One evidence row as a single line: `id: value (target ...) [note]`
pub fn format_evidence(row: &EvidenceRow) -> String {
    let mut line = format!("{}: {}", row.id, row.value);
    if let Some(target) = &row.target {
        line.push_str(&format!(" (target {})", target));
    }
    if let Some(note) = row.note.as_deref().filter(|n| !n.is_empty()) {
        line.push_str(&format!(" [{}]", note));
    }
    line
}

/// Issues as a table; evidence lines are joined with `<br>` in markdown
pub fn issues_table(issues: &[Issue], format: OutputFormat) -> String {
    let separator = if format == OutputFormat::Md { "<br>" } else { "\n" };
    let mut builder = Builder::default();
    builder.push_record(["Pages", "Item", "Type", "Severity", "Reason", "Evidence"]);
    for issue in issues {
        let evidence: Vec<String> = issue.evidence.iter().map(format_evidence).collect();
        builder.push_record([
            issue.page_display(),
            truncate_str(&issue.item, ITEM_WIDTH),
            issue.kind.to_string(),
            issue.severity.to_string(),
            truncate_str(&issue.reason, REASON_WIDTH),
            evidence.join(separator),
        ]);
    }
    build(builder, format)
}

/// Full report in a human-readable format
pub fn render_report(report: &AuditReport, format: OutputFormat, raw: bool) -> String {
    let mut out = String::new();
    if format == OutputFormat::Md {
        out.push_str("# Audit Report\n\n");
    }

    out.push_str(&heading("Header", format));
    let mut header = Builder::default();
    header.push_record(["Field", "Value"]);
    header.push_record(["Job number", report.header.display_job_no()]);
    header.push_record([
        "Scheduled date",
        report.header.scheduled_date.as_deref().unwrap_or("N/A"),
    ]);
    header.push_record([
        "Actual date",
        report.header.actual_date.as_deref().unwrap_or("N/A"),
    ]);
    out.push_str(&build(header, format));
    out.push_str("\n\n");

    let summary = &report.summary;
    out.push_str(&heading("Summary", format));
    let mut counts = Builder::default();
    counts.push_record(["Metric", "Count"]);
    counts.push_record(["Items".to_string(), summary.items.to_string()]);
    counts.push_record(["Raw issues".to_string(), summary.raw_issues.to_string()]);
    counts.push_record([
        "Consolidated issues".to_string(),
        summary.consolidated_issues.to_string(),
    ]);
    for (engine, n) in &summary.by_engine {
        counts.push_record([format!("  {}", engine), n.to_string()]);
    }
    for (severity, n) in &summary.by_severity {
        counts.push_record([format!("  {}", severity), n.to_string()]);
    }
    out.push_str(&build(counts, format));
    out.push_str("\n\n");

    let issues = if raw { &report.issues } else { &report.consolidated };
    if !issues.is_empty() {
        out.push_str(&heading(if raw { "Issues (raw)" } else { "Issues" }, format));
        out.push_str(&issues_table(issues, format));
        out.push_str("\n\n");
    }

    out.push_str(&verdict_line(report, format));
    out.push('\n');
    out
}

fn verdict_line(report: &AuditReport, format: OutputFormat) -> String {
    let summary = &report.summary;
    let text = if summary.passed {
        "PASSED".to_string()
    } else {
        format!("FAILED: {} error(s) need review", summary.real_errors)
    };
    match format {
        OutputFormat::Md => format!("**{}**", text),
        _ if summary.passed => format!("{} {}", style("✓").green(), style(text).green().bold()),
        _ => {
            let severe = summary
                .by_severity
                .get(&Severity::Severe)
                .copied()
                .unwrap_or(0);
            if severe > 0 {
                format!("{} {} ({} severe)", style("✗").red(), style(text).red().bold(), severe)
            } else {
                format!("{} {}", style("✗").red(), style(text).red().bold())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Engine, IssueKind};

    #[test]
    fn test_format_evidence() {
        let row = EvidenceRow::new("A1", "300.15").target("[299.9, 300.1]");
        assert_eq!(format_evidence(&row), "A1: 300.15 (target [299.9, 300.1])");
        let row = EvidenceRow::new("R1", "missing").note("incomplete history");
        assert_eq!(format_evidence(&row), "R1: missing [incomplete history]");
    }

    #[test]
    fn test_markdown_issues_table() {
        let issue = Issue::new(
            "2",
            "本體再生車修",
            IssueKind::TraceabilityGap,
            "[body] reached reconditioned, missing: welded",
            Engine::Process,
        )
        .with_evidence(vec![
            EvidenceRow::new("R1", "missing"),
            EvidenceRow::new("R2", "missing"),
        ]);
        let md = issues_table(&[issue], OutputFormat::Md);
        assert!(md.contains("| Pages"));
        assert!(md.contains("traceability-gap"));
        assert!(md.contains("R1: missing<br>R2: missing"));
    }
}
