//! Header consistency - job number and delivery dates across pages
//!
//! Header fields are read from each page's raw OCR text with fixed
//! patterns, independently of what the extraction service reported. The
//! majority value of each field is the document's reading; pages that
//! disagree with it are flagged.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

use crate::core::config::AuditConfig;
use crate::entities::{
    Engine, EvidenceRow, HeaderInfo, Issue, IssueKind, PageHeader, PageText,
};

static JOB_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[工土下][令冷今]編號[:\.]*([A-Za-z0-9\-_]+)").expect("valid job number pattern")
});

static SCHEDULED_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[預预項頂][定交].*?(\d{2,4}[\.\-/]\d{1,2}[\.\-/]\d{1,2})")
        .expect("valid scheduled date pattern")
});

static ACTUAL_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[實真][際交].*?(\d{2,4}[\.\-/]\d{1,2}[\.\-/]\d{1,2})")
        .expect("valid actual date pattern")
});

static DATE_PARTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2,4})[\.\-/](\d{1,2})[\.\-/](\d{1,2})$").expect("valid date pattern")
});

const NOT_FOUND: &str = "N/A";

/// Header field checked across pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    JobNumber,
    ScheduledDate,
    ActualDate,
}

impl HeaderField {
    pub const ALL: [HeaderField; 3] = [
        HeaderField::JobNumber,
        HeaderField::ScheduledDate,
        HeaderField::ActualDate,
    ];

    /// Item label used on issues
    pub fn item(&self) -> &'static str {
        match self {
            HeaderField::JobNumber => "header: job number",
            HeaderField::ScheduledDate => "header: scheduled date",
            HeaderField::ActualDate => "header: actual date",
        }
    }

    fn get<'a>(&self, page: &'a PageHeader) -> Option<&'a str> {
        match self {
            HeaderField::JobNumber => page.job_no.as_deref(),
            HeaderField::ScheduledDate => page.scheduled_date.as_deref(),
            HeaderField::ActualDate => page.actual_date.as_deref(),
        }
    }
}

/// Collapse OCR text for pattern matching: no line breaks or spaces, upper case
pub fn clean_text(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '\n' | '\r' | ' '))
        .collect::<String>()
        .to_uppercase()
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Read the header fields of one page; `index` is zero-based
pub fn read_page(page: &PageText, index: usize) -> PageHeader {
    let text = clean_text(&format!("{}{}", page.header_text, page.full_text));
    PageHeader {
        page: page.label(index),
        job_no: capture(&JOB_NUMBER, &text),
        scheduled_date: capture(&SCHEDULED_DATE, &text),
        actual_date: capture(&ACTUAL_DATE, &text),
    }
}

/// Most common value; a tie goes to the value seen first
pub fn majority<'a>(values: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, n)) => *n += 1,
            None => counts.push((value, 1)),
        }
    }
    let mut best: Option<(&str, usize)> = None;
    for (value, n) in counts {
        if best.map_or(true, |(_, b)| n > b) {
            best = Some((value, n));
        }
    }
    best.map(|(value, _)| value)
}

/// Whether a job number has the expected length, alphabet and prefix
pub fn is_well_formed_job_number(value: &str, config: &AuditConfig) -> bool {
    let upper = value.to_uppercase();
    upper.chars().count() == config.job_number_length
        && upper.chars().all(|c| c.is_ascii_alphanumeric())
        && (config.job_number_prefixes.is_empty()
            || config
                .job_number_prefixes
                .iter()
                .any(|p| upper.starts_with(&p.to_uppercase())))
}

/// Parse a header date; two-digit years are 20xx, ROC (Minguo) years are
/// converted to the Gregorian calendar
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let caps = DATE_PARTS.captures(text.trim())?;
    let mut year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    if year < 100 {
        year += 2000;
    } else if year <= 1910 {
        year += 1911;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Cross-check header fields across pages and validate the reported job number
pub fn check(
    pages: &[PageText],
    reported_job_no: Option<&str>,
    config: &AuditConfig,
) -> (HeaderInfo, Vec<Issue>) {
    let readings: Vec<PageHeader> = pages
        .iter()
        .enumerate()
        .map(|(i, p)| read_page(p, i))
        .collect();
    let mut issues = Vec::new();

    let majority_of = |field: HeaderField| -> Option<String> {
        majority(readings.iter().filter_map(|r| field.get(r))).map(str::to_string)
    };
    let info = HeaderInfo {
        reported_job_no: reported_job_no.map(str::to_string),
        job_no: majority_of(HeaderField::JobNumber),
        scheduled_date: majority_of(HeaderField::ScheduledDate),
        actual_date: majority_of(HeaderField::ActualDate),
        pages: readings.clone(),
    };

    // mixed job numbers: several well-formed values that cannot all be typos
    let mut job_pages: Vec<(String, Vec<String>)> = Vec::new();
    for reading in &readings {
        let Some(job) = reading.job_no.as_deref() else {
            continue;
        };
        if !is_well_formed_job_number(job, config) {
            continue;
        }
        match job_pages.iter_mut().find(|(v, _)| v == job) {
            Some((_, pages)) => pages.push(reading.page.clone()),
            None => job_pages.push((job.to_string(), vec![reading.page.clone()])),
        }
    }
    let mixed = job_pages.len() >= 2;
    if mixed {
        tracing::warn!(count = job_pages.len(), "document mixes job numbers");
        let mut all_pages: Vec<String> = job_pages.iter().flat_map(|(_, p)| p.clone()).collect();
        super::consolidate::sort_pages(&mut all_pages);
        let evidence = job_pages
            .iter()
            .map(|(job, pages)| {
                EvidenceRow::new(format!("pages {}", pages.join(", ")), job.clone())
                    .note("job number")
            })
            .collect();
        let mut issue = Issue::new(
            "",
            HeaderField::JobNumber.item(),
            IssueKind::MixedJobNumber,
            format!("document mixes {} different job numbers", job_pages.len()),
            Engine::Header,
        )
        .with_evidence(evidence);
        issue.pages = all_pages;
        issues.push(issue);
    }

    // per-page deviations from the majority
    for field in HeaderField::ALL {
        let standard = match field {
            HeaderField::JobNumber => info.job_no.as_deref(),
            HeaderField::ScheduledDate => info.scheduled_date.as_deref(),
            HeaderField::ActualDate => info.actual_date.as_deref(),
        };
        let Some(standard) = standard else {
            continue;
        };
        for reading in &readings {
            let current = field.get(reading);
            if current == Some(standard) {
                continue;
            }
            if field == HeaderField::JobNumber
                && mixed
                && current.is_some_and(|c| is_well_formed_job_number(c, config))
            {
                continue;
            }
            let shown = current.unwrap_or(NOT_FOUND);
            let mut reason = "differs from the majority of pages".to_string();
            if field == HeaderField::JobNumber
                && shown.chars().count() != standard.chars().count()
            {
                reason.push_str(&format!(
                    " (length {} vs {})",
                    shown.chars().count(),
                    standard.chars().count()
                ));
            }
            issues.push(
                Issue::new(
                    reading.page.clone(),
                    field.item(),
                    IssueKind::HeaderMismatch,
                    reason,
                    Engine::Header,
                )
                .with_evidence(vec![
                    EvidenceRow::new("majority", standard).note("majority vote"),
                    EvidenceRow::new(format!("page {}", reading.page), shown)
                        .target(standard)
                        .note("mismatch or missed"),
                ]),
            );
        }
    }

    // scheduled date must not be after the actual date
    for reading in &readings {
        let scheduled = reading.scheduled_date.as_deref().and_then(parse_date);
        let actual = reading.actual_date.as_deref().and_then(parse_date);
        if let (Some(s), Some(a)) = (scheduled, actual) {
            if s > a {
                issues.push(
                    Issue::new(
                        reading.page.clone(),
                        "header: delivery dates",
                        IssueKind::DateOrder,
                        "scheduled date is after actual date",
                        Engine::Header,
                    )
                    .with_evidence(vec![
                        EvidenceRow::new("scheduled", s.format("%Y-%m-%d").to_string()),
                        EvidenceRow::new("actual", a.format("%Y-%m-%d").to_string()),
                    ]),
                );
            }
        }
    }

    if let Some(job) = reported_job_no.map(str::trim).filter(|j| !j.is_empty()) {
        if !is_well_formed_job_number(job, config) {
            issues.push(
                Issue::new(
                    "header",
                    HeaderField::JobNumber.item(),
                    IssueKind::JobNumberFormat,
                    format!(
                        "reported job number is not a {}-character job number",
                        config.job_number_length
                    ),
                    Engine::Header,
                )
                .with_evidence(vec![EvidenceRow::new("reported", job)
                    .note(format!("{} characters", job.chars().count()))]),
            );
        }
    }

    (info, issues)
}
