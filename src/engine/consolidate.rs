//! Issue consolidation and intake of extraction-reported issues

use std::collections::HashMap;

use crate::entities::{Engine, Issue, IssueKind, ReportedIssue};

/// Reported issue types the audit engines supersede
const SUPERSEDED_TYPES: &[&str] = &[
    "流程",
    "規格提取失敗",
    "未匹配",
    "PROCESS",
    "SPEC EXTRACTION",
    "UNMATCHED",
];

/// Sort page labels numerically; non-numeric labels go last in their
/// original order
pub fn sort_pages(pages: &mut [String]) {
    pages.sort_by(|a, b| {
        match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
            (Ok(x), Ok(y)) => x.total_cmp(&y),
            (Ok(_), Err(_)) => std::cmp::Ordering::Less,
            (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
            (Err(_), Err(_)) => std::cmp::Ordering::Equal,
        }
    });
}

/// Merge issues sharing (item, kind, reason)
///
/// Merged issues keep first-seen order, union their pages, concatenate
/// evidence and take the highest severity. Running it on its own output
/// changes nothing.
pub fn consolidate(issues: Vec<Issue>) -> Vec<Issue> {
    let mut merged: Vec<Issue> = Vec::new();
    let mut index: HashMap<(String, IssueKind, String), usize> = HashMap::new();

    for issue in issues {
        let (item, kind, reason) = issue.merge_key();
        let key = (item.to_string(), kind.clone(), reason.to_string());
        match index.get(&key) {
            Some(&idx) => {
                let target = &mut merged[idx];
                for page in issue.pages {
                    if !target.pages.contains(&page) {
                        target.pages.push(page);
                    }
                }
                target.evidence.extend(issue.evidence);
                target.severity = target.severity.max(issue.severity);
            }
            None => {
                index.insert(key, merged.len());
                let mut issue = issue;
                let mut pages: Vec<String> = Vec::with_capacity(issue.pages.len());
                for page in issue.pages.drain(..) {
                    if !pages.contains(&page) {
                        pages.push(page);
                    }
                }
                issue.pages = pages;
                merged.push(issue);
            }
        }
    }

    for issue in &mut merged {
        sort_pages(&mut issue.pages);
    }
    merged
}

/// Whether a reported issue type is covered by the audit engines
pub fn is_superseded(issue_type: &str) -> bool {
    let upper = issue_type.to_uppercase();
    SUPERSEDED_TYPES.iter().any(|t| upper.contains(t))
}

/// Convert extraction-reported issues, dropping the superseded ones
pub fn reported_issues(reported: &[ReportedIssue]) -> Vec<Issue> {
    reported
        .iter()
        .filter(|r| {
            let keep = !is_superseded(&r.issue_type);
            if !keep {
                tracing::debug!(issue_type = %r.issue_type, page = %r.page, "dropping superseded reported issue");
            }
            keep
        })
        .map(|r| {
            Issue::new(
                r.page.clone(),
                r.item.clone(),
                IssueKind::Reported(r.issue_type.trim().to_string()),
                r.reason.clone(),
                Engine::Extraction,
            )
            .with_evidence(r.evidence.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Category, EvidenceRow, Severity};

    fn issue(page: &str, item: &str, reason: &str) -> Issue {
        Issue::new(
            page,
            item,
            IssueKind::Dimension(Category::Range),
            reason,
            Engine::Dimensional,
        )
        .with_evidence(vec![EvidenceRow::new(format!("{}-{}", item, page), "1")])
    }

    #[test]
    fn test_merge_same_key() {
        let issues = vec![
            issue("10", "本體", "not within interval"),
            issue("2", "軸頸", "not within interval"),
            issue("2", "本體", "not within interval"),
            issue("summary", "本體", "not within interval"),
            issue("2", "本體", "must have two decimal places"),
        ];
        let merged = consolidate(issues);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].item, "本體");
        assert_eq!(merged[0].pages, vec!["2", "10", "summary"]);
        assert_eq!(merged[0].evidence.len(), 3);
        assert_eq!(merged[1].item, "軸頸");
        assert_eq!(merged[2].reason, "must have two decimal places");
    }

    #[test]
    fn test_kind_is_part_of_merge_key() {
        let other_kind = Issue::new(
            "2",
            "本體",
            IssueKind::Dimension(Category::MinLimit),
            "not within interval",
            Engine::Dimensional,
        );
        let issues = vec![issue("1", "本體", "not within interval"), other_kind];
        assert_ne!(issues[0].merge_key(), issues[1].merge_key());
        let merged = consolidate(issues);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1].kind, IssueKind::Dimension(Category::MinLimit));
    }

    #[test]
    fn test_idempotent() {
        let issues = vec![
            issue("3", "A", "r"),
            issue("1", "A", "r"),
            issue("1", "A", "r"),
            issue("P2", "B", "r"),
        ];
        let once = consolidate(issues);
        let twice = consolidate(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once[0].pages, vec!["1", "3"]);
    }

    #[test]
    fn test_severity_takes_max() {
        let issues = vec![
            issue("1", "A", "r").with_severity(Severity::Warning),
            issue("2", "A", "r").with_severity(Severity::Severe),
        ];
        let merged = consolidate(issues);
        assert_eq!(merged[0].severity, Severity::Severe);
    }

    #[test]
    fn test_sort_pages_stable_for_labels() {
        let mut pages: Vec<String> = ["P3", "12", "summary", "2", "P1"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        sort_pages(&mut pages);
        assert_eq!(pages, vec!["2", "12", "P3", "summary", "P1"]);
    }

    #[test]
    fn test_reported_issue_filter() {
        let reported = vec![
            ReportedIssue {
                page: "1".into(),
                item: "本體".into(),
                issue_type: "流程異常".into(),
                ..Default::default()
            },
            ReportedIssue {
                page: "2".into(),
                item: "軸頸".into(),
                issue_type: "Unmatched rule".into(),
                ..Default::default()
            },
            ReportedIssue {
                page: "3".into(),
                item: "外觀".into(),
                issue_type: "表面瑕疵".into(),
                reason: "scratch".into(),
                ..Default::default()
            },
        ];
        let issues = reported_issues(&reported);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::Reported("表面瑕疵".into()));
        assert_eq!(issues[0].engine, Engine::Extraction);
        assert_eq!(issues[0].pages, vec!["3"]);
    }
}
