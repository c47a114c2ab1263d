//! Dimensional audit - measurement format and tolerance checks

use std::collections::HashMap;

use super::spec_parser::{parse_spec, ParsedSpec};
use crate::core::config::AuditConfig;
use crate::core::rules::RuleLookup;
use crate::entities::issue::format_quantity;
use crate::entities::item::{has_two_decimals, is_pure_integer};
use crate::entities::{
    Category, Engine, EvidenceRow, ExtractedItem, Issue, IssueKind, MeasuredValue,
};

pub const REASON_DAMAGED: &str = "damaged data";
pub const REASON_PURE_INTEGER: &str = "must be a pure integer";
pub const REASON_BELOW_MINIMUM: &str = "below minimum";
pub const REASON_INTEGER: &str = "must be an integer";
pub const REASON_TWO_DECIMALS: &str = "must have two decimal places";
pub const REASON_NOT_IN_INTERVAL: &str = "not within interval";

/// Outcome of one measurement
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Pass,
    /// Not audited: blank, placeholder or no numeric token
    Skip,
    Fail { reason: String, reference: String },
}

/// Validate one measurement against its category and parsed spec
pub fn check_value(
    category: Category,
    measured: &MeasuredValue,
    spec: &ParsedSpec,
    config: &AuditConfig,
) -> Verdict {
    let (text, value) = match measured {
        MeasuredValue::Damaged => {
            return Verdict::Fail {
                reason: REASON_DAMAGED.to_string(),
                reference: "N/A".to_string(),
            }
        }
        MeasuredValue::Blank | MeasuredValue::Unreadable => return Verdict::Skip,
        MeasuredValue::Number { text, value } => (text.as_str(), *value),
    };

    let fail = |reason: &str, reference: String| Verdict::Fail {
        reason: reason.to_string(),
        reference,
    };

    match category {
        Category::MinLimit => {
            let nearest = spec.nearest_trusted(value);
            let reference = nearest.map(format_quantity).unwrap_or_else(|| "N/A".to_string());
            if !is_pure_integer(text) {
                return fail(REASON_PURE_INTEGER, reference);
            }
            match nearest {
                Some(n) if value < n => fail(REASON_BELOW_MINIMUM, reference),
                _ => Verdict::Pass,
            }
        }
        Category::UnRegen => {
            let Some(threshold) = spec.max_trusted_at_least(config.un_regen_floor) else {
                return Verdict::Skip;
            };
            let reference = format_quantity(threshold);
            if value <= threshold {
                if !is_pure_integer(text) {
                    return fail(REASON_INTEGER, reference);
                }
            } else if !has_two_decimals(text) {
                return fail(REASON_TWO_DECIMALS, reference);
            }
            Verdict::Pass
        }
        Category::MaxLimit => {
            let target = match spec.max_trusted() {
                Some(t) if t > 0.0 => t,
                _ => return Verdict::Skip,
            };
            let reference = format_quantity(target);
            if !is_pure_integer(text) {
                return fail(REASON_PURE_INTEGER, reference);
            }
            if value > target {
                return fail(&format!("exceeds maximum {}", reference), reference.clone());
            }
            Verdict::Pass
        }
        Category::Range => {
            let reference = if spec.intervals.is_empty() {
                "N/A".to_string()
            } else {
                spec.describe_intervals()
            };
            if !has_two_decimals(text) {
                return fail(REASON_TWO_DECIMALS, reference);
            }
            if !spec.intervals.is_empty() && !spec.intervals.iter().any(|i| i.contains(value)) {
                return fail(REASON_NOT_IN_INTERVAL, reference);
            }
            Verdict::Pass
        }
        Category::Exempt | Category::Unknown => Verdict::Skip,
    }
}

/// Spec text for an item: its own, or the rule's when the extraction gave none
fn effective_spec<'a>(item: &'a ExtractedItem, rules: &'a dyn RuleLookup) -> &'a str {
    if !item.spec.trim().is_empty() {
        return &item.spec;
    }
    rules
        .lookup(&item.title)
        .and_then(|r| r.spec.as_deref())
        .unwrap_or("")
}

/// Audit every classified item
///
/// Failures are grouped by (page, title, reason) into one issue per group
/// with one evidence row per failing measurement, in first-seen order.
pub fn audit(items: &[ExtractedItem], rules: &dyn RuleLookup, config: &AuditConfig) -> Vec<Issue> {
    let mut issues: Vec<Issue> = Vec::new();
    let mut index: HashMap<(String, String, String), usize> = HashMap::new();

    for item in items {
        let category = item.category();
        if !category.is_audited() {
            continue;
        }
        let spec = parse_spec(effective_spec(item, rules), config.trusted_min_magnitude);
        let page = item.page_label();

        for m in &item.measurements {
            let measured = m.measured(&config.damage_sentinel);
            let (reason, reference) = match check_value(category, &measured, &spec, config) {
                Verdict::Fail { reason, reference } => (reason, reference),
                Verdict::Pass => continue,
                Verdict::Skip => {
                    if measured == MeasuredValue::Unreadable {
                        tracing::debug!(id = %m.id, value = %m.value, "skipping unreadable measurement");
                    }
                    continue;
                }
            };

            let shown = match &measured {
                MeasuredValue::Number { text, .. } => text.clone(),
                _ => config.damage_sentinel.clone(),
            };
            let row = EvidenceRow::new(m.id.clone(), shown).target(reference);

            let key = (page.clone(), item.title.clone(), reason.clone());
            match index.get(&key) {
                Some(&idx) => issues[idx].push_evidence(row),
                None => {
                    index.insert(key, issues.len());
                    issues.push(
                        Issue::new(
                            page.clone(),
                            item.title.clone(),
                            IssueKind::Dimension(category),
                            reason,
                            Engine::Dimensional,
                        )
                        .with_evidence(vec![row]),
                    );
                }
            }
        }
    }

    tracing::debug!(issues = issues.len(), "dimensional audit finished");
    issues
}
