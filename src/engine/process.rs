//! Process traceability - per-part stage histories
//!
//! Every measurement of an item with a known track and stage is recorded
//! under (part id, track). Parts with at least two recorded stages are then
//! checked for missing intermediate stages and for size ordering between
//! stages.

use serde::Serialize;
use std::collections::BTreeMap;

use super::classifier::track_and_stage;
use crate::core::config::AuditConfig;
use crate::core::rules::RuleLookup;
use crate::entities::issue::format_quantity;
use crate::entities::{
    Engine, EvidenceRow, ExtractedItem, Issue, IssueKind, MeasuredValue, Stage, Track,
};

/// One recorded stage of a part
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageRecord {
    pub value: f64,
    pub page: String,
    pub title: String,
}

/// (part id, track) -> stage -> record
pub type StageHistory = BTreeMap<(String, Track), BTreeMap<Stage, StageRecord>>;

/// Build stage histories; a later item overwrites an earlier record of the
/// same stage
pub fn build_history(
    items: &[ExtractedItem],
    rules: &dyn RuleLookup,
    config: &AuditConfig,
) -> StageHistory {
    let mut history = StageHistory::new();

    for item in items {
        let (track, stage) = track_and_stage(&item.title, rules.lookup(&item.title));
        let (Some(track), Some(stage)) = (track, stage) else {
            continue;
        };

        for m in &item.measurements {
            let MeasuredValue::Number { value, .. } = m.measured(&config.damage_sentinel) else {
                continue;
            };
            let id = m.id.trim();
            if id.is_empty() {
                continue;
            }
            history.entry((id.to_string(), track)).or_default().insert(
                stage,
                StageRecord {
                    value,
                    page: item.page_label(),
                    title: item.title.clone(),
                },
            );
        }
    }

    history
}

/// Stages below the furthest recorded one that have no record
pub fn missing_stages(stages: &BTreeMap<Stage, StageRecord>) -> Vec<Stage> {
    let Some(max) = stages.keys().next_back().copied() else {
        return Vec::new();
    };
    Stage::ALL
        .into_iter()
        .filter(|s| *s < max && !stages.contains_key(s))
        .collect()
}

/// Whether two stage values violate the size ordering; `a` precedes `b`
/// in process order
pub fn size_violation(a: Stage, va: f64, b: Stage, vb: f64) -> bool {
    if a.size_rank() < b.size_rank() {
        va >= vb
    } else {
        va <= vb
    }
}

/// Check completeness and size ordering of every part history
pub fn audit(items: &[ExtractedItem], rules: &dyn RuleLookup, config: &AuditConfig) -> Vec<Issue> {
    let history = build_history(items, rules, config);
    let mut issues = Vec::new();

    for ((id, track), stages) in &history {
        if stages.len() < 2 {
            continue;
        }

        let missing = missing_stages(stages);
        if let Some((max_stage, last)) = stages.iter().next_back() {
            if !missing.is_empty() {
                let names: Vec<&str> = missing.iter().map(|s| s.label()).collect();
                issues.push(
                    Issue::new(
                        last.page.clone(),
                        last.title.clone(),
                        IssueKind::TraceabilityGap,
                        format!(
                            "[{}] reached {}, missing: {}",
                            track,
                            max_stage,
                            names.join(", ")
                        ),
                        Engine::Process,
                    )
                    .with_evidence(vec![
                        EvidenceRow::new(id.clone(), "missing").note("incomplete history")
                    ]),
                );
            }
        }

        let present: Vec<(&Stage, &StageRecord)> = stages.iter().collect();
        for (i, (a, ra)) in present.iter().enumerate() {
            for (b, rb) in present.iter().skip(i + 1) {
                if !size_violation(**a, ra.value, **b, rb.value) {
                    continue;
                }
                let sign = if a.size_rank() < b.size_rank() { "<" } else { ">" };
                issues.push(
                    Issue::new(
                        rb.page.clone(),
                        format!("[{}] size check", track),
                        IssueKind::SizeOrder,
                        format!("{} should be {} {}", a, sign, b),
                        Engine::Process,
                    )
                    .with_evidence(vec![
                        EvidenceRow::new(format!("{} ({})", id, a), format_quantity(ra.value))
                            .note("earlier stage"),
                        EvidenceRow::new(format!("{} ({})", id, b), format_quantity(rb.value))
                            .note("later stage"),
                    ]),
                );
            }
        }
    }

    tracing::debug!(parts = history.len(), issues = issues.len(), "process audit finished");
    issues
}
