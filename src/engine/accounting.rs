//! Accounting reconciliation - item quantities, summary buckets and freight
//!
//! Every item is counted under its local unit rule and checked against the
//! quantity declared in its title. The counted quantity then flows into the
//! summary buckets it matches (scaled by the aggregate rule) and into the
//! freight total (scaled by the freight rule). Buckets and freight are
//! settled against their declared targets once all items are in.

use crate::core::config::AuditConfig;
use crate::core::rules::RuleLookup;
use crate::core::similarity::partial_ratio;
use crate::core::units::UnitRule;
use crate::core::vocab::{self, normalize};
use crate::entities::issue::format_quantity;
use crate::entities::{
    Engine, EvidenceRow, ExtractedItem, Issue, IssueKind, MeasuredValue, SummaryRow,
};

/// Page label for issues raised against the summary table as a whole
pub const SUMMARY_PAGE: &str = "summary";

/// Item label for the freight settlement issue
pub const FREIGHT_ITEM: &str = "freight";

/// Body ids may appear once per item, journal ids once per end
const MAX_BODY_REPEATS: usize = 1;
const MAX_JOURNAL_REPEATS: usize = 2;

// ---------------------------------------------------------------------------
// Mutual exclusion
// ---------------------------------------------------------------------------

/// One row of the mutual-exclusion table: when the bucket title carries
/// `attribute`, the item title must satisfy `item_requires`
pub struct Exclusion {
    pub attribute: &'static str,
    pub bucket_requires: fn(&str) -> bool,
    pub item_requires: fn(&str) -> bool,
}

fn has_body(text: &str) -> bool {
    vocab::contains_any(text, vocab::BODY)
}

fn has_journal(text: &str) -> bool {
    vocab::contains_any(text, vocab::JOURNAL)
}

fn has_weld(text: &str) -> bool {
    vocab::contains_any(text, vocab::WELD)
}

fn reconditioned_only(text: &str) -> bool {
    !vocab::is_un_regen(text) && !has_weld(text)
}

/// Evaluated in order after a fuzzy bucket match
pub const EXCLUSIONS: &[Exclusion] = &[
    Exclusion {
        attribute: "body",
        bucket_requires: has_body,
        item_requires: has_body,
    },
    Exclusion {
        attribute: "journal",
        bucket_requires: has_journal,
        item_requires: has_journal,
    },
    Exclusion {
        attribute: "non-reconditioned",
        bucket_requires: vocab::is_un_regen,
        item_requires: vocab::is_un_regen,
    },
    Exclusion {
        attribute: "reconditioned",
        bucket_requires: vocab::is_reconditioned,
        item_requires: reconditioned_only,
    },
    Exclusion {
        attribute: "welded",
        bucket_requires: has_weld,
        item_requires: has_weld,
    },
];

/// First exclusion rule that rejects pairing an item with a bucket
///
/// Both titles must already be normalized.
pub fn excluded_by(bucket: &str, item: &str) -> Option<&'static str> {
    EXCLUSIONS
        .iter()
        .find(|rule| (rule.bucket_requires)(bucket) && !(rule.item_requires)(item))
        .map(|rule| rule.attribute)
}

// ---------------------------------------------------------------------------
// Buckets
// ---------------------------------------------------------------------------

/// How a summary row collects items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketKind {
    /// Accumulates the computed freight instead of item quantities
    Freight,
    Disassembly,
    Machining,
    Welding,
    /// Direct title similarity, filtered by [`EXCLUSIONS`]
    Fuzzy,
}

impl BucketKind {
    pub fn of(title: &str) -> Self {
        if vocab::contains_any(title, vocab::FREIGHT) {
            BucketKind::Freight
        } else if vocab::contains_any(title, vocab::BUCKET_DISASSEMBLY) {
            BucketKind::Disassembly
        } else if vocab::contains_any(title, vocab::BUCKET_MACHINING) {
            BucketKind::Machining
        } else if vocab::contains_any(title, vocab::BUCKET_WELDING) {
            BucketKind::Welding
        } else {
            BucketKind::Fuzzy
        }
    }
}

#[derive(Debug)]
struct Bucket {
    title: String,
    norm: String,
    page: String,
    kind: BucketKind,
    target: f64,
    actual: f64,
    details: Vec<EvidenceRow>,
}

/// Whether an item (normalized title) joins a bucket
pub fn bucket_accepts(kind: BucketKind, bucket: &str, item: &str, threshold: u8) -> bool {
    let has_part = has_body(item) || has_journal(item);
    match kind {
        BucketKind::Freight => false,
        BucketKind::Disassembly => vocab::contains_any(item, &["組裝", "拆裝", "ASSY"]),
        BucketKind::Machining => {
            has_part
                && (vocab::contains_any(item, vocab::RECONDITION) || vocab::is_un_regen(item))
        }
        BucketKind::Welding => has_part && has_weld(item),
        BucketKind::Fuzzy => {
            partial_ratio(bucket, item) > threshold && excluded_by(bucket, item).is_none()
        }
    }
}

fn build_buckets(summary: &[SummaryRow]) -> Vec<Bucket> {
    let mut buckets: Vec<Bucket> = Vec::new();
    for row in summary {
        let norm = normalize(&row.title);
        if norm.is_empty() {
            continue;
        }
        if buckets.iter().any(|b| b.norm == norm) {
            tracing::debug!(title = %row.title, "duplicate summary row, first one wins");
            continue;
        }
        buckets.push(Bucket {
            title: row.title.clone(),
            page: if row.page.trim().is_empty() {
                SUMMARY_PAGE.to_string()
            } else {
                row.page.trim().to_string()
            },
            kind: BucketKind::of(&norm),
            norm,
            target: row.target(),
            actual: 0.0,
            details: Vec::new(),
        });
    }
    buckets
}

// ---------------------------------------------------------------------------
// Item quantities
// ---------------------------------------------------------------------------

/// Quantity counted for one item
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemQuantity {
    pub actual: f64,
    /// Values were summed as weights or areas
    pub weight_mode: bool,
    /// A summed value was illegible
    pub damaged: bool,
}

/// Count or sum an item under its local rule
pub fn item_quantity(
    item: &ExtractedItem,
    title: &str,
    local: &UnitRule,
    config: &AuditConfig,
) -> ItemQuantity {
    let weight_mode = vocab::contains_any(title, vocab::WEIGHT_UNIT)
        || item.target_quantity > config.weight_mode_target;

    if weight_mode {
        let mut sum = 0.0;
        let mut damaged = false;
        for m in &item.measurements {
            match m.measured(&config.damage_sentinel) {
                MeasuredValue::Damaged => damaged = true,
                MeasuredValue::Number { value, .. } => sum += value,
                MeasuredValue::Blank | MeasuredValue::Unreadable => {}
            }
        }
        return ItemQuantity {
            actual: item.batch_total.unwrap_or(sum),
            weight_mode: true,
            damaged,
        };
    }

    let rows = item.measurements.len() as f64;
    let actual = match local {
        UnitRule::Ratio(_) => local.apply(rows),
        UnitRule::DistinctIds => distinct_ids(item) as f64,
        _ if has_body(title) => distinct_ids(item) as f64,
        _ => rows,
    };
    ItemQuantity {
        actual,
        weight_mode: false,
        damaged: false,
    }
}

fn distinct_ids(item: &ExtractedItem) -> usize {
    let mut seen: Vec<&str> = Vec::new();
    for m in &item.measurements {
        if !seen.contains(&m.id.as_str()) {
            seen.push(&m.id);
        }
    }
    seen.len()
}

/// Freight contribution of an item
///
/// Non-reconditioned body work counts toward freight even without a rule.
pub fn freight_quantity(title: &str, actual: f64, freight: &UnitRule) -> (f64, String) {
    match freight {
        UnitRule::Exempt => (0.0, String::new()),
        UnitRule::Ratio(_) => (freight.apply(actual), format!("counted {}", freight.describe())),
        _ if has_body(title) && vocab::is_un_regen(title) => (actual, "counted".to_string()),
        _ => (0.0, String::new()),
    }
}

/// Ids repeated more often than the item's track allows, in first-seen order
fn repeated_ids(item: &ExtractedItem, limit: usize) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for m in &item.measurements {
        match counts.iter_mut().find(|(id, _)| *id == m.id) {
            Some((_, n)) => *n += 1,
            None => counts.push((m.id.clone(), 1)),
        }
    }
    counts.retain(|(_, n)| *n > limit);
    counts
}

// ---------------------------------------------------------------------------
// Audit
// ---------------------------------------------------------------------------

/// Reconcile items against the summary table and the freight total
pub fn audit(
    items: &[ExtractedItem],
    summary: &[SummaryRow],
    freight_target: f64,
    rules: &dyn RuleLookup,
    config: &AuditConfig,
) -> Vec<Issue> {
    let eps = config.quantity_epsilon;
    let mut issues = Vec::new();

    for row in summary {
        if let Some((applied, delivered)) = row.applied_mismatch(eps) {
            let page = if row.page.trim().is_empty() {
                SUMMARY_PAGE.to_string()
            } else {
                row.page.trim().to_string()
            };
            issues.push(
                Issue::new(
                    page,
                    row.title.clone(),
                    IssueKind::SummaryQuantityMismatch,
                    format!(
                        "applied {} != delivered {}",
                        format_quantity(applied),
                        format_quantity(delivered)
                    ),
                    Engine::Accounting,
                )
                .with_evidence(vec![
                    EvidenceRow::new("applied", format_quantity(applied)),
                    EvidenceRow::new("delivered", format_quantity(delivered)),
                ]),
            );
        }
    }

    let mut buckets = build_buckets(summary);
    let mut freight_sum = 0.0;
    let mut freight_details = Vec::new();

    for item in items {
        if item.measurements.is_empty() {
            tracing::debug!(title = %item.title, "no measurements, skipping reconciliation");
            continue;
        }
        let title = normalize(&item.title);
        let page = item.page_label();
        let rule = rules.lookup(&item.title);
        let local_raw = rule.and_then(|r| r.unit_local.as_deref());
        let local = UnitRule::parse(local_raw);
        let aggregate = UnitRule::parse(rule.and_then(|r| r.unit_aggregate.as_deref()));
        let freight_rule = UnitRule::parse(rule.and_then(|r| r.unit_freight.as_deref()));

        let ItemQuantity {
            actual,
            weight_mode,
            damaged,
        } = item_quantity(item, &title, &local, config);

        if damaged && !local.is_exempt() {
            issues.push(
                Issue::new(
                    page.clone(),
                    item.title.clone(),
                    IssueKind::DamagedData,
                    "unreadable weight value",
                    Engine::Accounting,
                )
                .with_evidence(vec![EvidenceRow::new("warning", config.damage_sentinel.clone())
                    .note("damaged data")]),
            );
        }

        // local check
        let target = item.target_quantity;
        if !local.is_exempt() && target > 0.0 && (actual - target).abs() > eps {
            issues.push(
                Issue::new(
                    page.clone(),
                    item.title.clone(),
                    IssueKind::LocalQuantityMismatch,
                    format!(
                        "title {} != counted {} (rule: {})",
                        format_quantity(target),
                        format_quantity(actual),
                        local_raw.unwrap_or("none")
                    ),
                    Engine::Accounting,
                )
                .with_evidence(vec![
                    EvidenceRow::new("target", format_quantity(target)),
                    EvidenceRow::new("actual", format_quantity(actual))
                        .target(format_quantity(target)),
                ]),
            );
        }

        // duplicate ids
        let repeat_limit = if has_body(&title) {
            Some((MAX_BODY_REPEATS, "body"))
        } else if has_journal(&title) {
            Some((MAX_JOURNAL_REPEATS, "journal"))
        } else {
            None
        };
        if let Some((limit, track)) = repeat_limit {
            for (id, count) in repeated_ids(item, limit) {
                issues.push(
                    Issue::new(
                        page.clone(),
                        item.title.clone(),
                        IssueKind::DuplicateId,
                        format!("{} id {} repeated {} times", track, id, count),
                        Engine::Accounting,
                    )
                    .with_evidence(vec![EvidenceRow::new(id, count.to_string())
                        .target(limit.to_string())]),
                );
            }
        }

        // freight
        let (freight, freight_note) = freight_quantity(&title, actual, &freight_rule);
        if freight > 0.0 {
            freight_sum += freight;
            freight_details.push(
                EvidenceRow::new(item.title.clone(), format_quantity(freight)).note(&freight_note),
            );
        }

        // buckets
        let contribution = aggregate.apply(actual);
        let contribution_note = if aggregate.is_identity() {
            "counted".to_string()
        } else {
            format!("counted {}", aggregate.describe())
        };
        for bucket in buckets.iter_mut() {
            if bucket.kind == BucketKind::Freight {
                if freight > 0.0 {
                    bucket.actual += freight;
                    bucket.details.push(
                        EvidenceRow::new(item.title.clone(), format_quantity(freight))
                            .note(&freight_note),
                    );
                }
                continue;
            }
            if aggregate.is_exempt() {
                continue;
            }
            if bucket_accepts(bucket.kind, &bucket.norm, &title, config.bucket_similarity_threshold)
            {
                tracing::debug!(bucket = %bucket.title, item = %item.title, contribution, "bucket match");
                bucket.actual += contribution;
                bucket.details.push(
                    EvidenceRow::new(
                        format!("{} (P.{})", item.title, page),
                        format_quantity(contribution),
                    )
                    .note(&contribution_note),
                );
            }
        }

        tracing::debug!(
            title = %item.title,
            actual,
            weight_mode,
            freight,
            "reconciled item"
        );
    }

    // settlement
    for bucket in buckets {
        if bucket.target > 0.0 && (bucket.actual - bucket.target).abs() > eps {
            let mut evidence = vec![EvidenceRow::new("baseline", format_quantity(bucket.target))];
            evidence.extend(bucket.details);
            evidence.push(
                EvidenceRow::new("actual", format_quantity(bucket.actual))
                    .target(format_quantity(bucket.target)),
            );
            issues.push(
                Issue::new(
                    bucket.page,
                    bucket.title,
                    IssueKind::TotalQuantityMismatch,
                    format!(
                        "declared {} != actual {}",
                        format_quantity(bucket.target),
                        format_quantity(bucket.actual)
                    ),
                    Engine::Accounting,
                )
                .with_evidence(evidence),
            );
        }
    }

    if freight_target > 0.0 && (freight_sum - freight_target).abs() > eps {
        let mut evidence = vec![EvidenceRow::new("baseline", format_quantity(freight_target))];
        evidence.extend(freight_details);
        evidence.push(
            EvidenceRow::new("actual", format_quantity(freight_sum))
                .target(format_quantity(freight_target)),
        );
        issues.push(
            Issue::new(
                SUMMARY_PAGE,
                FREIGHT_ITEM,
                IssueKind::FreightMismatch,
                format!(
                    "declared {} != actual {}",
                    format_quantity(freight_target),
                    format_quantity(freight_sum)
                ),
                Engine::Accounting,
            )
            .with_evidence(evidence),
        );
    }

    tracing::debug!(issues = issues.len(), freight = freight_sum, "accounting audit finished");
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rules::RuleTable;
    use crate::entities::RuleRecord;

    fn config() -> AuditConfig {
        AuditConfig::default()
    }

    fn kinds(issues: &[Issue]) -> Vec<IssueKind> {
        issues.iter().map(|i| i.kind.clone()).collect()
    }

    #[test]
    fn test_exclusion_table() {
        let n = |s: &str| normalize(s);
        assert_eq!(excluded_by(&n("本體未再生"), &n("軸頸未再生")), Some("body"));
        assert_eq!(excluded_by(&n("軸頸車修"), &n("本體車修")), Some("journal"));
        assert_eq!(excluded_by(&n("本體未再生"), &n("本體再生")), Some("non-reconditioned"));
        assert_eq!(excluded_by(&n("本體再生"), &n("本體未再生")), Some("reconditioned"));
        assert_eq!(excluded_by(&n("本體再生"), &n("本體銲補再生")), Some("reconditioned"));
        assert_eq!(excluded_by(&n("本體銲補"), &n("本體再生")), Some("welded"));
        assert_eq!(excluded_by(&n("本體再生"), &n("本體再生車修")), None);
        assert_eq!(excluded_by(&n("ROLL拆裝"), &n("軸承組裝")), None);
    }

    #[test]
    fn test_bucket_kind() {
        assert_eq!(BucketKind::of("運費"), BucketKind::Freight);
        assert_eq!(BucketKind::of("ROLL拆裝"), BucketKind::Disassembly);
        assert_eq!(BucketKind::of("ROLL-RECOND"), BucketKind::Machining);
        assert_eq!(BucketKind::of("ROLL銲補"), BucketKind::Welding);
        assert_eq!(BucketKind::of("本體未再生"), BucketKind::Fuzzy);
    }

    #[test]
    fn test_canonical_buckets() {
        assert!(bucket_accepts(BucketKind::Machining, "", "本體再生車修", 90));
        assert!(bucket_accepts(BucketKind::Machining, "", "軸頸粗車", 90));
        assert!(!bucket_accepts(BucketKind::Machining, "", "再生車修", 90));
        assert!(bucket_accepts(BucketKind::Welding, "", "軸頸銲補", 90));
        assert!(!bucket_accepts(BucketKind::Welding, "", "軸頸研磨", 90));
        assert!(bucket_accepts(BucketKind::Disassembly, "", "ROLL組裝", 90));
    }

    #[test]
    fn test_fuzzy_bucket_filtered_by_exclusion() {
        let bucket = normalize("本體未再生");
        assert!(bucket_accepts(BucketKind::Fuzzy, &bucket, &normalize("本體未再生(4PC)"), 90));
        // contains the bucket name but is the opposite action
        assert!(!bucket_accepts(BucketKind::Fuzzy, &normalize("再生"), &normalize("本體未再生"), 90));
    }

    #[test]
    fn test_bucket_total_mismatch() {
        let summary = vec![
            SummaryRow::new("ROLL-RECOND", 10.0),
            SummaryRow::new("ROLL-RECOND", 10.0),
        ];
        let items = vec![
            ExtractedItem::new("2", "本體再生車修").with_measurements("A1:300.01|A2:300.02|A3:300.00|A4:300.01"),
            ExtractedItem::new("3", "軸頸再生車修").with_measurements("A1:150.01|A1:150.02|A2:150.01|A2:150.00"),
        ];
        let issues = audit(&items, &summary, 0.0, &RuleTable::empty(), &config());

        assert_eq!(issues.len(), 1);
        let issue = &issues[0];
        assert_eq!(issue.kind, IssueKind::TotalQuantityMismatch);
        assert_eq!(issue.reason, "declared 10 != actual 8");
        assert_eq!(issue.evidence.first().unwrap().value, "10");
        let last = issue.evidence.last().unwrap();
        assert_eq!(last.value, "8");
        assert_eq!(last.target.as_deref(), Some("10"));
        assert_eq!(issue.evidence.len(), 4);
    }

    #[test]
    fn test_local_mismatch_and_ratio() {
        let rules = RuleTable::new(vec![RuleRecord::new("軸承組裝").with_local("1SET=2")]);
        let items = vec![
            ExtractedItem::new("1", "軸承組裝(2SET)")
                .with_target(2.0)
                .with_measurements("A:1|B:1|C:1|D:1"),
            ExtractedItem::new("1", "軸頸研磨(3PC)")
                .with_target(3.0)
                .with_measurements("A:1.00|B:1.00"),
        ];
        let issues = audit(&items, &[], 0.0, &rules, &config());
        assert_eq!(kinds(&issues), vec![IssueKind::LocalQuantityMismatch]);
        assert_eq!(issues[0].item, "軸頸研磨(3PC)");
        assert_eq!(issues[0].reason, "title 3 != counted 2 (rule: none)");
    }

    #[test]
    fn test_body_counts_distinct_ids() {
        let items = vec![ExtractedItem::new("1", "本體再生")
            .with_target(2.0)
            .with_measurements("A:300.00|A:300.01|B:300.00")];
        let issues = audit(&items, &[], 0.0, &RuleTable::empty(), &config());
        // two distinct ids match the title, the repeat is only a warning
        assert_eq!(kinds(&issues), vec![IssueKind::DuplicateId]);
        assert_eq!(issues[0].reason, "body id A repeated 2 times");
    }

    #[test]
    fn test_journal_allows_two_repeats() {
        let items = vec![ExtractedItem::new("1", "軸頸研磨")
            .with_measurements("A:1.00|A:1.00|B:1.00|B:1.00|B:1.00")];
        let issues = audit(&items, &[], 0.0, &RuleTable::empty(), &config());
        assert_eq!(kinds(&issues), vec![IssueKind::DuplicateId]);
        assert_eq!(issues[0].reason, "journal id B repeated 3 times");
    }

    #[test]
    fn test_weight_mode_sums_values() {
        let items = vec![ExtractedItem::new("4", "銲材(KG)")
            .with_target(12.5)
            .with_measurements("A:5.5|B:7|C:[!]")];
        let issues = audit(&items, &[], 0.0, &RuleTable::empty(), &config());
        assert_eq!(kinds(&issues), vec![IssueKind::DamagedData]);

        let rules = RuleTable::new(vec![RuleRecord::new("銲材(KG)").with_local("豁免")]);
        assert!(audit(&items, &[], 0.0, &rules, &config()).is_empty());
    }

    #[test]
    fn test_weight_mode_batch_total_override() {
        let mut item = ExtractedItem::new("4", "銲材KG")
            .with_target(20.0)
            .with_measurements("A:5|B:7");
        item.batch_total = Some(20.0);
        assert!(audit(&[item], &[], 0.0, &RuleTable::empty(), &config()).is_empty());
    }

    #[test]
    fn test_exempt_local_rule_skips_check() {
        let rules = RuleTable::new(vec![RuleRecord::new("軸頸研磨").with_local("豁免")]);
        let items = vec![ExtractedItem::new("1", "軸頸研磨")
            .with_target(5.0)
            .with_measurements("A:1.00")];
        assert!(audit(&items, &[], 0.0, &rules, &config()).is_empty());
    }

    #[test]
    fn test_freight_default_and_ratio() {
        let rules = RuleTable::new(vec![RuleRecord::new("軸頸銲補").with_freight("2:1")]);
        let items = vec![
            ExtractedItem::new("1", "本體未再生").with_measurements("A:300|B:301"),
            ExtractedItem::new("2", "軸頸銲補").with_measurements("A:150|A:150"),
            ExtractedItem::new("3", "軸頸研磨").with_measurements("A:1.00"),
        ];
        let summary = vec![SummaryRow::new("運費", 3.0)];

        // 2 (default) + 2/2 (ratio) = 3
        let issues = audit(&items, &summary, 3.0, &rules, &config());
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);

        let issues = audit(&items, &summary, 4.0, &rules, &config());
        assert_eq!(kinds(&issues), vec![IssueKind::FreightMismatch]);
        assert_eq!(issues[0].reason, "declared 4 != actual 3");
        assert_eq!(issues[0].evidence.len(), 4);
    }

    #[test]
    fn test_aggregate_rule_scales_and_exempts() {
        let rules = RuleTable::new(vec![
            RuleRecord::new("軸頸再生").with_aggregate("1/2"),
            RuleRecord::new("本體再生").with_aggregate("豁免"),
        ]);
        let items = vec![
            ExtractedItem::new("1", "軸頸再生").with_measurements("A:1.00|B:1.00|C:1.00|D:1.00"),
            ExtractedItem::new("2", "本體再生").with_measurements("A:1.00|B:1.00"),
        ];
        let summary = vec![SummaryRow::new("ROLL車修", 2.0)];
        assert!(audit(&items, &summary, 0.0, &rules, &config()).is_empty());
    }

    #[test]
    fn test_duplicate_summary_rows_first_wins() {
        let summary = vec![
            SummaryRow::new("ROLL拆裝", 10.0),
            SummaryRow::new("ROLL 拆裝", 3.0),
        ];
        let issues = audit(&[], &summary, 0.0, &RuleTable::empty(), &config());
        assert_eq!(kinds(&issues), vec![IssueKind::TotalQuantityMismatch]);
        assert_eq!(issues[0].item, "ROLL拆裝");
        assert_eq!(issues[0].evidence[0].id, "baseline");
        assert_eq!(issues[0].evidence[0].value, "10");
    }

    #[test]
    fn test_summary_applied_mismatch() {
        let summary = vec![SummaryRow::new("ROLL拆裝", 10.0).with_applied(12.0)];
        let issues = audit(&[], &summary, 0.0, &RuleTable::empty(), &config());
        assert_eq!(
            kinds(&issues),
            vec![IssueKind::SummaryQuantityMismatch, IssueKind::TotalQuantityMismatch]
        );
        assert_eq!(issues[0].reason, "applied 12 != delivered 10");
    }

    #[test]
    fn test_items_without_measurements_skipped() {
        let items = vec![ExtractedItem::new("1", "本體再生").with_target(4.0)];
        assert!(audit(&items, &[], 0.0, &RuleTable::empty(), &config()).is_empty());
    }
}
