//! Item classifier - assigns each extracted item an acceptance category

use crate::core::rules::RuleLookup;
use crate::core::vocab::{self, normalize};
use crate::entities::{Category, ExtractedItem, RuleRecord, Stage, Track};

/// Category for a title, consulting the rule first
///
/// Decision order, first match wins:
/// 1. balancing / heat-treatment vocabulary in the title
/// 2. the rule's category override
/// 3. keyword precedence on the title
pub fn classify(title: &str, rule: Option<&RuleRecord>) -> Category {
    let text = normalize(title);
    if vocab::contains_any(&text, vocab::EXEMPT_PROCESS) {
        return Category::Exempt;
    }

    if let Some(category) = rule
        .and_then(|r| r.category_override.as_deref())
        .and_then(category_from_override)
    {
        return category;
    }

    classify_keywords(&text)
}

/// Category named by a rule-table override string
///
/// Accepts a category name outright, otherwise scans for tokens in the order
/// exempt, range, min, max, un-regen.
pub fn category_from_override(raw: &str) -> Option<Category> {
    if let Ok(category) = raw.parse::<Category>() {
        return Some(category);
    }

    let text = normalize(raw);
    if text.is_empty() {
        return None;
    }
    if vocab::contains_any(&text, vocab::EXEMPTION) {
        return Some(Category::Exempt);
    }
    if !vocab::is_un_regen(&text)
        && (text.contains("RANGE") || vocab::contains_any(&text, vocab::REGEN))
    {
        return Some(Category::Range);
    }
    if text.contains("MIN") || vocab::contains_any(&text, vocab::WELD) {
        return Some(Category::MinLimit);
    }
    if text.contains("MAX") || vocab::contains_any(&text, vocab::JOURNAL) {
        return Some(Category::MaxLimit);
    }
    if vocab::is_un_regen(&text) || vocab::contains_any(&text, vocab::BODY) {
        return Some(Category::UnRegen);
    }
    None
}

/// Keyword fallback on a normalized title
///
/// Weld and non-reconditioned vocabulary are checked before the broader
/// finishing words, which co-occur in real titles.
pub fn classify_keywords(text: &str) -> Category {
    if vocab::contains_any(text, vocab::WELD) {
        return Category::MinLimit;
    }
    if vocab::is_un_regen(text) {
        if vocab::contains_any(text, vocab::JOURNAL) {
            return Category::MaxLimit;
        }
        return Category::UnRegen;
    }
    if vocab::contains_any(text, vocab::REGEN) || vocab::contains_any(text, vocab::ASSEMBLY) {
        return Category::Range;
    }
    Category::Unknown
}

/// Track and process stage of an item, override text first
pub fn track_and_stage(title: &str, rule: Option<&RuleRecord>) -> (Option<Track>, Option<Stage>) {
    let text = normalize(title);
    let override_text = rule
        .and_then(|r| r.category_override.as_deref())
        .map(normalize)
        .unwrap_or_default();

    let track = vocab::track_of(&override_text).or_else(|| vocab::track_of(&text));
    let stage = vocab::stage_of(&override_text).or_else(|| vocab::stage_of(&text));
    (track, stage)
}

/// Classify every item, overwriting whatever category the extraction set
pub fn classify_items(items: &[ExtractedItem], rules: &dyn RuleLookup) -> Vec<ExtractedItem> {
    items
        .iter()
        .map(|item| {
            let rule = rules.lookup(&item.title);
            let category = classify(&item.title, rule);
            tracing::debug!(
                title = %item.title,
                rule = rule.map(|r| r.item_name.as_str()).unwrap_or("-"),
                %category,
                "classified item"
            );
            let mut classified = item.clone();
            classified.category = Some(category);
            classified
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rules::RuleTable;

    #[test]
    fn test_exempt_keywords_win() {
        let rule = RuleRecord::new("動平衡").with_override("range");
        assert_eq!(classify("ROLL動平衡", Some(&rule)), Category::Exempt);
        assert_eq!(classify("本體熱處理再生", None), Category::Exempt);
    }

    #[test]
    fn test_rule_override() {
        let rule = RuleRecord::new("x").with_override("max_limit");
        assert_eq!(classify("本體再生車修", Some(&rule)), Category::MaxLimit);

        let rule = RuleRecord::new("x").with_override("豁免");
        assert_eq!(classify("本體再生車修", Some(&rule)), Category::Exempt);

        let rule = RuleRecord::new("x").with_override("未再生");
        assert_eq!(classify("車修", Some(&rule)), Category::UnRegen);

        let rule = RuleRecord::new("x").with_override("軸頸未再生");
        assert_eq!(classify("車修", Some(&rule)), Category::MaxLimit);
    }

    #[test]
    fn test_unusable_override_falls_back() {
        let rule = RuleRecord::new("x").with_override("see drawing");
        assert_eq!(classify("本體銲補", Some(&rule)), Category::MinLimit);
        assert_eq!(classify("本體銲補", None), Category::MinLimit);
    }

    #[test]
    fn test_keyword_precedence() {
        // weld beats finishing
        assert_eq!(classify("本體銲補後再生車修", None), Category::MinLimit);
        // non-reconditioned beats finishing, and 未再生 contains 再生
        assert_eq!(classify("本體未再生車修", None), Category::UnRegen);
        assert_eq!(classify("軸頸粗車", None), Category::MaxLimit);
        assert_eq!(classify("軸頸研磨", None), Category::Range);
        assert_eq!(classify("ROLL組裝", None), Category::Range);
        assert_eq!(classify("運費", None), Category::Unknown);
    }

    #[test]
    fn test_track_and_stage() {
        assert_eq!(
            track_and_stage("本體未再生", None),
            (Some(Track::Body), Some(Stage::NonReconditioned))
        );
        let rule = RuleRecord::new("x").with_override("研磨");
        assert_eq!(
            track_and_stage("軸頸車修", Some(&rule)),
            (Some(Track::Journal), Some(Stage::Ground))
        );
        assert_eq!(track_and_stage("拆裝", None), (None, None));
    }

    #[test]
    fn test_classify_items_overwrites_extraction() {
        let items = vec![ExtractedItem::new("1", "本體再生車修").with_category(Category::Exempt)];
        let out = classify_items(&items, &RuleTable::empty());
        assert_eq!(out[0].category, Some(Category::Range));
        assert_eq!(items[0].category, Some(Category::Exempt));
    }
}
