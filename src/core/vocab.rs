//! Domain vocabulary shared by the classifier and the engines
//!
//! Titles on delivery documents mix Traditional Chinese process names with a
//! handful of English abbreviations. Every keyword set below is matched
//! against [`normalize`]d text, so English entries are upper case.

use crate::entities::{Stage, Track};

/// Balancing and heat-treatment items are never dimension-audited
pub const EXEMPT_PROCESS: &[&str] = &["平衡", "熱處理", "BALANC", "HEAT"];

/// Rule-table tokens marking an item as exempt
pub const EXEMPTION: &[&str] = &["豁免", "EXEMPT"];

pub const WELD: &[&str] = &["銲補", "銲接", "WELD"];

/// Non-reconditioned: rough turning without rebuilding the dimension
pub const UN_REGEN: &[&str] = &["未再生", "UN_REGEN", "UNREGEN", "粗車"];

pub const JOURNAL: &[&str] = &["軸頸", "內孔", "JOURNAL"];

pub const BODY: &[&str] = &["本體", "BODY"];

/// Reconditioning and finishing work
pub const REGEN: &[&str] = &[
    "再生", "研磨", "精加工", "車修", "KEYWAY", "GRIND", "MACHIN", "精車",
];

pub const ASSEMBLY: &[&str] = &["組裝", "拆裝", "裝配", "真圓度", "ASSY"];

pub const GRIND: &[&str] = &["研磨", "GRIND"];

/// Actions that put an item into the reconditioning stage
pub const RECONDITION: &[&str] = &["再生", "精車"];

/// Weight/area items are summed instead of counted
pub const WEIGHT_UNIT: &[&str] = &["KG"];

pub const FREIGHT: &[&str] = &["運費", "FREIGHT"];

/// Canonical disassembly/assembly bucket
pub const BUCKET_DISASSEMBLY: &[&str] = &["ROLL拆裝", "ROLL-DISASSEMBLY"];

/// Canonical machining (reconditioning) bucket
pub const BUCKET_MACHINING: &[&str] = &["ROLL車修", "ROLL-RECOND"];

/// Canonical welding bucket
pub const BUCKET_WELDING: &[&str] = &["ROLL銲補", "ROLL-WELD"];

/// Strip whitespace and quotes, fold to upper case
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '"' | '\'' | '\u{3000}'))
        .collect::<String>()
        .to_uppercase()
}

/// Whether `text` (already normalized) contains any keyword of `set`
pub fn contains_any(text: &str, set: &[&str]) -> bool {
    set.iter().any(|k| text.contains(k))
}

/// Whether the text names a non-reconditioned action
pub fn is_un_regen(text: &str) -> bool {
    contains_any(text, UN_REGEN)
}

/// Whether the text names a reconditioning action that is not a
/// non-reconditioned one (`未再生` contains `再生`)
pub fn is_reconditioned(text: &str) -> bool {
    contains_any(text, RECONDITION) && !is_un_regen(text)
}

/// Physical track named by a normalized title, body first
pub fn track_of(text: &str) -> Option<Track> {
    if contains_any(text, BODY) {
        Some(Track::Body)
    } else if contains_any(text, JOURNAL) {
        Some(Track::Journal)
    } else {
        None
    }
}

/// Process stage named by a normalized title
///
/// Precedence: ground, welded, non-reconditioned, reconditioned.
pub fn stage_of(text: &str) -> Option<Stage> {
    if contains_any(text, GRIND) {
        Some(Stage::Ground)
    } else if contains_any(text, WELD) {
        Some(Stage::Welded)
    } else if is_un_regen(text) {
        Some(Stage::NonReconditioned)
    } else if contains_any(text, RECONDITION) {
        Some(Stage::Reconditioned)
    } else {
        None
    }
}
