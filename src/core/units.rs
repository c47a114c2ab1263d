//! Unit-conversion rules from the rule table
//!
//! A rule string is a ratio expression, an exemption token or empty. The
//! forms seen on rule tables:
//!
//! - `1SET=4` - four measured rows make one counted unit
//! - `2:1` / `2=1` - two counted units make one freight unit
//! - `3/2` - multiply by three halves
//! - `PC=PC` - count distinct part ids rather than rows
//! - `豁免` / `EXEMPT` - not counted at all

use regex::Regex;
use std::sync::LazyLock;

use super::vocab::{self, EXEMPTION};

static SET_RATIO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"1SET=(\d+\.?\d*)").expect("valid set-ratio pattern"));

static TO_ONE_RATIO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.?\d*)=1(?:[^\d.]|$)").expect("valid to-one pattern"));

static FRACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+\.?\d*)/(\d+\.?\d*)").expect("valid fraction pattern")
});

/// Resolved unit-conversion rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnitRule {
    /// Item is not counted
    Exempt,
    /// Multiply the quantity by this factor
    Ratio(f64),
    /// Count distinct part ids instead of rows
    DistinctIds,
    /// No rule, quantity passes through unchanged
    PassThrough,
}

impl Default for UnitRule {
    fn default() -> Self {
        UnitRule::PassThrough
    }
}

/// Canonical form of a rule string: upper case, no spaces, full-width
/// `＝` and `：` and ASCII `:` all folded to `=`
pub fn normalize_rule(raw: &str) -> String {
    vocab::normalize(raw)
        .chars()
        .map(|c| match c {
            '＝' | '：' | ':' => '=',
            other => other,
        })
        .collect()
}

impl UnitRule {
    /// Parse a rule string; anything unrecognised passes through
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return UnitRule::PassThrough;
        };
        let norm = normalize_rule(raw);
        if norm.is_empty() || norm == "NAN" {
            return UnitRule::PassThrough;
        }
        if vocab::contains_any(&norm, EXEMPTION) {
            return UnitRule::Exempt;
        }
        if let Some(n) = capture_number(&SET_RATIO, &norm, 1) {
            return divide_by(n);
        }
        if let Some(n) = capture_number(&TO_ONE_RATIO, &norm, 1) {
            return divide_by(n);
        }
        if norm.contains("PC=PC") {
            return UnitRule::DistinctIds;
        }
        if let Some(caps) = FRACTION.captures(&norm) {
            let num = caps[1].parse::<f64>().ok();
            let den = caps[2].parse::<f64>().ok();
            if let (Some(num), Some(den)) = (num, den) {
                if den != 0.0 {
                    return UnitRule::Ratio(num / den);
                }
            }
        }
        tracing::debug!(rule = raw, "unrecognised unit rule, passing through");
        UnitRule::PassThrough
    }

    pub fn is_exempt(&self) -> bool {
        matches!(self, UnitRule::Exempt)
    }

    /// Multiplicative factor; exempt rules contribute nothing
    pub fn factor(&self) -> f64 {
        match self {
            UnitRule::Exempt => 0.0,
            UnitRule::Ratio(f) => *f,
            UnitRule::DistinctIds | UnitRule::PassThrough => 1.0,
        }
    }

    /// Apply the rule to a quantity
    pub fn apply(&self, quantity: f64) -> f64 {
        quantity * self.factor()
    }

    /// Whether the rule changes the quantity at all
    pub fn is_identity(&self) -> bool {
        match self {
            UnitRule::Ratio(f) => (*f - 1.0).abs() < f64::EPSILON,
            UnitRule::DistinctIds | UnitRule::PassThrough => true,
            UnitRule::Exempt => false,
        }
    }

    /// Short description for evidence notes, e.g. `x1/4`
    pub fn describe(&self) -> String {
        match self {
            UnitRule::Exempt => "exempt".to_string(),
            UnitRule::Ratio(f) if *f != 0.0 && *f < 1.0 => {
                format!("x1/{}", crate::entities::issue::format_quantity(1.0 / f))
            }
            UnitRule::Ratio(f) => format!("x{}", crate::entities::issue::format_quantity(*f)),
            UnitRule::DistinctIds => "distinct ids".to_string(),
            UnitRule::PassThrough => "x1".to_string(),
        }
    }
}

fn capture_number(re: &Regex, text: &str, group: usize) -> Option<f64> {
    re.captures(text)
        .and_then(|caps| caps.get(group))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// A zero divisor is treated as one
fn divide_by(divisor: f64) -> UnitRule {
    if divisor == 0.0 {
        UnitRule::Ratio(1.0)
    } else {
        UnitRule::Ratio(1.0 / divisor)
    }
}
