//! Spec parser - free-text tolerance specs to numeric acceptance criteria
//!
//! Three notations are recognised per segment, tried in order:
//!
//! 1. `base±offset` (`300±0.1`, `±0.05`)
//! 2. tilde or dash ranges (`135~129`, `129-135`) when the two ends are close
//! 3. a base followed by signed offsets (`140 -0.01 -0.03`)
//!
//! Segments are delimited by numeral bullets (`一`..`六`), semicolons and
//! newlines.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static SEGMENT_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[一二三四五六]|[;；\n]").expect("valid segment pattern"));

static PLUS_MINUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.?\d*)?±(\d+\.?\d*)").expect("valid plus-minus pattern"));

static TILDE_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.?\d*)[~～-](\d+\.?\d*)").expect("valid range pattern"));

static SIGNED_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-+]?\d+\.?\d*").expect("valid number pattern"));

static UNIT_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.?\d*)(?:mm|MM)").expect("valid unit pattern"));

/// Small integers that show up in spec text as bullets and item indexes
const NOISE: [f64; 10] = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];

/// A closed numeric range `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AcceptanceInterval {
    pub min: f64,
    pub max: f64,
}

impl AcceptanceInterval {
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            min: round4(a.min(b)),
            max: round4(a.max(b)),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

impl std::fmt::Display for AcceptanceInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use crate::entities::issue::format_quantity;
        write!(f, "[{}, {}]", format_quantity(self.min), format_quantity(self.max))
    }
}

/// Numeric acceptance criteria parsed from a spec string
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedSpec {
    pub intervals: Vec<AcceptanceInterval>,
    /// Reference numbers judged to be real acceptance boundaries, in order
    /// of appearance, without duplicates
    pub trusted: Vec<f64>,
}

impl ParsedSpec {
    /// Largest trusted number, if any
    pub fn max_trusted(&self) -> Option<f64> {
        self.trusted.iter().copied().reduce(f64::max)
    }

    /// Largest trusted number at or above `floor`
    pub fn max_trusted_at_least(&self, floor: f64) -> Option<f64> {
        self.trusted
            .iter()
            .copied()
            .filter(|n| *n >= floor)
            .reduce(f64::max)
    }

    /// Trusted number closest to `value`; the first one wins a tie
    pub fn nearest_trusted(&self, value: f64) -> Option<f64> {
        let mut best: Option<f64> = None;
        for &n in &self.trusted {
            match best {
                Some(b) if (b - value).abs() <= (n - value).abs() => {}
                _ => best = Some(n),
            }
        }
        best
    }

    /// Intervals rendered for evidence, e.g. `[299.9, 300.1]`
    pub fn describe_intervals(&self) -> String {
        self.intervals
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Parse a spec string; `min_magnitude` separates bases from offsets and
/// trusted numbers from noise
pub fn parse_spec(text: &str, min_magnitude: f64) -> ParsedSpec {
    let text = text.replace('"', "");
    ParsedSpec {
        intervals: parse_intervals(&text, min_magnitude),
        trusted: trusted_numbers(&text, min_magnitude),
    }
}

fn parse_intervals(text: &str, min_magnitude: f64) -> Vec<AcceptanceInterval> {
    let mut intervals = Vec::new();

    for segment in SEGMENT_SPLIT.split(text) {
        let part: String = segment
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .replace("mm", "")
            .replace("MM", "");
        if part.is_empty() {
            continue;
        }

        if PLUS_MINUS.is_match(&part) {
            for caps in PLUS_MINUS.captures_iter(&part) {
                let base = caps
                    .get(1)
                    .and_then(|m| m.as_str().parse::<f64>().ok())
                    .unwrap_or(0.0);
                let Some(offset) = caps.get(2).and_then(|m| m.as_str().parse::<f64>().ok())
                else {
                    continue;
                };
                intervals.push(AcceptanceInterval::new(base - offset, base + offset));
            }
            continue;
        }

        if let Some(caps) = TILDE_RANGE.captures(&part) {
            let a = caps[1].parse::<f64>().ok();
            let b = caps[2].parse::<f64>().ok();
            if let (Some(a), Some(b)) = (a, b) {
                // a tolerance pair like 160-0.01 is not a range
                if (a - b).abs() < a * 0.5 {
                    intervals.push(AcceptanceInterval::new(a, b));
                    continue;
                }
            }
        }

        let mut bases = Vec::new();
        let mut offsets = Vec::new();
        for m in SIGNED_NUMBER.find_iter(&part) {
            let Ok(value) = m.as_str().parse::<f64>() else {
                continue;
            };
            if value > min_magnitude {
                bases.push(value);
            } else if value.abs() < min_magnitude {
                offsets.push(value);
            }
        }

        for base in bases {
            if offsets.is_empty() {
                intervals.push(AcceptanceInterval::new(base, base));
                continue;
            }
            let mut endpoints: Vec<f64> = offsets.iter().map(|o| round4(base + o)).collect();
            if endpoints.len() == 1 {
                endpoints.push(base);
            }
            let lo = endpoints.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = endpoints.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            intervals.push(AcceptanceInterval::new(lo, hi));
        }
    }

    intervals
}

fn trusted_numbers(text: &str, min_magnitude: f64) -> Vec<f64> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();

    let mut trusted: Vec<f64> = Vec::new();
    let mut push = |n: f64| {
        if !trusted.contains(&n) {
            trusted.push(n);
        }
    };

    for caps in UNIT_NUMBER.captures_iter(&compact) {
        if let Ok(n) = caps[1].parse::<f64>() {
            if n > 0.0 {
                push(n);
            }
        }
    }
    for m in SIGNED_NUMBER.find_iter(&compact) {
        if let Ok(n) = m.as_str().parse::<f64>() {
            if !NOISE.contains(&n) && n > min_magnitude {
                push(n);
            }
        }
    }

    trusted
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ParsedSpec {
        parse_spec(text, 10.0)
    }

    #[test]
    fn test_plus_minus() {
        let spec = parse("300±0.1mm");
        assert_eq!(spec.intervals, vec![AcceptanceInterval::new(299.9, 300.1)]);
        assert!(spec.intervals[0].contains(300.05));
        assert!(!spec.intervals[0].contains(300.15));
    }

    #[test]
    fn test_plus_minus_without_base() {
        let spec = parse("±0.05");
        assert_eq!(spec.intervals, vec![AcceptanceInterval::new(-0.05, 0.05)]);
    }

    #[test]
    fn test_tilde_range_with_units() {
        let spec = parse("135mm~129mm");
        assert_eq!(spec.intervals, vec![AcceptanceInterval::new(129.0, 135.0)]);
    }

    #[test]
    fn test_dash_tolerance_is_not_a_range() {
        // 160-0.01 fails the magnitude guard and pairs base with offset
        let spec = parse("160-0.01");
        assert_eq!(spec.intervals, vec![AcceptanceInterval::new(159.99, 160.0)]);
    }

    #[test]
    fn test_base_with_offsets() {
        let spec = parse("140 -0.01, -0.03");
        assert_eq!(spec.intervals, vec![AcceptanceInterval::new(139.97, 139.99)]);

        let spec = parse("Ø250");
        assert_eq!(spec.intervals, vec![AcceptanceInterval::new(250.0, 250.0)]);
    }

    #[test]
    fn test_multi_segment() {
        let spec = parse("一、本體 300±0.1 二、軸頸 150±0.02；三、135~129");
        assert_eq!(
            spec.intervals,
            vec![
                AcceptanceInterval::new(299.9, 300.1),
                AcceptanceInterval::new(149.98, 150.02),
                AcceptanceInterval::new(129.0, 135.0),
            ]
        );
    }

    #[test]
    fn test_no_numbers() {
        let spec = parse("依圖面");
        assert!(spec.intervals.is_empty());
        assert!(spec.trusted.is_empty());
        assert!(parse("").intervals.is_empty());
    }

    #[test]
    fn test_trusted_numbers() {
        let spec = parse("1. 外徑 196 以上, 3 處");
        assert_eq!(spec.trusted, vec![196.0]);

        let spec = parse("300±0.1mm");
        assert_eq!(spec.trusted, vec![0.1, 300.0]);
        assert_eq!(spec.max_trusted(), Some(300.0));
        assert_eq!(spec.max_trusted_at_least(120.0), Some(300.0));
    }

    #[test]
    fn test_nearest_trusted() {
        let spec = parse("180 / 200 / 220");
        assert_eq!(spec.nearest_trusted(205.0), Some(200.0));
        assert_eq!(spec.nearest_trusted(190.0), Some(180.0));
    }

    #[test]
    fn test_deterministic() {
        let text = "一、300±0.1mm；二、140 -0.01 -0.03";
        assert_eq!(parse(text), parse(text));
    }
}
