//! Extracted item - one engineering line-item on one page

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use super::category::Category;
use super::lenient;

static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.?\d*").expect("valid first-number pattern"));

/// Raw values the extraction step writes for empty cells; never audited
const PLACEHOLDER_VALUES: &[&str] = &["N/A", "NAN", "M10"];

/// One (part-id, raw value) pair from the inspection table
///
/// Duplicate pairs are legitimate: the same roll can appear once per journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    /// Part identifier (roll serial)
    pub id: String,

    /// Value exactly as transcribed, may be the damage sentinel
    #[serde(alias = "val", alias = "raw")]
    pub value: String,
}

/// Interpretation of a raw measurement value
#[derive(Debug, Clone, PartialEq)]
pub enum MeasuredValue {
    /// Transcription flagged the value as illegible
    Damaged,
    /// First numeric token of the value, with its original text
    Number { text: String, value: f64 },
    /// Empty cell or a known placeholder
    Blank,
    /// No numeric token could be found
    Unreadable,
}

impl Measurement {
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
        }
    }

    /// Interpret the raw value, stripping stray annotation characters
    pub fn measured(&self, damage_sentinel: &str) -> MeasuredValue {
        let raw = self.value.trim();
        if !damage_sentinel.is_empty() && raw.contains(damage_sentinel) {
            return MeasuredValue::Damaged;
        }
        if raw.is_empty()
            || PLACEHOLDER_VALUES
                .iter()
                .any(|p| raw.eq_ignore_ascii_case(p))
        {
            return MeasuredValue::Blank;
        }
        match FIRST_NUMBER.find(raw) {
            Some(m) => match m.as_str().parse::<f64>() {
                Ok(value) => MeasuredValue::Number {
                    text: m.as_str().to_string(),
                    value,
                },
                Err(_) => MeasuredValue::Unreadable,
            },
            None => MeasuredValue::Unreadable,
        }
    }
}

/// Whether a numeric text has exactly two decimal places (`349.90`)
pub fn has_two_decimals(text: &str) -> bool {
    match text.split_once('.') {
        Some((_, frac)) => frac.len() == 2 && frac.chars().all(|c| c.is_ascii_digit()),
        None => false,
    }
}

/// Whether a numeric text is written without a decimal point
pub fn is_pure_integer(text: &str) -> bool {
    !text.is_empty() && !text.contains('.')
}

/// Parse the compact `id:value|id:value` measurement string
///
/// Segments without a colon, or with fewer than two colon-delimited fields,
/// are extraction artifacts and are dropped silently.
pub fn parse_measurements(compact: &str) -> Vec<Measurement> {
    compact
        .split('|')
        .filter(|segment| segment.contains(':'))
        .filter_map(|segment| {
            let mut fields = segment.split(':');
            let id = fields.next()?;
            let value = fields.next()?;
            Some(Measurement::new(
                id.trim().replace(' ', ""),
                value.trim().replace(' ', ""),
            ))
        })
        .collect()
}

/// Render measurements back into the compact wire form
pub fn format_measurements(list: &[Measurement]) -> String {
    list.iter()
        .map(|m| format!("{}:{}", m.id, m.value))
        .collect::<Vec<_>>()
        .join("|")
}

mod measurement_list {
    use super::{format_measurements, parse_measurements, Measurement};
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Compact(String),
        Rows(Vec<Measurement>),
    }

    pub fn serialize<S>(list: &[Measurement], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_measurements(list))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Measurement>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Wire>::deserialize(deserializer)? {
            Some(Wire::Compact(s)) => parse_measurements(&s),
            Some(Wire::Rows(rows)) => rows,
            None => Vec::new(),
        })
    }
}

/// One engineering line-item extracted from a detail table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedItem {
    /// Page the item was read from
    #[serde(default, deserialize_with = "lenient::string_or_number")]
    pub page: String,

    /// Item title as transcribed
    #[serde(alias = "item_title", default)]
    pub title: String,

    /// Quantity declared in the title annotation, e.g. `(4SET)`; 0 when absent
    #[serde(
        alias = "item_pc_target",
        default,
        deserialize_with = "lenient::quantity"
    )]
    pub target_quantity: f64,

    /// Free-text specification
    #[serde(alias = "std_spec", default, deserialize_with = "lenient::string_or_number")]
    pub spec: String,

    /// Category; assigned by the classifier, whatever the extraction said
    #[serde(default, deserialize_with = "category_or_none")]
    pub category: Option<Category>,

    /// Ordered measurements, duplicates preserved
    #[serde(alias = "ds", default, with = "measurement_list")]
    pub measurements: Vec<Measurement>,

    /// Aggregate weight/area reported for the whole batch, replaces the summed values
    #[serde(default, deserialize_with = "lenient::opt_quantity")]
    pub batch_total: Option<f64>,
}

fn category_or_none<'de, D>(deserializer: D) -> Result<Option<Category>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = lenient::opt_string_or_number(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

impl ExtractedItem {
    pub fn new(page: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            page: page.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_spec(mut self, spec: impl Into<String>) -> Self {
        self.spec = spec.into();
        self
    }

    pub fn with_target(mut self, target: f64) -> Self {
        self.target_quantity = target;
        self
    }

    pub fn with_measurements(mut self, compact: &str) -> Self {
        self.measurements = parse_measurements(compact);
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Page label, `?` when the extraction gave none
    pub fn page_label(&self) -> String {
        if self.page.trim().is_empty() {
            "?".to_string()
        } else {
            self.page.trim().to_string()
        }
    }

    pub fn category(&self) -> Category {
        self.category.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENTINEL: &str = "[!]";

    #[test]
    fn test_parse_measurements_keeps_duplicates() {
        let list = parse_measurements("A1:300.05|A1:300.05|B2 : 299.98");
        assert_eq!(list.len(), 3);
        assert_eq!(list[0], list[1]);
        assert_eq!(list[2], Measurement::new("B2", "299.98"));
    }

    #[test]
    fn test_parse_measurements_skips_malformed() {
        let list = parse_measurements("A1|B2:|:|C3:12");
        // "B2:" and ":" have two fields (one empty) and are kept
        assert_eq!(list.len(), 3);
        assert_eq!(list[2], Measurement::new("C3", "12"));
        assert!(parse_measurements("no delimiters here").is_empty());
        assert!(parse_measurements("").is_empty());
    }

    #[test]
    fn test_measured_value_strips_annotations() {
        let m = Measurement::new("A1", "349.90mm*");
        assert_eq!(
            m.measured(SENTINEL),
            MeasuredValue::Number {
                text: "349.90".to_string(),
                value: 349.9
            }
        );
    }

    #[test]
    fn test_measured_value_sentinels() {
        assert_eq!(Measurement::new("A1", "[!]").measured(SENTINEL), MeasuredValue::Damaged);
        assert_eq!(Measurement::new("A1", "").measured(SENTINEL), MeasuredValue::Blank);
        assert_eq!(Measurement::new("A1", "N/A").measured(SENTINEL), MeasuredValue::Blank);
        assert_eq!(Measurement::new("A1", "OK").measured(SENTINEL), MeasuredValue::Unreadable);
    }

    #[test]
    fn test_two_decimal_trailing_zero() {
        assert!(has_two_decimals("349.90"));
        assert!(!has_two_decimals("349.9"));
        assert!(!has_two_decimals("349"));
        assert!(is_pure_integer("349"));
        assert!(!is_pure_integer("349.0"));
        assert_eq!("349.90".parse::<f64>().unwrap(), 349.9);
    }

    #[test]
    fn test_deserialize_extraction_item() {
        let json = r#"{
            "page": 2,
            "item_title": "本體再生車修(4PC)",
            "category": null,
            "item_pc_target": "4",
            "std_spec": "300±0.1mm",
            "ds": "A1:300.05|A2:300.00|A3:[!]"
        }"#;
        let item: ExtractedItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.page, "2");
        assert_eq!(item.target_quantity, 4.0);
        assert_eq!(item.category, None);
        assert_eq!(item.measurements.len(), 3);
        assert_eq!(item.batch_total, None);
    }

    #[test]
    fn test_deserialize_measurement_rows() {
        let json = r#"{"title": "x", "measurements": [{"id": "A1", "val": "1"}]}"#;
        let item: ExtractedItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.measurements, vec![Measurement::new("A1", "1")]);
    }

    #[test]
    fn test_serialize_compact_measurements() {
        let item = ExtractedItem::new("1", "t").with_measurements("A:1|B:2");
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["measurements"], "A:1|B:2");
    }
}
