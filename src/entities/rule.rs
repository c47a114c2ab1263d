//! Rule record - one row of the external rule table

use serde::{Deserialize, Serialize};

/// Per-item overrides keyed by an item-name pattern
///
/// Immutable for the duration of an audit run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleRecord {
    /// Item-name pattern matched against extracted titles
    pub item_name: String,

    /// Standard specification text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<String>,

    /// Free-text logic note for reviewers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logic_note: Option<String>,

    /// Unit conversion for the item's own quantity check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_local: Option<String>,

    /// Unit conversion applied when contributing to summary buckets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_aggregate: Option<String>,

    /// Unit conversion for the freight total
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_freight: Option<String>,

    /// Category or process override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_override: Option<String>,
}

impl RuleRecord {
    pub fn new(item_name: impl Into<String>) -> Self {
        Self {
            item_name: item_name.into(),
            ..Default::default()
        }
    }

    pub fn with_local(mut self, rule: impl Into<String>) -> Self {
        self.unit_local = Some(rule.into());
        self
    }

    pub fn with_aggregate(mut self, rule: impl Into<String>) -> Self {
        self.unit_aggregate = Some(rule.into());
        self
    }

    pub fn with_freight(mut self, rule: impl Into<String>) -> Self {
        self.unit_freight = Some(rule.into());
        self
    }

    pub fn with_override(mut self, category: impl Into<String>) -> Self {
        self.category_override = Some(category.into());
        self
    }

    pub fn with_spec(mut self, spec: impl Into<String>) -> Self {
        self.spec = Some(spec.into());
        self
    }
}
