//! Summary row - one line of the delivery summary table

use serde::{Deserialize, Serialize};

use super::lenient;

/// One row of the delivery summary table
///
/// Every row is a reconciliation bucket: line items contribute to it and the
/// accumulated total is settled against [`SummaryRow::delivered`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryRow {
    /// Page of the summary table
    #[serde(default, deserialize_with = "lenient::string_or_number")]
    pub page: String,

    /// Row name, e.g. `ROLL車修`
    #[serde(default)]
    pub title: String,

    /// Quantity applied for
    #[serde(
        default,
        alias = "applied_quantity",
        deserialize_with = "lenient::opt_quantity"
    )]
    pub applied: Option<f64>,

    /// Quantity actually delivered
    #[serde(
        default,
        alias = "target",
        alias = "delivered_quantity",
        deserialize_with = "lenient::quantity"
    )]
    pub delivered: f64,
}

impl SummaryRow {
    pub fn new(title: impl Into<String>, delivered: f64) -> Self {
        Self {
            title: title.into(),
            delivered,
            ..Default::default()
        }
    }

    pub fn with_applied(mut self, applied: f64) -> Self {
        self.applied = Some(applied);
        self
    }

    /// Target quantity used for bucket settlement
    pub fn target(&self) -> f64 {
        self.delivered
    }

    /// Applied and delivered quantities differ by more than `epsilon`
    pub fn applied_mismatch(&self, epsilon: f64) -> Option<(f64, f64)> {
        self.applied
            .filter(|applied| (applied - self.delivered).abs() > epsilon)
            .map(|applied| (applied, self.delivered))
    }
}
