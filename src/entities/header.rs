//! Header fields read independently from each page's raw text

use serde::{Deserialize, Serialize};

/// Header fields read from one page
///
/// A field the page pattern did not find is `None`; the checker reports it
/// as `N/A` when it disagrees with the cross-page majority.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageHeader {
    /// Page label (`real_page` hint or `P{index}` fallback)
    pub page: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_no: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_date: Option<String>,
}

impl PageHeader {
    pub fn new(page: impl Into<String>) -> Self {
        Self {
            page: page.into(),
            ..Default::default()
        }
    }
}

/// Header values resolved for the whole document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderInfo {
    /// Job number as reported by the extraction service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_job_no: Option<String>,

    /// Cross-page majority job number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_no: Option<String>,

    /// Cross-page majority scheduled delivery date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<String>,

    /// Cross-page majority actual delivery date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_date: Option<String>,

    /// Per-page readings the majority was computed from
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pages: Vec<PageHeader>,
}

impl HeaderInfo {
    /// Job number for display: majority first, then the reported one
    pub fn display_job_no(&self) -> &str {
        self.job_no
            .as_deref()
            .or(self.reported_job_no.as_deref())
            .unwrap_or("N/A")
    }
}
