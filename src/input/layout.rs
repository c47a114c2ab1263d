//! OCR layout post-processing
//!
//! Turns a layout analysis result (table cells with row/column indices plus
//! the page's running text) into the page-tagged table markdown and cleaned
//! text the audit consumes.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::entities::PageText;

/// Footer page hint: `項次 3/12`, `Page 3 / 12`, `NO.3/12`
static PAGE_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:項次|Page|頁次|NO\.)[:\s]*(\d+)\s*[/／]\s*\d+").expect("valid page hint pattern")
});

pub const SUMMARY_TABLE: &str = "SUMMARY_TABLE";
pub const DETAIL_TABLE: &str = "DETAIL_TABLE";
pub const UNKNOWN_TABLE: &str = "UNKNOWN_TABLE";

/// Characters of cleaned content kept as the header snippet
pub const HEADER_SNIPPET_CHARS: usize = 800;

const SUMMARY_KEYWORDS: &[&str] = &["實交", "申請", "名稱及規範", "完成交貨日期", "存放位置"];
const DETAIL_KEYWORDS: &[&str] = &["規範標準", "檢驗紀錄", "實測", "編號", "尺寸", "W3 #", "公差"];

/// Footer markers; table cells and text after them are dropped
const STOP_KEYWORDS: &[&str] = &["注意事項", "中機品檢單位", "保存期限", "表單編號", "FORM NO", "簽章"];

/// Inspection-type check boxes printed in the form's corner
const NOISE_KEYWORDS: &[&str] = &[
    "檢驗類別",
    "尺寸檢驗",
    "依圖面標記",
    "材料檢驗",
    "成份分析",
    "非破壞性",
    "正常化",
    "退火",
    "淬.回火",
    "表面硬化",
    "試車",
    "性能測試",
    "試壓試漏",
    "動.靜平衡試驗",
    ":selected:",
    ":unselected:",
    "抗拉",
    "硬度試驗",
    "UT",
    "PT",
    "MT",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutCell {
    #[serde(default, alias = "rowIndex")]
    pub row_index: usize,
    #[serde(default, alias = "columnIndex")]
    pub column_index: usize,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingRegion {
    #[serde(default, alias = "pageNumber")]
    pub page_number: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutTable {
    #[serde(default)]
    pub cells: Vec<LayoutCell>,
    #[serde(default, alias = "boundingRegions")]
    pub bounding_regions: Vec<BoundingRegion>,
}

impl LayoutTable {
    pub fn page_number(&self) -> Option<u32> {
        self.bounding_regions.first().and_then(|r| r.page_number)
    }

    /// Tag from the first row's keywords
    pub fn tag(&self) -> &'static str {
        let first_row: String = self
            .cells
            .iter()
            .filter(|c| c.row_index == 0)
            .map(|c| c.content.as_str())
            .collect();
        if SUMMARY_KEYWORDS.iter().any(|k| first_row.contains(k)) {
            SUMMARY_TABLE
        } else if DETAIL_KEYWORDS.iter().any(|k| first_row.contains(k)) {
            DETAIL_TABLE
        } else {
            UNKNOWN_TABLE
        }
    }

    /// Render as a tagged markdown block
    pub fn to_markdown(&self) -> String {
        let page = self
            .page_number()
            .map(|n| n.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let mut out = format!("\n\n=== [{} | Page {}] ===\n", self.tag(), page);

        let mut rows: BTreeMap<usize, BTreeMap<usize, String>> = BTreeMap::new();
        for cell in &self.cells {
            let content = cell.content.replace('\n', " ").trim().to_string();
            if STOP_KEYWORDS.iter().any(|k| content.contains(k)) {
                break;
            }
            let content = if NOISE_KEYWORDS.iter().any(|k| content.contains(k)) {
                String::new()
            } else {
                content
            };
            rows.entry(cell.row_index)
                .or_default()
                .insert(cell.column_index, content);
        }

        for cols in rows.values() {
            let Some(&max_col) = cols.keys().next_back() else {
                continue;
            };
            let cells: Vec<&str> = (0..=max_col)
                .map(|c| cols.get(&c).map(String::as_str).unwrap_or(""))
                .collect();
            out.push_str(&format!("| {} |\n", cells.join(" | ")));
        }
        out
    }
}

/// Layout analysis result of one page image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tables: Vec<LayoutTable>,
}

impl LayoutResult {
    /// Accept either a bare result or one wrapped in `analyzeResult`,
    /// encoded as an object or as a JSON string
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(text) => {
                let inner: serde_json::Value = serde_json::from_str(text).ok()?;
                Self::from_value(&inner)
            }
            serde_json::Value::Object(map) => {
                if let Some(inner) = map.get("analyzeResult").or_else(|| map.get("analyze_result")) {
                    return Self::from_value(inner);
                }
                serde_json::from_value(value.clone()).ok()
            }
            _ => None,
        }
    }
}

/// Page number printed in the footer, if found
pub fn page_hint(content: &str) -> Option<String> {
    PAGE_HINT
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Content up to the first stop keyword with noise keywords removed
pub fn clean_content(content: &str) -> String {
    let cut = STOP_KEYWORDS
        .iter()
        .filter_map(|k| content.find(k))
        .min()
        .unwrap_or(content.len());
    let mut text = content[..cut].to_string();
    for noise in NOISE_KEYWORDS {
        text = text.replace(noise, "");
    }
    text
}

/// Convert a layout result into page text
pub fn to_page_text(layout: &LayoutResult) -> PageText {
    let table_md: String = layout.tables.iter().map(LayoutTable::to_markdown).collect();
    let full_text = clean_content(&layout.content);
    let header_text: String = full_text.chars().take(HEADER_SNIPPET_CHARS).collect();

    PageText {
        real_page: page_hint(&layout.content),
        header_text,
        full_text,
        table_md,
    }
}
