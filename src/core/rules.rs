//! Rule repository - the external rule table and title lookup

use csv::{ReaderBuilder, StringRecord};
use regex::Regex;
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

use super::similarity::partial_ratio;
use super::vocab::normalize;
use crate::entities::RuleRecord;

static PAREN_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\(（].*?[\)）]").expect("valid parenthesis pattern"));

/// Rule names marked as generic never count as a document hit
const GENERIC_MARKER: &str = "(通用)";

/// Default similarity threshold for fuzzy rule lookup
pub const DEFAULT_SIMILARITY_THRESHOLD: u8 = 90;

/// Errors loading a rule table
#[derive(Debug, Error)]
pub enum RuleTableError {
    #[error("rule table not found: {0:?}")]
    NotFound(PathBuf),

    #[error("rule table has no 'Item_Name' column")]
    MissingNameColumn,

    #[error("CSV error at row {row}: {message}")]
    Csv { row: usize, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Anything that resolves an item title to a rule
pub trait RuleLookup {
    /// Best-matching rule for a title, or `None`
    fn lookup(&self, title: &str) -> Option<&RuleRecord>;
}

/// A loaded rule table, immutable for the duration of an audit run
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<RuleRecord>,
    /// Normalized item name -> index of the first rule with that name
    by_name: HashMap<String, usize>,
    threshold: u8,
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::empty()
    }
}

impl RuleTable {
    /// A table with no rules; every lookup falls back to keywords
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn new(rules: Vec<RuleRecord>) -> Self {
        let mut by_name = HashMap::new();
        for (idx, rule) in rules.iter().enumerate() {
            let key = normalize(&rule.item_name);
            if key.is_empty() {
                continue;
            }
            by_name.entry(key).or_insert(idx);
        }
        Self {
            rules,
            by_name,
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }

    /// Set the fuzzy-match threshold (0-100, exclusive)
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    /// Load a rule table from a CSV file
    pub fn load(path: &Path) -> Result<Self, RuleTableError> {
        if !path.exists() {
            return Err(RuleTableError::NotFound(path.to_path_buf()));
        }
        let file = std::fs::File::open(path)?;
        let table = Self::from_reader(std::io::BufReader::new(file))?;
        tracing::info!(path = %path.display(), rules = table.len(), "loaded rule table");
        Ok(table)
    }

    /// Load a rule table, logging and falling back to an empty table on failure
    pub fn load_or_empty(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("{}; falling back to keyword rules", e);
                Self::empty()
            }),
            None => Self::empty(),
        }
    }

    /// Parse CSV with an `Item_Name` column; header names are case-insensitive
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RuleTableError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr
            .headers()
            .map_err(|e| RuleTableError::Csv {
                row: 1,
                message: e.to_string(),
            })?
            .clone();
        let header_map = build_header_map(&headers);
        if !header_map.contains_key("item_name") {
            return Err(RuleTableError::MissingNameColumn);
        }

        let mut rules = Vec::new();
        for (row_idx, result) in rdr.records().enumerate() {
            let row_num = row_idx + 2; // +2 for 1-indexed and header row
            let record = result.map_err(|e| RuleTableError::Csv {
                row: row_num,
                message: e.to_string(),
            })?;

            let Some(item_name) = get_field(&record, &header_map, "item_name") else {
                tracing::debug!(row = row_num, "skipping rule without item name");
                continue;
            };

            rules.push(RuleRecord {
                item_name,
                spec: get_field(&record, &header_map, "standard_spec"),
                logic_note: get_field(&record, &header_map, "logic_prompt"),
                unit_local: get_field(&record, &header_map, "unit_rule_local"),
                unit_aggregate: get_field(&record, &header_map, "unit_rule_agg"),
                unit_freight: get_field(&record, &header_map, "unit_rule_freight"),
                category_override: get_field(&record, &header_map, "category_override"),
            });
        }

        Ok(Self::new(rules))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuleRecord> {
        self.rules.iter()
    }

    /// Look up a title and report how it matched
    pub fn resolve(&self, title: &str) -> Option<RuleMatch<'_>> {
        let key = normalize(title);
        if key.is_empty() || self.rules.is_empty() {
            return None;
        }

        if let Some(&idx) = self.by_name.get(&key) {
            return Some(RuleMatch {
                rule: &self.rules[idx],
                how: MatchKind::Exact,
            });
        }

        let stripped = PAREN_SUFFIX.replace_all(&key, "");
        if stripped != key {
            if let Some(&idx) = self.by_name.get(stripped.as_ref()) {
                return Some(RuleMatch {
                    rule: &self.rules[idx],
                    how: MatchKind::SuffixStripped,
                });
            }
        }

        let mut best: Option<(u8, usize, &RuleRecord)> = None;
        for rule in &self.rules {
            let name = normalize(&rule.item_name);
            if name.is_empty() {
                continue;
            }
            let score = partial_ratio(&name, &key);
            if score <= self.threshold {
                continue;
            }
            let len = name.chars().count();
            let better = match best {
                None => true,
                Some((best_score, best_len, _)) => {
                    score > best_score || (score == best_score && len > best_len)
                }
            };
            if better {
                best = Some((score, len, rule));
            }
        }

        best.map(|(score, _, rule)| RuleMatch {
            rule,
            how: MatchKind::Similar(score),
        })
    }

    /// Rules whose name partially matches the whole document text
    ///
    /// Generic rules (`(通用)`) are skipped; results are ordered by score,
    /// best first.
    pub fn hits(&self, document_text: &str, threshold: u8) -> Vec<(u8, &RuleRecord)> {
        let text = normalize(document_text);
        if text.is_empty() {
            return Vec::new();
        }
        let mut hits: Vec<(u8, &RuleRecord)> = self
            .rules
            .iter()
            .filter(|rule| !rule.item_name.contains(GENERIC_MARKER))
            .filter_map(|rule| {
                let name = normalize(&rule.item_name);
                if name.is_empty() {
                    return None;
                }
                let score = partial_ratio(&name, &text);
                (score >= threshold).then_some((score, rule))
            })
            .collect();
        hits.sort_by(|a, b| b.0.cmp(&a.0));
        hits
    }
}

impl RuleLookup for RuleTable {
    fn lookup(&self, title: &str) -> Option<&RuleRecord> {
        self.resolve(title).map(|m| m.rule)
    }
}

/// How a title resolved to a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    SuffixStripped,
    /// Fuzzy match with its 0-100 score
    Similar(u8),
}

impl std::fmt::Display for MatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchKind::Exact => write!(f, "exact"),
            MatchKind::SuffixStripped => write!(f, "suffix stripped"),
            MatchKind::Similar(score) => write!(f, "similar ({})", score),
        }
    }
}

/// A rule matched to a title
#[derive(Debug, Clone, Copy)]
pub struct RuleMatch<'a> {
    pub rule: &'a RuleRecord,
    pub how: MatchKind,
}

/// Build a map from header name to column index
fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.to_lowercase().trim().to_string(), i))
        .collect()
}

/// Get a field value from a CSV record; spreadsheet `nan` cells count as empty
fn get_field(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    field: &str,
) -> Option<String> {
    header_map
        .get(field)
        .and_then(|&idx| record.get(idx))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("nan"))
}
