//! Closed taxonomies: item category, physical track and process stage

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Acceptance category assigned to an extracted item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Two-decimal value inside one of the parsed acceptance intervals
    Range,
    /// Non-reconditioned body dimension: integer at or below the threshold, two decimals above
    UnRegen,
    /// Weld build-up: pure integer, not below the nearest reference
    MinLimit,
    /// Non-reconditioned journal: pure integer, not above the largest reference
    MaxLimit,
    /// Not audited (balancing, heat treatment, rule-table exemptions)
    Exempt,
    /// No rule or keyword matched
    Unknown,
}

impl Default for Category {
    fn default() -> Self {
        Category::Unknown
    }
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Range => "range",
            Category::UnRegen => "un_regen",
            Category::MinLimit => "min_limit",
            Category::MaxLimit => "max_limit",
            Category::Exempt => "exempt",
            Category::Unknown => "unknown",
        }
    }

    /// Whether the dimensional engine validates items of this category
    pub fn is_audited(&self) -> bool {
        !matches!(self, Category::Exempt | Category::Unknown)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "range" => Ok(Category::Range),
            "un_regen" | "unregen" => Ok(Category::UnRegen),
            "min_limit" => Ok(Category::MinLimit),
            "max_limit" => Ok(Category::MaxLimit),
            "exempt" => Ok(Category::Exempt),
            "unknown" => Ok(Category::Unknown),
            other => Err(format!("unknown category: {}", other)),
        }
    }
}

/// Physical location a measurement belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    Body,
    Journal,
}

impl std::fmt::Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Track::Body => write!(f, "body"),
            Track::Journal => write!(f, "journal"),
        }
    }
}

/// Sequential process step a part passes through
///
/// Ordered by process sequence, which is not the same as the size ordering
/// (see [`Stage::size_rank`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    NonReconditioned = 1,
    Welded = 2,
    Reconditioned = 3,
    Ground = 4,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::NonReconditioned,
        Stage::Welded,
        Stage::Reconditioned,
        Stage::Ground,
    ];

    pub fn number(&self) -> u8 {
        *self as u8
    }

    /// Expected relative size of a part after this stage; a higher rank
    /// means a larger dimension
    pub fn size_rank(&self) -> u8 {
        match self {
            Stage::NonReconditioned => 10,
            Stage::Ground => 20,
            Stage::Reconditioned => 30,
            Stage::Welded => 40,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stage::NonReconditioned => "non-reconditioned",
            Stage::Welded => "welded",
            Stage::Reconditioned => "reconditioned",
            Stage::Ground => "ground",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
