//! Core module - configuration, rule repository and text matching

pub mod config;
pub mod rules;
pub mod similarity;
pub mod units;
pub mod vocab;

pub use config::{AuditConfig, Config, ConfigError};
pub use rules::{MatchKind, RuleLookup, RuleMatch, RuleTable, RuleTableError};
pub use units::UnitRule;
