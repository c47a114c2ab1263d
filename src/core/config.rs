//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Project config file looked up in the working directory
pub const PROJECT_CONFIG_FILE: &str = ".rollaudit.yaml";

/// Errors loading an explicitly requested config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0:?}")]
    NotFound(PathBuf),

    #[error("invalid config file {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Roll-audit configuration with layered hierarchy
///
/// Every field is optional; unset fields fall back to [`AuditConfig`]
/// defaults when the run configuration is resolved.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default rule table (CSV)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<PathBuf>,

    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_similarity_threshold: Option<u8>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_hit_threshold: Option<u8>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket_similarity_threshold: Option<u8>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_epsilon: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub un_regen_floor: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub trusted_min_magnitude: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_mode_target: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage_sentinel: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_number_length: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_number_prefixes: Option<Vec<String>>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    ///
    /// Implicit layers that fail to parse are logged and skipped; an
    /// explicit `--config` file must exist and parse.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/rollaudit/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            config.merge_file_lenient(&global_path);
        }

        // 3. Project config (.rollaudit.yaml in the working directory)
        if let Some(project_path) = Self::project_config_path() {
            config.merge_file_lenient(&project_path);
        }

        // 4. Environment variables
        if let Ok(rules) = std::env::var("ROLLAUDIT_RULES") {
            if !rules.is_empty() {
                config.rules = Some(PathBuf::from(rules));
            }
        }
        if let Ok(format) = std::env::var("ROLLAUDIT_FORMAT") {
            if !format.is_empty() {
                config.default_format = Some(format);
            }
        }

        // 5. Explicit config file
        if let Some(path) = explicit {
            config.merge(Self::read_file(path)?);
        }

        Ok(config)
    }

    /// Read a single config file
    pub fn read_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yml::from_str::<Config>(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn merge_file_lenient(&mut self, path: &Path) {
        if !path.exists() {
            return;
        }
        match Self::read_file(path) {
            Ok(layer) => {
                tracing::debug!(path = %path.display(), "merged config layer");
                self.merge(layer);
            }
            Err(e) => tracing::warn!("ignoring config layer: {}", e),
        }
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "rollaudit")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Get the path to the project config file in the working directory
    pub fn project_config_path() -> Option<PathBuf> {
        std::env::current_dir()
            .ok()
            .map(|dir| dir.join(PROJECT_CONFIG_FILE))
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        if other.rules.is_some() {
            self.rules = other.rules;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.rule_similarity_threshold.is_some() {
            self.rule_similarity_threshold = other.rule_similarity_threshold;
        }
        if other.rule_hit_threshold.is_some() {
            self.rule_hit_threshold = other.rule_hit_threshold;
        }
        if other.bucket_similarity_threshold.is_some() {
            self.bucket_similarity_threshold = other.bucket_similarity_threshold;
        }
        if other.quantity_epsilon.is_some() {
            self.quantity_epsilon = other.quantity_epsilon;
        }
        if other.un_regen_floor.is_some() {
            self.un_regen_floor = other.un_regen_floor;
        }
        if other.trusted_min_magnitude.is_some() {
            self.trusted_min_magnitude = other.trusted_min_magnitude;
        }
        if other.weight_mode_target.is_some() {
            self.weight_mode_target = other.weight_mode_target;
        }
        if other.damage_sentinel.is_some() {
            self.damage_sentinel = other.damage_sentinel;
        }
        if other.job_number_length.is_some() {
            self.job_number_length = other.job_number_length;
        }
        if other.job_number_prefixes.is_some() {
            self.job_number_prefixes = other.job_number_prefixes;
        }
    }

    /// Resolve the per-run audit configuration
    pub fn audit_config(&self) -> AuditConfig {
        let defaults = AuditConfig::default();
        AuditConfig {
            rule_similarity_threshold: self
                .rule_similarity_threshold
                .unwrap_or(defaults.rule_similarity_threshold),
            rule_hit_threshold: self
                .rule_hit_threshold
                .unwrap_or(defaults.rule_hit_threshold),
            bucket_similarity_threshold: self
                .bucket_similarity_threshold
                .unwrap_or(defaults.bucket_similarity_threshold),
            quantity_epsilon: self.quantity_epsilon.unwrap_or(defaults.quantity_epsilon),
            un_regen_floor: self.un_regen_floor.unwrap_or(defaults.un_regen_floor),
            trusted_min_magnitude: self
                .trusted_min_magnitude
                .unwrap_or(defaults.trusted_min_magnitude),
            weight_mode_target: self
                .weight_mode_target
                .unwrap_or(defaults.weight_mode_target),
            damage_sentinel: self
                .damage_sentinel
                .clone()
                .unwrap_or(defaults.damage_sentinel),
            job_number_length: self
                .job_number_length
                .unwrap_or(defaults.job_number_length),
            job_number_prefixes: self
                .job_number_prefixes
                .clone()
                .unwrap_or(defaults.job_number_prefixes),
        }
    }
}

/// Fully resolved configuration for one audit run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Rule lookup fuzzy threshold (0-100, exclusive)
    pub rule_similarity_threshold: u8,
    /// Document-level rule hit threshold (0-100, inclusive)
    pub rule_hit_threshold: u8,
    /// Bucket direct title similarity threshold (0-100, exclusive)
    pub bucket_similarity_threshold: u8,
    /// Quantities closer than this are equal
    pub quantity_epsilon: f64,
    /// A non-reconditioned body dimension is never below this
    pub un_regen_floor: f64,
    /// Spec numbers at or below this are noise unless next to a unit marker
    pub trusted_min_magnitude: f64,
    /// Item targets above this are weights or areas, not counts
    pub weight_mode_target: f64,
    /// Token the extraction writes for an illegible value
    pub damage_sentinel: String,
    pub job_number_length: usize,
    pub job_number_prefixes: Vec<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            rule_similarity_threshold: 90,
            rule_hit_threshold: 85,
            bucket_similarity_threshold: 90,
            quantity_epsilon: 0.01,
            un_regen_floor: 120.0,
            trusted_min_magnitude: 10.0,
            weight_mode_target: 100.0,
            damage_sentinel: "[!]".to_string(),
            job_number_length: 10,
            job_number_prefixes: vec!["W".to_string()],
        }
    }
}
