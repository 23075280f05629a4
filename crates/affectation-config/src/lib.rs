//! Configuration system for Affectation.
//!
//! Load run parameters from TOML or YAML files to control list validation,
//! category quotas and cost shapes without code changes.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use affectation_config::EngineConfig;
//! use affectation_core::CostShape;
//!
//! let config = EngineConfig::from_toml_str(r#"
//!     required_count = 6
//!     cost_shapes = ["linear", "exp"]
//!     seed = 7
//!
//!     [quotas]
//!     restricted_max = 2
//!     restricted_or_discouraged_max = 4
//!     preferred_min = 1
//! "#).unwrap();
//!
//! assert_eq!(config.required_count, 6);
//! assert_eq!(config.cost_shapes, [CostShape::Linear, CostShape::Exponential]);
//! assert_eq!(config.quotas.preferred_min, 1);
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use affectation_config::EngineConfig;
//!
//! let config = EngineConfig::load("affectation.toml").unwrap_or_default();
//! // Proceeds with defaults if file doesn't exist
//! ```

use std::path::Path;

use affectation_core::{ConfigError, CostShape, QuotaRules, ValidationRules};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default penalty for unranked cells.
///
/// Exceeds the `exp` cost of every rank up to 28.
pub const DEFAULT_PENALTY: f64 = 1e12;

/// Default seed of the row shuffle.
pub const DEFAULT_SEED: u64 = 42;

/// Default minimum preference list length.
pub const DEFAULT_REQUIRED_COUNT: usize = 6;

/// Error raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ConfigError),
}

/// Parameters of an assignment run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct EngineConfig {
    /// Minimum number of preferences per auditor; also the quota window.
    pub required_count: usize,

    /// Category quotas.
    pub quotas: QuotaRules,

    /// Disables quotas and derives the required count from the table width.
    pub free_choice: bool,

    /// Cost shapes to solve with, one run each.
    pub cost_shapes: Vec<CostShape>,

    /// Cost of a cell whose posting is absent from the auditor's list.
    ///
    /// Must dominate every in-list cost of the chosen shapes.
    pub default_penalty: f64,

    /// Seed of the auditor shuffle applied before matrix construction.
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            required_count: DEFAULT_REQUIRED_COUNT,
            quotas: QuotaRules::default(),
            free_choice: false,
            cost_shapes: vec![CostShape::Linear],
            default_penalty: DEFAULT_PENALTY,
            seed: DEFAULT_SEED,
        }
    }
}

impl EngineConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist, contains invalid TOML, or holds
    /// parameters rejected by [`EngineConfig::validate`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, LoadError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, LoadError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the minimum preference count.
    pub fn with_required_count(mut self, required_count: usize) -> Self {
        self.required_count = required_count;
        self
    }

    /// Sets the category quotas.
    pub fn with_quotas(mut self, quotas: QuotaRules) -> Self {
        self.quotas = quotas;
        self
    }

    /// Enables or disables free-choice mode.
    pub fn with_free_choice(mut self, free_choice: bool) -> Self {
        self.free_choice = free_choice;
        self
    }

    /// Replaces the cost shapes.
    pub fn with_cost_shapes(mut self, shapes: impl IntoIterator<Item = CostShape>) -> Self {
        self.cost_shapes = shapes.into_iter().collect();
        self
    }

    /// Parses and sets the cost shapes by name.
    ///
    /// Unknown names are an error, never a fallback.
    pub fn with_cost_shape_names<I, S>(mut self, names: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.cost_shapes = names
            .into_iter()
            .map(|name| name.as_ref().parse())
            .collect::<Result<_, _>>()?;
        Ok(self)
    }

    /// Sets the default penalty.
    pub fn with_default_penalty(mut self, penalty: f64) -> Self {
        self.default_penalty = penalty;
        self
    }

    /// Sets the shuffle seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Checks parameter ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.required_count == 0 && !self.free_choice {
            return Err(ConfigError::InvalidParameter(
                "required_count must be at least 1".to_string(),
            ));
        }
        if !self.default_penalty.is_finite() || self.default_penalty <= 0.0 {
            return Err(ConfigError::InvalidParameter(format!(
                "default_penalty must be a positive finite number, got {}",
                self.default_penalty
            )));
        }
        if self.quotas.restricted_max > self.quotas.restricted_or_discouraged_max {
            return Err(ConfigError::InvalidParameter(format!(
                "restricted_max ({}) exceeds restricted_or_discouraged_max ({})",
                self.quotas.restricted_max, self.quotas.restricted_or_discouraged_max
            )));
        }
        if self.cost_shapes.is_empty() {
            return Err(ConfigError::InvalidParameter(
                "at least one cost shape is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolves the validation rules for a table of the given width.
    ///
    /// In free-choice mode the required count is the number of preference
    /// columns (at least 1) and quotas are disabled.
    ///
    /// ```
    /// use affectation_config::EngineConfig;
    ///
    /// let rules = EngineConfig::new().with_free_choice(true).rules(9);
    /// assert_eq!(rules.required_count, 9);
    /// assert!(rules.quotas.is_none());
    /// ```
    pub fn rules(&self, table_width: usize) -> ValidationRules {
        if self.free_choice {
            ValidationRules::free_choice(table_width.max(1))
        } else {
            ValidationRules::new(self.required_count, self.quotas)
        }
    }
}
