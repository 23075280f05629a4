//! Error types for Affectation

use thiserror::Error;

/// Malformed or inconsistent run configuration.
///
/// Raised before any validation begins; every other irregularity of a run
/// is reported as data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Two retained postings share the same name
    #[error("duplicate posting name: {name}")]
    DuplicatePosting { name: String },

    /// Two preference rows share the same auditor identifier
    #[error("duplicate auditor id: {auditor}")]
    DuplicateAuditor { auditor: String },

    /// A posting references a tag outside the closed category set
    #[error("posting {posting} has unrecognized category tag '{tag}'")]
    UnknownCategory { posting: String, tag: String },

    /// A cost shape name that has no implementation
    #[error("unrecognized cost shape '{0}' (expected linear, square or exp)")]
    UnknownCostShape(String),

    /// A numeric parameter outside its admissible range
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for Affectation operations
pub type Result<T> = std::result::Result<T, ConfigError>;
