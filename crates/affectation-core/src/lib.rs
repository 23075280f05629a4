//! Affectation Core - Domain types for posting assignment
//!
//! This crate provides the fundamental abstractions for Affectation:
//! - Postings and their category tags
//! - The posting catalog with its capacity-column layout
//! - Auditor preference tables, overrides and cleaned preference lists
//! - Validation rules and cost shapes
//! - The configuration error taxonomy

pub mod catalog;
pub mod cost_shape;
pub mod error;
pub mod posting;
pub mod preference;
pub mod rules;

pub use catalog::PostingCatalog;
pub use cost_shape::CostShape;
pub use error::{ConfigError, Result};
pub use posting::{Category, Posting, PostingRecord};
pub use preference::{
    apply_overrides, AuditorId, CleanedTable, InvalidReason, Invalidation, PreferenceList,
    PreferenceOverride, PreferenceRow, PreferenceTable,
};
pub use rules::{QuotaRules, ValidationRules};
