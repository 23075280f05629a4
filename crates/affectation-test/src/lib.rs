//! Shared test fixtures for Affectation crates.
//!
//! This crate provides data builders and a seeded cohort generator.
//! It depends on `affectation-core` only, so every other crate can use it
//! as a dev-dependency.
//!
//! - [`postings`] - posting tables and catalogs
//! - [`preferences`] - preference tables built from name lists
//! - [`cohort`] - reproducible synthetic cohorts of any size
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! affectation-test = { workspace = true }
//! ```
//!
//! Then import the fixtures you need:
//!
//! ```ignore
//! use affectation_test::postings::{catalog, uniform_postings};
//! use affectation_test::preferences::table;
//! ```

pub mod cohort;
pub mod postings;
pub mod preferences;

pub use cohort::{Cohort, CohortSpec};
pub use postings::{catalog, records, uniform_postings};
pub use preferences::{row, table};
