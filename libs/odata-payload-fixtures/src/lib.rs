#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Fixture generators and test descriptors built on `odata_payload`.
//!
//! Generators produce representative payload trees typed against
//! [`model::sample_model`]. [`FixtureSettings`] bounds how many are produced
//! and which [`TestConfiguration`]s descriptors expand to.

pub mod combinatorics;
mod descriptor;
mod error;
pub mod generators;
pub mod model;
mod settings;

pub use combinatorics::{
    Combinations, column_combinations, combinations, permutations, subsets, variations,
};
pub use descriptor::{MessageKind, PayloadTestDescriptor, SkipPredicate, TestConfiguration};
pub use error::{FixtureError, Result};
pub use generators::all_descriptors;
pub use settings::{ENV_PREFIX, FixtureSettings};
