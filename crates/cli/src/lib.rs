//! Batch validation harness for BioModels.
//!
//! Drives the repository client, engines, classifier and report table
//! from one configuration.

pub mod row;
pub mod run;

pub use row::{EngineOutcome, ModelRow};
pub use run::{Checks, Harness, RunSettings, write_report};
