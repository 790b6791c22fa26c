//! Client code for bmcheck.
//!
//! This crate provides the HTTP fetch pipeline, the BioModels repository
//! client, artifact selection and repair, and the engine runners used by the
//! CLI.

pub mod artifacts;
pub mod biomodels;
pub mod engine;
pub mod fetch;

pub use artifacts::{Artifacts, Selection, SkipReason};
pub use biomodels::{BioModelsClient, ModelInfo, Repository};
pub use engine::{CommandEngine, Engine, EngineError, OutputPolicy};
pub use fetch::{Endpoints, FetchClient, FetchConfig, FetchResponse};
