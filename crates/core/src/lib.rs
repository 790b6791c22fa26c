//! Core types and shared functionality for bmcheck.
//!
//! This crate provides:
//! - Content-addressed response cache backed by a flat directory
//! - Engine failure classification with per-category counts
//! - Report table accumulation and rendering
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod classify;
pub mod config;
pub mod error;
pub mod report;

pub use cache::{CacheMode, ResponseCache};
pub use classify::{Classification, ErrorClassifier};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use report::{Cell, ReportTable, RowSource};
