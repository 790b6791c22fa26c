//! Unified error types for bmcheck.
//!
//! Display strings carry a stable upper-case code prefix so that log lines and
//! skipped-candidate warnings can be grepped by category.

use std::path::PathBuf;

/// Unified error type shared by the core and client crates.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No cache entry exists for the request key.
    #[error("CACHE_MISS: {key}")]
    CacheMiss { key: String },

    /// A cache entry exists but its bytes cannot be deserialized.
    #[error("CACHE_CORRUPT: {path}: {reason}")]
    CacheCorrupt { path: PathBuf, reason: String },

    /// A cache operation was attempted in a mode that does not allow it.
    #[error("CACHE_MODE: {operation} is not allowed in '{mode}' mode")]
    CacheModeMismatch { operation: &'static str, mode: String },

    /// Filesystem operation failed.
    #[error("IO_ERROR: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Classification requested for an engine with no registered rules.
    #[error("UNKNOWN_ENGINE: {0}")]
    UnknownEngine(String),

    /// A category rule pattern failed to compile.
    #[error("INVALID_PATTERN: {pattern}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Column key is not declared on the table.
    #[error("UNKNOWN_COLUMN: {0}")]
    UnknownColumn(String),

    /// Row is missing a declared column key.
    #[error("MISSING_COLUMN: {0}")]
    MissingColumn(String),

    /// Table declaration is inconsistent (label/key count, duplicate keys).
    #[error("INVALID_TABLE: {0}")]
    InvalidTable(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// HTTP error response or transport failure.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// Fetch timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Fetch response too large.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// Remote response did not have the expected shape.
    #[error("INVALID_RESPONSE: {0}")]
    InvalidResponse(String),
}

impl Error {
    /// Wrap an I/O error with a short description of what was being attempted.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io { context: context.into(), source }
    }

    /// Whether this error came from the response cache.
    pub fn is_cache_error(&self) -> bool {
        matches!(self, Error::CacheMiss { .. } | Error::CacheCorrupt { .. } | Error::CacheModeMismatch { .. })
    }
}
