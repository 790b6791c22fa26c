//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use std::collections::HashSet;

use crate::classify::CategoryRule;
use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: impl Into<String>, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `api_url` is not an http(s) URL
    /// - `max_bytes` is 0 or exceeds 1GB
    /// - `timeout_ms` is less than 100ms or exceeds 10 minutes
    /// - `user_agent` or `id_filter` is empty
    /// - an engine command template is empty
    /// - engine names are empty or repeated, or a rule pattern does not compile
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.api_url.starts_with("https://") || self.api_url.starts_with("http://")) {
            return Err(invalid("api_url", "must start with http:// or https://"));
        }

        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 1024 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 1GB"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 600_000 {
            return Err(invalid("timeout_ms", "must not exceed 10 minutes (600000ms)"));
        }

        if self.engine_timeout_ms == Some(0) {
            return Err(invalid("engine_timeout_ms", "must be greater than 0 when set"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.id_filter.is_empty() {
            return Err(invalid("id_filter", "must not be empty"));
        }

        let mut names = HashSet::new();
        for engine in &self.engines {
            if engine.name.is_empty() {
                return Err(invalid("engines.name", "must not be empty"));
            }
            if !names.insert(engine.name.as_str()) {
                return Err(invalid("engines.name", format!("duplicate engine '{}'", engine.name)));
            }
            if engine.command.is_empty() {
                return Err(invalid(format!("engines.{}.command", engine.name), "must not be empty"));
            }
            for spec in engine.effective_rules() {
                CategoryRule::compile(&spec).map_err(|e| invalid(format!("engines.{}.rules", engine.name), e.to_string()))?;
            }
        }

        if self.engines.is_empty() && self.checks.sbml.is_none() && self.checks.sedml.is_none() {
            tracing::warn!("no checks or engines configured; the report will only list candidates");
        }

        Ok(())
    }
}
