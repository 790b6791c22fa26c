//! Validation and execution engines.
//!
//! An engine attempts to process a staged model and either passes or
//! returns a failure whose text is fed to the error classifier. Checks
//! (boolean validators) and execution engines share this interface; the
//! orchestrator decides which failures are classified.

pub mod command;

pub use command::CommandEngine;

use thiserror::Error;

use crate::artifacts::Artifacts;

/// Errors that can occur while running an engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine process could not be started.
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The engine ran and reported failure. Displays the engine's own message.
    #[error("{message}")]
    Failed { status: Option<i32>, message: String },

    /// The engine did not finish in time.
    #[error("engine timed out after {0}ms")]
    Timeout(u64),
}

/// What happens to an engine's standard streams while it runs.
///
/// Applies to the engine process only; the harness's own streams are left
/// alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputPolicy {
    /// Discard engine stdout instead of passing it through.
    pub suppress_stdout: bool,

    /// Do not echo captured engine stderr into the log.
    pub suppress_stderr: bool,
}

impl Default for OutputPolicy {
    fn default() -> Self {
        Self { suppress_stdout: true, suppress_stderr: false }
    }
}

impl OutputPolicy {
    pub fn from_app(config: &bmcheck_core::AppConfig) -> Self {
        Self { suppress_stdout: config.suppress_stdout, suppress_stderr: config.suppress_stderr }
    }
}

/// An engine that attempts to process a staged model.
#[async_trait::async_trait]
pub trait Engine: Send + Sync {
    /// Engine name; matches the classifier registration for execution engines.
    fn name(&self) -> &str;

    /// Attempt to process the artifacts. `Ok(())` is a pass.
    async fn run(&self, artifacts: &Artifacts) -> Result<(), EngineError>;
}
