//! External command engines.
//!
//! Command templates are argv vectors. Each argument may contain the
//! placeholders `{sbml}`, `{sedml}` (absolute paths of the staged files) and
//! `{dir}` (the model's work directory, also the process working directory).

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::Command;

use super::{Engine, EngineError, OutputPolicy};
use crate::artifacts::Artifacts;

/// Engine backed by an external process. Exit status zero is a pass.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    name: String,
    argv: Vec<String>,
    policy: OutputPolicy,
    timeout: Option<Duration>,
}

impl CommandEngine {
    pub fn new(name: impl Into<String>, argv: Vec<String>) -> Self {
        Self { name: name.into(), argv, policy: OutputPolicy::default(), timeout: None }
    }

    pub fn with_policy(mut self, policy: OutputPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// The argv with placeholders filled in for `artifacts`.
    pub fn expand(&self, artifacts: &Artifacts) -> Vec<String> {
        let sbml = artifacts.sbml.to_string_lossy();
        let sedml = artifacts.sedml.to_string_lossy();
        let dir = artifacts.dir.to_string_lossy();

        self.argv
            .iter()
            .map(|arg| arg.replace("{sbml}", &sbml).replace("{sedml}", &sedml).replace("{dir}", &dir))
            .collect()
    }

    fn failure(&self, status: ExitStatus, stderr: &[u8]) -> EngineError {
        let text = String::from_utf8_lossy(stderr);
        let text = text.trim();

        if !text.is_empty() && !self.policy.suppress_stderr {
            tracing::debug!(engine = %self.name, stderr = %text, "engine stderr");
        }

        let message = if text.is_empty() { format!("exit status {}", exit_code(status)) } else { text.to_string() };
        EngineError::Failed { status: status.code(), message }
    }
}

fn exit_code(status: ExitStatus) -> String {
    status.code().map_or_else(|| "unknown (terminated by signal)".to_string(), |code| code.to_string())
}

#[async_trait::async_trait]
impl Engine for CommandEngine {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, artifacts: &Artifacts) -> Result<(), EngineError> {
        let argv = self.expand(artifacts);
        let Some((program, args)) = argv.split_first() else {
            return Err(EngineError::Spawn {
                program: String::new(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
            });
        };

        let mut cmd = Command::new(program);
        cmd.args(args);
        cmd.current_dir(&artifacts.dir);
        cmd.stdin(Stdio::null());
        cmd.stdout(if self.policy.suppress_stdout { Stdio::null() } else { Stdio::inherit() });
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        let start = std::time::Instant::now();
        let output = cmd.output();
        let output = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, output)
                .await
                .map_err(|_| EngineError::Timeout(timeout.as_millis() as u64))?,
            None => output.await,
        }
        .map_err(|source| EngineError::Spawn { program: program.clone(), source })?;

        tracing::debug!(
            engine = %self.name,
            status = ?output.status.code(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "engine finished"
        );

        if output.status.success() { Ok(()) } else { Err(self.failure(output.status, &output.stderr)) }
    }
}
