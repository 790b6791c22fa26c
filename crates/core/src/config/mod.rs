//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (BMCHECK_*, `__` separates nested keys)
//! 2. TOML config file (if BMCHECK_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::cache::CacheMode;
use crate::classify::{ErrorClassifier, RuleSpec, builtin_rules};

mod validation;

pub use validation::ConfigError;

/// SBML validation through pyNeuroML; the second argument selects strict unit checking.
const VALIDATE_SBML: &str = "import sys
from pyneuroml.sbml import validate_sbml_files
sys.exit(0 if validate_sbml_files([sys.argv[1]], strict_units=sys.argv[2] == 'strict') else 1)";

const VALIDATE_SEDML: &str = "import sys
from pyneuroml.sedml import validate_sedml_files
sys.exit(0 if validate_sedml_files([sys.argv[1]]) else 1)";

/// Prints only the exception message so category patterns can anchor on it.
const RUN_TELLURIUM: &str = "import sys
from pyneuroml import tellurium
try:
    tellurium.run_from_sedml_file([sys.argv[1]], ['-outputdir', 'none'])
except Exception as e:
    print(e, file=sys.stderr)
    sys.exit(1)";

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (BMCHECK_*)
/// 2. TOML config file (if BMCHECK_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the model repository API.
    ///
    /// Set via BMCHECK_API_URL environment variable.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Response format requested from the repository API.
    #[serde(default = "default_response_format")]
    pub response_format: String,

    /// Response cache mode: off, store or reuse.
    ///
    /// Set via BMCHECK_CACHE_MODE environment variable.
    #[serde(default)]
    pub cache_mode: CacheMode,

    /// Directory owned by the response cache.
    ///
    /// Set via BMCHECK_CACHE_DIR environment variable.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Directory receiving downloaded model files, one subdirectory per model.
    ///
    /// Written regardless of the cache mode so files can be inspected after a run.
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// Destination of the Markdown report.
    ///
    /// Set via BMCHECK_REPORT_PATH environment variable.
    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,

    /// Maximum number of listing entries to consider (0 = unlimited).
    ///
    /// Set via BMCHECK_MAX_COUNT environment variable.
    #[serde(default)]
    pub max_count: usize,

    /// Only identifiers containing this substring are processed.
    #[serde(default = "default_id_filter")]
    pub id_filter: String,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum bytes to fetch per request.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Discard engine stdout.
    #[serde(default = "default_true")]
    pub suppress_stdout: bool,

    /// Keep engine stderr out of the terminal (it is still captured for classification).
    #[serde(default)]
    pub suppress_stderr: bool,

    /// Optional per-invocation engine timeout in milliseconds.
    #[serde(default)]
    pub engine_timeout_ms: Option<u64>,

    /// Boolean validation checks.
    #[serde(default)]
    pub checks: ChecksConfig,

    /// Execution engines, one report column each, in this order.
    #[serde(default = "default_engines")]
    pub engines: Vec<EngineConfig>,
}

/// Command templates for the validation checks.
///
/// Templates are argv vectors; `{sbml}`, `{sedml}` and `{dir}` are replaced
/// with the downloaded file paths and the model directory. A check set to an
/// empty list (`sbml_units = []`) is not run and is reported as `n/a`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecksConfig {
    #[serde(default)]
    pub sbml: Option<Vec<String>>,
    #[serde(default)]
    pub sbml_units: Option<Vec<String>>,
    #[serde(default)]
    pub sedml: Option<Vec<String>>,
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            sbml: Some(python_command(VALIDATE_SBML, &["{sbml}", "lax"])),
            sbml_units: Some(python_command(VALIDATE_SBML, &["{sbml}", "strict"])),
            sedml: Some(python_command(VALIDATE_SEDML, &["{sedml}"])),
        }
    }
}

impl ChecksConfig {
    /// Turn empty command lists into unset checks.
    pub fn clear_empty(&mut self) {
        for check in [&mut self.sbml, &mut self.sbml_units, &mut self.sedml] {
            if check.as_ref().is_some_and(Vec::is_empty) {
                *check = None;
            }
        }
    }
}

/// One execution engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Engine name, used for classification and the column key.
    pub name: String,

    /// Column label (defaults to the name).
    #[serde(default)]
    pub label: Option<String>,

    /// Command template, see [`ChecksConfig`].
    pub command: Vec<String>,

    /// Category rules in match order; built-in rules are used when unset.
    #[serde(default)]
    pub rules: Option<Vec<RuleSpec>>,
}

impl EngineConfig {
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// Report column key for this engine.
    pub fn column_key(&self) -> String {
        format!("{}_outcome", self.name)
    }

    /// Configured rules, else built-in rules for the name, else none.
    pub fn effective_rules(&self) -> Vec<RuleSpec> {
        self.rules
            .clone()
            .or_else(|| builtin_rules(&self.name))
            .unwrap_or_default()
    }
}

fn python_command(script: &str, args: &[&str]) -> Vec<String> {
    let mut argv = vec!["python3".to_string(), "-c".to_string(), script.to_string()];
    argv.extend(args.iter().map(|a| a.to_string()));
    argv
}

fn default_api_url() -> String {
    "https://www.ebi.ac.uk/biomodels".into()
}

fn default_response_format() -> String {
    "json".into()
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache")
}

fn default_work_dir() -> PathBuf {
    PathBuf::from("tmp")
}

fn default_report_path() -> PathBuf {
    PathBuf::from("README.md")
}

fn default_id_filter() -> String {
    "BIOMD".into()
}

fn default_user_agent() -> String {
    "bmcheck/0.1".into()
}

fn default_timeout_ms() -> u64 {
    60_000
}

fn default_max_bytes() -> usize {
    67_108_864 // 64MB
}

fn default_true() -> bool {
    true
}

fn default_engines() -> Vec<EngineConfig> {
    vec![EngineConfig {
        name: "tellurium".into(),
        label: None,
        command: python_command(RUN_TELLURIUM, &["{sedml}"]),
        rules: None,
    }]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            response_format: default_response_format(),
            cache_mode: CacheMode::Off,
            cache_dir: default_cache_dir(),
            work_dir: default_work_dir(),
            report_path: default_report_path(),
            max_count: 0,
            id_filter: default_id_filter(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
            suppress_stdout: true,
            suppress_stderr: false,
            engine_timeout_ms: None,
            checks: ChecksConfig::default(),
            engines: default_engines(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn engine_timeout(&self) -> Option<Duration> {
        self.engine_timeout_ms.map(Duration::from_millis)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `BMCHECK_`
    /// 2. TOML file from `BMCHECK_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("BMCHECK_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("BMCHECK_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let mut config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;
        config.checks.clear_empty();

        config.validate()?;

        Ok(config)
    }

    /// Build the error classifier from the configured engines.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPattern` if a rule does not compile.
    pub fn classifier(&self) -> Result<ErrorClassifier, Error> {
        let mut classifier = ErrorClassifier::new();
        for engine in &self.engines {
            classifier.register(&engine.name, &engine.effective_rules())?;
        }
        Ok(classifier)
    }
}
