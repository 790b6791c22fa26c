//! Batch orchestration.
//!
//! For each listed identifier, in listing order: fetch metadata, select and
//! stage the artifacts, repair the model reference, run the checks and
//! engines, and append one row. Candidates are processed one at a time.
//!
//! ### Failure handling
//! - Listing failure aborts the run
//! - Cache and fetch failures skip the candidate (logged at warn)
//! - Selection mismatches skip the candidate (logged at debug)
//! - Engine failures are classified and recorded; they never skip

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use bmcheck_client::artifacts::{self, Artifacts};
use bmcheck_client::{CommandEngine, Engine, OutputPolicy, Repository};
use bmcheck_core::classify::normalize;
use bmcheck_core::{AppConfig, Cell, Error, ErrorClassifier, ReportTable};

use crate::row::{self, BASE_COLUMNS, CHECK_KEYS, EngineOutcome, ModelRow};

/// Candidate selection settings.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub work_dir: PathBuf,
    /// Only identifiers containing this substring are processed.
    pub id_filter: String,
    /// Listing entries to consider, 0 for all.
    pub max_count: usize,
}

impl RunSettings {
    pub fn from_app(config: &AppConfig) -> Self {
        Self { work_dir: config.work_dir.clone(), id_filter: config.id_filter.clone(), max_count: config.max_count }
    }
}

/// Boolean validators; unset checks are reported as `n/a`.
#[derive(Default)]
pub struct Checks {
    pub sbml: Option<Box<dyn Engine>>,
    pub sbml_units: Option<Box<dyn Engine>>,
    pub sedml: Option<Box<dyn Engine>>,
}

struct EngineColumn {
    label: String,
    key: String,
    engine: Box<dyn Engine>,
}

/// Runs one batch over a repository.
pub struct Harness {
    repo: Box<dyn Repository>,
    settings: RunSettings,
    checks: Checks,
    engines: Vec<EngineColumn>,
}

impl Harness {
    pub fn new(repo: Box<dyn Repository>, settings: RunSettings) -> Self {
        Self { repo, settings, checks: Checks::default(), engines: Vec::new() }
    }

    /// Build a harness running the configured command checks and engines.
    pub fn from_config(config: &AppConfig, repo: Box<dyn Repository>) -> Self {
        let policy = OutputPolicy::from_app(config);
        let timeout = config.engine_timeout();
        let command = |name: &str, argv: &Option<Vec<String>>| -> Option<Box<dyn Engine>> {
            argv.as_ref().filter(|argv| !argv.is_empty()).map(|argv| {
                Box::new(CommandEngine::new(name, argv.clone()).with_policy(policy).with_timeout(timeout))
                    as Box<dyn Engine>
            })
        };

        let checks = Checks {
            sbml: command(row::VALID_SBML, &config.checks.sbml),
            sbml_units: command(row::VALID_SBML_UNITS, &config.checks.sbml_units),
            sedml: command(row::VALID_SEDML, &config.checks.sedml),
        };

        let mut harness = Self::new(repo, RunSettings::from_app(config)).with_checks(checks);
        for engine in &config.engines {
            let runner = CommandEngine::new(&engine.name, engine.command.clone())
                .with_policy(policy)
                .with_timeout(timeout);
            harness = harness.with_engine(engine.label(), engine.column_key(), Box::new(runner));
        }
        harness
    }

    pub fn with_checks(mut self, checks: Checks) -> Self {
        self.checks = checks;
        self
    }

    /// Add an engine column. Engines run and render in the order added.
    pub fn with_engine(mut self, label: impl Into<String>, key: impl Into<String>, engine: Box<dyn Engine>) -> Self {
        self.engines.push(EngineColumn { label: label.into(), key: key.into(), engine });
        self
    }

    /// Empty report table with the fixed columns followed by one per engine.
    pub fn table(&self) -> Result<ReportTable, Error> {
        let labels: Vec<String> = BASE_COLUMNS
            .iter()
            .map(|(label, _)| label.to_string())
            .chain(self.engines.iter().map(|e| e.label.clone()))
            .collect();
        let keys: Vec<String> = BASE_COLUMNS
            .iter()
            .map(|(_, key)| key.to_string())
            .chain(self.engines.iter().map(|e| e.key.clone()))
            .collect();
        ReportTable::new(labels, keys)
    }

    /// Process every candidate and return the finished report.
    ///
    /// # Errors
    ///
    /// Fails if an engine has no classifier registration, or the identifier
    /// listing cannot be obtained.
    pub async fn run(&self, classifier: &mut ErrorClassifier) -> Result<ReportTable, Error> {
        if let Some(column) = self.engines.iter().find(|c| !classifier.is_registered(c.engine.name())) {
            return Err(Error::UnknownEngine(column.engine.name().to_string()));
        }

        let mut table = self.table()?;
        let ids = self.repo.list_identifiers().await?;
        let total = ids.len();
        let limit = if self.settings.max_count == 0 { total } else { self.settings.max_count.min(total) };

        for (index, model_id) in ids.iter().take(limit).enumerate() {
            tracing::info!(index = index + 1, total, model_id = %model_id, "processing candidate");

            if !model_id.contains(&self.settings.id_filter) {
                tracing::debug!(model_id = %model_id, filter = %self.settings.id_filter, "identifier filtered out");
                continue;
            }

            match self.process(model_id, classifier).await {
                Ok(Some(row)) => table.append_row(&row)?,
                Ok(None) => {}
                Err(e) if e.is_cache_error() || is_candidate_error(&e) => {
                    tracing::warn!(model_id = %model_id, error = %e, "skipping candidate");
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(rows = table.n_rows(), considered = limit, "batch finished");
        self.finish(table, classifier)
    }

    async fn process(&self, model_id: &str, classifier: &mut ErrorClassifier) -> Result<Option<ModelRow>, Error> {
        let info = self.repo.model_info(model_id).await?;

        let selection = match artifacts::select(&info) {
            Ok(selection) => selection,
            Err(reason) => {
                tracing::debug!(model_id, reason = %reason, "candidate skipped");
                return Ok(None);
            }
        };

        let staged = artifacts::stage(self.repo.as_ref(), &self.settings.work_dir, model_id, &selection).await?;
        let broken_ref = artifacts::repair_file(&staged.sedml, &selection.sbml_file).await?;

        let valid_sbml = run_check(self.checks.sbml.as_deref(), &staged).await;
        let valid_sbml_units = run_check(self.checks.sbml_units.as_deref(), &staged).await;
        let valid_sedml = run_check(self.checks.sedml.as_deref(), &staged).await;

        let mut engines = BTreeMap::new();
        for column in &self.engines {
            let outcome = match column.engine.run(&staged).await {
                Ok(()) => EngineOutcome::Pass,
                Err(e) => {
                    let classification = classifier.classify(column.engine.name(), &e)?;
                    tracing::debug!(model_id, engine = column.engine.name(), tag = %classification.tag, "engine failed");
                    EngineOutcome::Fail(classification)
                }
            };
            engines.insert(column.key.clone(), outcome);
        }

        Ok(Some(ModelRow {
            model_desc: ModelRow::describe(model_id, &self.repo.model_page(model_id), &info.name),
            sbml_file: normalize(&selection.sbml_file),
            sedml_file: normalize(&selection.sedml_file),
            broken_ref,
            valid_sbml,
            valid_sbml_units,
            valid_sedml,
            engines,
        }))
    }

    /// Compute summaries from the raw cells, then render cells as text.
    fn finish(&self, mut table: ReportTable, classifier: &ErrorClassifier) -> Result<ReportTable, Error> {
        table.set_summary_cell(row::MODEL_DESC, format!("n={}", table.n_rows()))?;

        for key in CHECK_KEYS {
            table.count_summary(key, Cell::is_false, "n_fail={count}")?;
        }
        table.count_summary(row::BROKEN_REF, Cell::is_true, "n_fixed={count}")?;

        for column in &self.engines {
            let failed = table.count_summary(&column.key, |cell| !cell.is_true(), "n_fail={count}")?;
            let breakdown = classifier.breakdown(column.engine.name())?;
            if failed > 0 && !breakdown.is_empty() {
                table.set_summary_cell(&column.key, format!("n_fail={failed}<br/>{breakdown}"))?;
            }
        }

        for key in CHECK_KEYS {
            table = table.transform_column(key, check_text)?;
        }
        table = table.transform_column(row::BROKEN_REF, |cell| Cell::from(if cell.is_true() { "fixed" } else { "ok" }))?;
        for column in &self.engines {
            table = table.transform_column(&column.key, engine_text)?;
        }

        Ok(table)
    }
}

/// Errors that only affect the current candidate.
fn is_candidate_error(error: &Error) -> bool {
    matches!(
        error,
        Error::Io { .. }
            | Error::HttpError(_)
            | Error::FetchTimeout(_)
            | Error::FetchTooLarge(_)
            | Error::InvalidResponse(_)
            | Error::InvalidUrl(_)
    )
}

async fn run_check(check: Option<&dyn Engine>, staged: &Artifacts) -> Option<bool> {
    let check = check?;
    match check.run(staged).await {
        Ok(()) => Some(true),
        Err(e) => {
            tracing::debug!(check = check.name(), error = %e, "check failed");
            Some(false)
        }
    }
}

fn check_text(cell: &Cell) -> Cell {
    match cell.as_bool() {
        Some(true) => Cell::from("pass"),
        Some(false) => Cell::from("FAIL"),
        None => cell.clone(),
    }
}

fn engine_text(cell: &Cell) -> Cell {
    if cell.is_true() { Cell::from("pass") } else { cell.clone() }
}

/// Write the rendered report, creating parent directories as needed.
pub async fn write_report(path: &Path, table: &ReportTable) -> Result<(), Error> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::io(format!("create {}", parent.display()), e))?;
    }

    tokio::fs::write(path, table.render())
        .await
        .map_err(|e| Error::io(format!("write {}", path.display()), e))?;

    tracing::info!(path = %path.display(), rows = table.n_rows(), "report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_text() {
        assert_eq!(check_text(&Cell::Bool(true)), Cell::from("pass"));
        assert_eq!(check_text(&Cell::Bool(false)), Cell::from("FAIL"));
        assert_eq!(check_text(&Cell::from("n/a")), Cell::from("n/a"));
    }

    #[test]
    fn test_engine_text() {
        assert_eq!(engine_text(&Cell::Bool(true)), Cell::from("pass"));
        let fail = Cell::from("<details><summary>FAIL (other)</summary>```x```</details>");
        assert_eq!(engine_text(&fail), fail);
    }

    #[test]
    fn test_candidate_errors() {
        assert!(is_candidate_error(&Error::HttpError("status 500".into())));
        assert!(!is_candidate_error(&Error::UnknownEngine("x".into())));
        assert!(!is_candidate_error(&Error::MissingColumn("x".into())));
    }

    #[test]
    fn test_run_settings_from_app() {
        let app = AppConfig { max_count: 5, ..Default::default() };
        let settings = RunSettings::from_app(&app);
        assert_eq!(settings.max_count, 5);
        assert_eq!(settings.id_filter, "BIOMD");
    }
}
