//! End-to-end batch runs against an in-memory repository and scripted engines.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bmcheck_cli::{Checks, Harness, RunSettings, write_report};
use bmcheck_client::artifacts::Artifacts;
use bmcheck_client::biomodels::{FileEntry, ModelFiles, ModelFormat};
use bmcheck_client::{Engine, EngineError, ModelInfo, Repository};
use bmcheck_core::classify::RuleSpec;
use bmcheck_core::{Error, ErrorClassifier};
use bytes::Bytes;

const SEDML: &str = r#"<sedML><listOfModels><model id="m" source="model.xml"/></listOfModels></sedML>"#;

#[derive(Default)]
struct MemoryRepo {
    ids: Vec<String>,
    models: HashMap<String, ModelInfo>,
    files: HashMap<(String, String), Bytes>,
    /// Models whose metadata request fails.
    broken: Vec<String>,
    listing_down: bool,
}

impl MemoryRepo {
    fn add(&mut self, id: &str, name: &str, sbml: &str, sedml: &str, sedml_body: &str) {
        self.ids.push(id.to_string());
        self.models.insert(
            id.to_string(),
            ModelInfo {
                name: name.to_string(),
                format: ModelFormat { name: "SBML".into() },
                files: ModelFiles {
                    main: vec![FileEntry { name: sbml.into(), description: String::new() }],
                    additional: Some(vec![FileEntry { name: sedml.into(), description: "SED-ML file".into() }]),
                },
            },
        );
        self.files.insert((id.into(), sbml.into()), Bytes::from_static(b"<sbml/>"));
        self.files.insert((id.into(), sedml.into()), Bytes::from(sedml_body.to_string()));
    }
}

#[async_trait::async_trait]
impl Repository for MemoryRepo {
    async fn list_identifiers(&self) -> Result<Vec<String>, Error> {
        if self.listing_down {
            return Err(Error::HttpError("status 503 for model/identifiers".into()));
        }
        Ok(self.ids.clone())
    }

    async fn model_info(&self, model_id: &str) -> Result<ModelInfo, Error> {
        if self.broken.iter().any(|id| id == model_id) {
            return Err(Error::HttpError(format!("status 500 for {model_id}")));
        }
        self.models.get(model_id).cloned().ok_or_else(|| Error::CacheMiss { key: model_id.to_string() })
    }

    async fn download(&self, model_id: &str, filename: &str) -> Result<Bytes, Error> {
        self.files
            .get(&(model_id.to_string(), filename.to_string()))
            .cloned()
            .ok_or_else(|| Error::HttpError(format!("status 404 for {filename}")))
    }

    fn model_page(&self, model_id: &str) -> String {
        format!("https://example.org/biomodels/{model_id}")
    }
}

/// Fails with a scripted message for the listed SBML files, passes otherwise.
struct ScriptedEngine {
    name: String,
    failures: HashMap<String, String>,
    seen: Arc<Mutex<Vec<String>>>,
}

impl ScriptedEngine {
    fn new(name: &str, failures: &[(&str, &str)]) -> Self {
        Self {
            name: name.to_string(),
            failures: failures.iter().map(|(f, m)| (f.to_string(), m.to_string())).collect(),
            seen: Arc::default(),
        }
    }
}

#[async_trait::async_trait]
impl Engine for ScriptedEngine {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, artifacts: &Artifacts) -> Result<(), EngineError> {
        let sbml = artifacts.sbml_file().to_string();
        self.seen.lock().unwrap().push(sbml.clone());
        match self.failures.get(&sbml) {
            Some(message) => Err(EngineError::Failed { status: Some(1), message: message.clone() }),
            None => Ok(()),
        }
    }
}

fn settings(work_dir: &std::path::Path) -> RunSettings {
    RunSettings { work_dir: work_dir.to_path_buf(), id_filter: "BIOMD".into(), max_count: 0 }
}

fn classifier() -> ErrorClassifier {
    let mut classifier = ErrorClassifier::new();
    classifier
        .register("sim", &[RuleSpec::new("^Unable to support delay", "delay"), RuleSpec::new("algebraic", "algebraic")])
        .unwrap();
    classifier
}

fn repo() -> MemoryRepo {
    let mut repo = MemoryRepo::default();
    repo.add("BIOMD0000000001", "First", "one.xml", "one.sedml", SEDML);
    repo.add("MODEL2000000000", "Uncurated", "u.xml", "u.sedml", SEDML);
    repo.add("BIOMD0000000002", "Second", "model.xml", "two.sedml", SEDML);
    repo.add("BIOMD0000000003", "Third", "three.xml", "three.sedml", "<sedML/>");
    repo
}

#[tokio::test]
async fn test_full_report() {
    let tmp = tempfile::tempdir().unwrap();
    let checks = Checks {
        sbml: Some(Box::new(ScriptedEngine::new("valid_sbml", &[]))),
        sbml_units: Some(Box::new(ScriptedEngine::new("valid_sbml_units", &[("three.xml", "units")]))),
        sedml: None,
    };
    let engine = ScriptedEngine::new(
        "sim",
        &[("one.xml", "Unable to support delay differential equations.\n"), ("three.xml", "segfault | core")],
    );

    let harness = Harness::new(Box::new(repo()), settings(tmp.path()))
        .with_checks(checks)
        .with_engine("sim", "sim_outcome", Box::new(engine));

    let mut classifier = classifier();
    let table = harness.run(&mut classifier).await.unwrap();

    assert_eq!(table.n_rows(), 3);
    assert_eq!(classifier.count("sim", "delay").unwrap(), 1);
    assert_eq!(classifier.count("sim", "other").unwrap(), 1);

    let expected = [
        "|Model|SBML|SEDML|broken-ref|valid-sbml|valid-sbml-units|valid-sedml|sim|",
        "|---|---|---|---|---|---|---|---|",
        "|n=3|||n_fixed=1|n_fail=0|n_fail=1|n_fail=0|n_fail=2<br/>delay=1 other=1|",
        "|[BIOMD0000000001](https://example.org/biomodels/BIOMD0000000001)<br/><sup>First</sup>|one.xml|one.sedml|fixed|pass|pass|n/a|<details><summary>FAIL (delay)</summary>```Unable to support delay differential equations.```</details>|",
        "|[BIOMD0000000002](https://example.org/biomodels/BIOMD0000000002)<br/><sup>Second</sup>|model.xml|two.sedml|ok|pass|pass|n/a|pass|",
        "|[BIOMD0000000003](https://example.org/biomodels/BIOMD0000000003)<br/><sup>Third</sup>|three.xml|three.sedml|ok|pass|FAIL|n/a|<details><summary>FAIL (other)</summary>```segfault \\| core```</details>|",
    ];
    assert_eq!(table.render(), format!("{}\n", expected.join("\n")));

    let repaired = std::fs::read_to_string(tmp.path().join("BIOMD0000000001").join("one.sedml")).unwrap();
    assert!(repaired.contains(r#"source="one.xml""#));
    assert!(!tmp.path().join("MODEL2000000000").exists());
}

#[tokio::test]
async fn test_max_count_limits_listing_entries() {
    let tmp = tempfile::tempdir().unwrap();
    let engine = ScriptedEngine::new("sim", &[]);
    let seen = Arc::clone(&engine.seen);

    let harness = Harness::new(Box::new(repo()), RunSettings { max_count: 2, ..settings(tmp.path()) })
        .with_engine("sim", "sim_outcome", Box::new(engine));

    let table = harness.run(&mut classifier()).await.unwrap();

    assert_eq!(table.n_rows(), 1);
    assert_eq!(*seen.lock().unwrap(), ["one.xml"]);
    assert!(table.render().contains("|n=1|"));
}

#[tokio::test]
async fn test_failed_candidate_is_skipped() {
    let tmp = tempfile::tempdir().unwrap();
    let mut repo = repo();
    repo.broken.push("BIOMD0000000002".into());
    repo.files.remove(&("BIOMD0000000003".to_string(), "three.sedml".to_string()));

    let harness = Harness::new(Box::new(repo), settings(tmp.path()));
    let table = harness.run(&mut classifier()).await.unwrap();

    assert_eq!(table.n_rows(), 1);
    assert_eq!(table.column("sbml_file").unwrap(), [bmcheck_core::Cell::from("one.xml")]);
}

#[tokio::test]
async fn test_unregistered_engine_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let harness = Harness::new(Box::new(repo()), settings(tmp.path())).with_engine(
        "copasi",
        "copasi_outcome",
        Box::new(ScriptedEngine::new("copasi", &[])),
    );

    let result = harness.run(&mut classifier()).await;
    assert!(matches!(result, Err(Error::UnknownEngine(name)) if name == "copasi"));
}

#[tokio::test]
async fn test_write_report() {
    let tmp = tempfile::tempdir().unwrap();
    let harness = Harness::new(Box::new(repo()), settings(&tmp.path().join("work")));
    let table = harness.run(&mut classifier()).await.unwrap();

    let path = tmp.path().join("out").join("README.md");
    write_report(&path, &table).await.unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, table.render());
    assert!(written.starts_with("|Model|SBML|SEDML|broken-ref|"));
}

/// Cell delimiters in a rendered line, ignoring escaped `\|`.
fn delimiters(line: &str) -> usize {
    let bytes = line.as_bytes();
    (0..bytes.len()).filter(|&i| bytes[i] == b'|' && (i == 0 || bytes[i - 1] != b'\\')).count()
}

#[tokio::test]
async fn test_free_text_cells_keep_row_shape() {
    let tmp = tempfile::tempdir().unwrap();
    let mut repo = MemoryRepo::default();
    repo.add("BIOMD0000000009", "Smith | Jones\nmodel", "a|b.xml", "s.sedml", SEDML);

    let harness = Harness::new(Box::new(repo), settings(tmp.path()))
        .with_engine("sim", "sim_outcome", Box::new(ScriptedEngine::new("sim", &[])));
    let rendered = harness.run(&mut classifier()).await.unwrap().render();

    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines.len(), 4);
    let header = delimiters(lines[0]);
    assert_eq!(header, 9);
    for line in &lines {
        assert_eq!(delimiters(line), header, "{line}");
    }
    assert!(lines[3].contains("<sup>Smith \\| Jones model</sup>"));
    assert!(lines[3].contains("|a\\|b.xml|"));
}

#[tokio::test]
async fn test_listing_failure_aborts_run() {
    let tmp = tempfile::tempdir().unwrap();
    let mut repo = repo();
    repo.listing_down = true;

    let harness = Harness::new(Box::new(repo), settings(tmp.path()));
    let result = harness.run(&mut classifier()).await;

    assert!(matches!(result, Err(Error::HttpError(msg)) if msg.contains("503")));
    assert!(!tmp.path().join("BIOMD0000000001").exists());
}
