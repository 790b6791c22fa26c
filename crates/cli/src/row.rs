//! Typed report rows.

use std::collections::BTreeMap;

use bmcheck_core::classify::normalize;
use bmcheck_core::{Cell, Classification, RowSource};

pub const MODEL_DESC: &str = "model_desc";
pub const SBML_FILE: &str = "sbml_file";
pub const SEDML_FILE: &str = "sedml_file";
pub const BROKEN_REF: &str = "broken_ref";
pub const VALID_SBML: &str = "valid_sbml";
pub const VALID_SBML_UNITS: &str = "valid_sbml_units";
pub const VALID_SEDML: &str = "valid_sedml";

/// Fixed leading columns as `(label, key)`, before one column per engine.
pub const BASE_COLUMNS: [(&str, &str); 7] = [
    ("Model", MODEL_DESC),
    ("SBML", SBML_FILE),
    ("SEDML", SEDML_FILE),
    ("broken-ref", BROKEN_REF),
    ("valid-sbml", VALID_SBML),
    ("valid-sbml-units", VALID_SBML_UNITS),
    ("valid-sedml", VALID_SEDML),
];

/// Boolean check columns.
pub const CHECK_KEYS: [&str; 3] = [VALID_SBML, VALID_SBML_UNITS, VALID_SEDML];

/// Cell text for a check that is not configured.
pub const NOT_APPLICABLE: &str = "n/a";

/// Result of one execution engine on one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineOutcome {
    Pass,
    Fail(Classification),
}

impl EngineOutcome {
    /// Passes are `true`; failures render as a collapsible block with the
    /// category in the summary line.
    pub fn cell(&self) -> Cell {
        match self {
            EngineOutcome::Pass => Cell::Bool(true),
            EngineOutcome::Fail(c) => {
                Cell::Text(format!("<details><summary>FAIL ({})</summary>```{}```</details>", c.tag, c.text))
            }
        }
    }
}

/// One processed model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRow {
    pub model_desc: String,
    pub sbml_file: String,
    pub sedml_file: String,
    pub broken_ref: bool,
    pub valid_sbml: Option<bool>,
    pub valid_sbml_units: Option<bool>,
    pub valid_sedml: Option<bool>,
    /// Engine outcomes by column key.
    pub engines: BTreeMap<String, EngineOutcome>,
}

impl ModelRow {
    /// `[{id}]({page})<br/><sup>{name}</sup>`, with the repository-supplied
    /// id and name flattened to one line and `|` escaped.
    pub fn describe(model_id: &str, page: &str, name: &str) -> String {
        format!("[{}]({page})<br/><sup>{}</sup>", normalize(&model_id), normalize(&name))
    }
}

fn check_cell(value: Option<bool>) -> Cell {
    value.map_or_else(|| Cell::from(NOT_APPLICABLE), Cell::Bool)
}

impl RowSource for ModelRow {
    fn cell(&self, key: &str) -> Option<Cell> {
        let cell = match key {
            MODEL_DESC => Cell::from(self.model_desc.as_str()),
            SBML_FILE => Cell::from(self.sbml_file.as_str()),
            SEDML_FILE => Cell::from(self.sedml_file.as_str()),
            BROKEN_REF => Cell::Bool(self.broken_ref),
            VALID_SBML => check_cell(self.valid_sbml),
            VALID_SBML_UNITS => check_cell(self.valid_sbml_units),
            VALID_SEDML => check_cell(self.valid_sedml),
            _ => return self.engines.get(key).map(EngineOutcome::cell),
        };
        Some(cell)
    }
}
