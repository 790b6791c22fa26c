//! Artifact selection heuristics.
//!
//! A model record qualifies when it is a single-file SBML model shipped with
//! exactly one SED-ML companion. Everything else is skipped, not failed.

use std::fmt;

use crate::biomodels::ModelInfo;

/// Primary format name accepted for processing.
pub const PRIMARY_FORMAT: &str = "SBML";

/// File names chosen for one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub sbml_file: String,
    pub sedml_file: String,
}

/// Why a candidate was left out of the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    UnsupportedFormat(String),
    MainFileCount(usize),
    NoAdditionalFiles,
    SedmlFileCount(usize),
    UnsafeFileName(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnsupportedFormat(name) => write!(f, "unsupported format '{name}'"),
            SkipReason::MainFileCount(n) => write!(f, "expected one main file, found {n}"),
            SkipReason::NoAdditionalFiles => f.write_str("no additional files"),
            SkipReason::SedmlFileCount(n) => write!(f, "expected one SED-ML file, found {n}"),
            SkipReason::UnsafeFileName(name) => write!(f, "unsafe file name '{name}'"),
        }
    }
}

/// Whether an additional file looks like SED-ML by name or description.
///
/// Matches `SED-?ML` against `"{name}|{description}"`, upper-cased.
pub fn is_sedml(name: &str, description: &str) -> bool {
    let haystack = format!("{name}|{description}").to_uppercase();
    haystack.contains("SEDML") || haystack.contains("SED-ML")
}

/// File names are joined onto the work directory, so they must be a single
/// plain path component.
pub(crate) fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\', '\0'])
}

/// Choose the SBML and SED-ML files for a model.
pub fn select(info: &ModelInfo) -> Result<Selection, SkipReason> {
    if info.format.name != PRIMARY_FORMAT {
        return Err(SkipReason::UnsupportedFormat(info.format.name.clone()));
    }

    let [main] = info.files.main.as_slice() else {
        return Err(SkipReason::MainFileCount(info.files.main.len()));
    };

    let additional = info.files.additional.as_ref().ok_or(SkipReason::NoAdditionalFiles)?;
    let sedml: Vec<&str> = additional
        .iter()
        .filter(|file| is_sedml(&file.name, &file.description))
        .map(|file| file.name.as_str())
        .collect();

    let [sedml_file] = sedml.as_slice() else {
        return Err(SkipReason::SedmlFileCount(sedml.len()));
    };

    for name in [main.name.as_str(), *sedml_file] {
        if !is_safe_file_name(name) {
            return Err(SkipReason::UnsafeFileName(name.to_string()));
        }
    }

    Ok(Selection { sbml_file: main.name.clone(), sedml_file: (*sedml_file).to_string() })
}
