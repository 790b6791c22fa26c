//! SED-ML model reference repair.
//!
//! Many curated SED-ML files reference a generic `model.xml` instead of the
//! SBML file shipped alongside them. The rewrite assumes the literal
//! `source="model.xml"` only ever denotes that one model reference.

use std::path::Path;

use bmcheck_core::Error;

/// The generic reference some SED-ML files carry.
pub const GENERIC_SOURCE: &str = r#"source="model.xml""#;

/// Rewrite generic model references to point at `sbml_file`.
///
/// Returns `None` when nothing needs repairing: the SBML file really is
/// `model.xml`, or the generic reference is absent.
pub fn repair_reference(sedml: &str, sbml_file: &str) -> Option<String> {
    if sbml_file == "model.xml" || !sedml.contains(GENERIC_SOURCE) {
        return None;
    }

    let replacement = format!(r#"source="{}""#, escape_attribute(sbml_file));
    Some(sedml.replace(GENERIC_SOURCE, &replacement))
}

/// Repair a SED-ML file in place. Returns whether the file was rewritten.
pub async fn repair_file(sedml_path: &Path, sbml_file: &str) -> Result<bool, Error> {
    let bytes = tokio::fs::read(sedml_path)
        .await
        .map_err(|e| Error::io(format!("read {}", sedml_path.display()), e))?;

    // Non UTF-8 content cannot hold the ASCII reference we rewrite.
    let Ok(text) = std::str::from_utf8(&bytes) else {
        return Ok(false);
    };

    let Some(repaired) = repair_reference(text, sbml_file) else {
        return Ok(false);
    };

    tokio::fs::write(sedml_path, repaired)
        .await
        .map_err(|e| Error::io(format!("write {}", sedml_path.display()), e))?;

    tracing::debug!(path = %sedml_path.display(), sbml_file, "repaired generic model reference");
    Ok(true)
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;").replace('<', "&lt;")
}
