//! Artifact selection, staging and repair.
//!
//! Staged files live under `{work_dir}/{model_id}/` regardless of the cache
//! mode, so a run can be inspected after the fact.

pub mod repair;
pub mod select;

pub use repair::{repair_file, repair_reference};
pub use select::{Selection, SkipReason, is_sedml, select};

use std::path::{Path, PathBuf};

use bmcheck_core::Error;

use crate::biomodels::Repository;

/// The files one model is run with, on local disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub dir: PathBuf,
    pub sbml: PathBuf,
    pub sedml: PathBuf,
}

impl Artifacts {
    pub fn sbml_file(&self) -> &str {
        file_name(&self.sbml)
    }

    pub fn sedml_file(&self) -> &str {
        file_name(&self.sedml)
    }
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|name| name.to_str()).unwrap_or_default()
}

/// Download the selected files of `model_id` into `{work_dir}/{model_id}/`.
///
/// # Errors
///
/// Returns `Error::InvalidResponse` if `model_id` is not a plain path
/// component, before anything is written.
pub async fn stage(
    repo: &dyn Repository, work_dir: &Path, model_id: &str, selection: &Selection,
) -> Result<Artifacts, Error> {
    if !select::is_safe_file_name(model_id) {
        return Err(Error::InvalidResponse(format!("unsafe model identifier '{model_id}'")));
    }

    let dir = work_dir.join(model_id);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| Error::io(format!("create {}", dir.display()), e))?;

    let sbml = dir.join(&selection.sbml_file);
    let sedml = dir.join(&selection.sedml_file);

    for (filename, path) in [(&selection.sbml_file, &sbml), (&selection.sedml_file, &sedml)] {
        let bytes = repo.download(model_id, filename).await?;
        tokio::fs::write(path, &bytes)
            .await
            .map_err(|e| Error::io(format!("write {}", path.display()), e))?;
        tracing::debug!(model_id, filename = filename.as_str(), bytes = bytes.len(), "staged artifact");
    }

    Ok(Artifacts { dir, sbml, sedml })
}
