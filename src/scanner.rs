//! Input directory discovery: one project per immediate subdirectory

use crate::ReportError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// What to do when the input directory does not exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MissingInputPolicy {
    /// Create the directory; the run then has no projects
    #[default]
    Create,
    /// Fail with `ReportError::InputNotFound`
    #[serde(rename = "error")]
    Fail,
}

/// A project directory found in the input directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDir {
    /// Directory name, used as the project name
    pub name: String,
    pub path: PathBuf,
}

/// Result of listing the input directory
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Subdirectories in listing order
    pub projects: Vec<ProjectDir>,
    /// Entries that were not directories
    pub skipped: Vec<PathBuf>,
}

/// Make sure `in_dir` exists. Returns true if it had to be created.
pub fn ensure_input_dir(in_dir: &Path, policy: MissingInputPolicy) -> Result<bool, ReportError> {
    if in_dir.is_dir() {
        return Ok(false);
    }
    match policy {
        MissingInputPolicy::Create => {
            fs::create_dir_all(in_dir).map_err(|e| ReportError::io(in_dir, e))?;
            Ok(true)
        }
        MissingInputPolicy::Fail => Err(ReportError::InputNotFound(in_dir.to_path_buf())),
    }
}

/// List the immediate entries of `in_dir`, keeping directories only.
///
/// Entries keep the order the filesystem returns them in. Names are not
/// filtered, so hidden directories count as projects too. Symlinks to
/// directories are followed.
pub fn scan_projects(in_dir: &Path) -> Result<ScanOutcome, ReportError> {
    let entries = fs::read_dir(in_dir).map_err(|e| ReportError::io(in_dir, e))?;

    let mut outcome = ScanOutcome::default();
    for entry in entries {
        let entry = entry.map_err(|e| ReportError::io(in_dir, e))?;
        let path = entry.path();
        if !path.is_dir() {
            outcome.skipped.push(path);
            continue;
        }
        outcome.projects.push(ProjectDir {
            name: entry.file_name().to_string_lossy().into_owned(),
            path,
        });
    }
    Ok(outcome)
}
