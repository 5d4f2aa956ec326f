//! Persists rendered documents under the output directory

use crate::{RenderedOutput, ReportError};
use std::fs;
use std::path::{Path, PathBuf};

pub const INDEX_FILENAME: &str = "index.html";
pub const DATA_DIRNAME: &str = "data";
pub const DATA_FILENAME: &str = "data.js";

/// Paths written by `write_outputs`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFiles {
    pub index: PathBuf,
    pub data: PathBuf,
}

/// Write `<out_dir>/index.html` and `<out_dir>/data/data.js`.
///
/// Missing directories are created; existing files are overwritten in place.
pub fn write_outputs(out_dir: &Path, output: &RenderedOutput) -> Result<WrittenFiles, ReportError> {
    let data_dir = out_dir.join(DATA_DIRNAME);
    fs::create_dir_all(&data_dir).map_err(|e| ReportError::io(&data_dir, e))?;

    let index = out_dir.join(INDEX_FILENAME);
    fs::write(&index, &output.index_html).map_err(|e| ReportError::io(&index, e))?;

    let data = data_dir.join(DATA_FILENAME);
    fs::write(&data, &output.data_js).map_err(|e| ReportError::io(&data, e))?;

    Ok(WrittenFiles { index, data })
}
