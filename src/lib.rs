//! toolperf-report: HTML index generator for FPGA tool-performance CI results
//!
//! Reads one directory of JSON run records per project, groups the runs into
//! board/toolchain configurations and renders an index page plus a data
//! script used by the page to draw history charts.

pub mod config;
pub mod pipeline;
pub mod reporter;
pub mod results;
pub mod scanner;

pub use results::{JsonResultLoader, ProjectResults};
pub use reporter::{IndexPageRenderer, Templates};

use std::path::{Path, PathBuf};

/// The two documents produced by a render pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedOutput {
    /// Rendered `index.html`
    pub index_html: String,
    /// Rendered `data/data.js`
    pub data_js: String,
}

/// Builds the result record for one project directory
pub trait ResultLoader {
    fn load(&self, project_name: &str, project_dir: &Path) -> Result<ProjectResults, ReportError>;
}

/// Turns the loaded projects into the index page and data script
pub trait IndexRenderer {
    fn render(
        &self,
        templates: &Templates,
        results: &[ProjectResults],
    ) -> Result<RenderedOutput, ReportError>;
}

/// Errors raised while collecting, rendering or writing a report
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Input directory not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Failed to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk results directory")]
    Walk(#[from] walkdir::Error),

    #[error("Invalid run record {}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid template {name}")]
    Template {
        name: String,
        #[source]
        source: Box<handlebars::TemplateError>,
    },

    #[error("Failed to render {name}")]
    Render {
        name: String,
        #[source]
        source: Box<handlebars::RenderError>,
    },

    #[error("Failed to serialize chart data")]
    Serialize(#[source] serde_json::Error),
}

impl ReportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReportError::Io {
            path: path.into(),
            source,
        }
    }
}
