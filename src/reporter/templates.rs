//! Handlebars template registry for the index page and data script

use crate::ReportError;
use handlebars::Handlebars;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Template name (and file name inside the template directory) of the index page
pub const INDEX_TEMPLATE: &str = "index.html";
/// Template name (and file name inside the template directory) of the data script
pub const DATA_TEMPLATE: &str = "data.js";

/// Default template directory, relative to the working directory
pub const DEFAULT_TEMPLATE_DIR: &str = "html";

/// The two loaded templates. Built once per run and handed to the renderer.
pub struct Templates {
    registry: Handlebars<'static>,
}

impl Templates {
    /// Load `index.html` and `data.js` from `dir`
    pub fn load(dir: &Path) -> Result<Self, ReportError> {
        let index = Self::read(dir, INDEX_TEMPLATE)?;
        let data = Self::read(dir, DATA_TEMPLATE)?;
        Self::from_strings(&index, &data)
    }

    /// Build from template sources already in memory
    pub fn from_strings(index: &str, data: &str) -> Result<Self, ReportError> {
        let mut registry = Handlebars::new();
        for (name, source) in [(INDEX_TEMPLATE, index), (DATA_TEMPLATE, data)] {
            registry
                .register_template_string(name, source)
                .map_err(|e| ReportError::Template {
                    name: name.to_string(),
                    source: Box::new(e),
                })?;
        }
        Ok(Self { registry })
    }

    /// Render the named template with `data` as context
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String, ReportError> {
        self.registry
            .render(name, data)
            .map_err(|e| ReportError::Render {
                name: name.to_string(),
                source: Box::new(e),
            })
    }

    fn read(dir: &Path, name: &str) -> Result<String, ReportError> {
        let path = dir.join(name);
        fs::read_to_string(&path).map_err(|e| ReportError::io(path, e))
    }
}

impl std::fmt::Debug for Templates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Templates").finish_non_exhaustive()
    }
}
