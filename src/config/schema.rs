//! Config schema and deserialization

use crate::reporter::DEFAULT_TEMPLATE_DIR;
use crate::scanner::MissingInputPolicy;
use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root config structure for .toolperfrc.json
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory holding one subdirectory per project
    #[serde(default)]
    pub in_dir: Option<PathBuf>,

    /// Where index.html and data/data.js are written
    #[serde(default)]
    pub out_dir: Option<PathBuf>,

    /// Directory containing the index.html and data.js templates
    #[serde(default)]
    pub template_dir: Option<PathBuf>,

    /// "create" (default) or "error"
    #[serde(default)]
    pub missing_input: Option<MissingInputPolicy>,

    /// Directory of the file this config was read from; relative paths resolve against it
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

/// CLI values that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub in_dir: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub template_dir: Option<PathBuf>,
    pub strict: bool,
}

/// Effective settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub in_dir: PathBuf,
    pub out_dir: Option<PathBuf>,
    pub template_dir: PathBuf,
    pub missing_input: MissingInputPolicy,
}

impl Settings {
    /// Settings with defaults for everything but the input directory
    pub fn new(in_dir: impl Into<PathBuf>) -> Self {
        Self {
            in_dir: in_dir.into(),
            out_dir: None,
            template_dir: PathBuf::from(DEFAULT_TEMPLATE_DIR),
            missing_input: MissingInputPolicy::default(),
        }
    }
}

impl Config {
    /// Merge CLI values over the file values. Fails if no input directory is known.
    pub fn merge_with_cli(self, cli: CliOverrides) -> Result<Settings> {
        let in_dir = cli
            .in_dir
            .or_else(|| self.resolve(self.in_dir.as_deref()))
            .ok_or_else(|| {
                anyhow::anyhow!("No input directory given: pass --in-dir or set inDir in the config file")
            })?;

        let out_dir = cli.out_dir.or_else(|| self.resolve(self.out_dir.as_deref()));
        let template_dir = cli
            .template_dir
            .or_else(|| self.resolve(self.template_dir.as_deref()))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMPLATE_DIR));

        let missing_input = if cli.strict {
            MissingInputPolicy::Fail
        } else {
            self.missing_input.unwrap_or_default()
        };

        Ok(Settings {
            in_dir,
            out_dir,
            template_dir,
            missing_input,
        })
    }

    fn resolve(&self, path: Option<&Path>) -> Option<PathBuf> {
        let path = path?;
        match &self.base_dir {
            Some(base) if path.is_relative() => Some(base.join(path)),
            _ => Some(path.to_path_buf()),
        }
    }
}
