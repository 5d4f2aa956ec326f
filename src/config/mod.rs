//! Configuration loading for toolperf-report

mod schema;

pub use schema::{CliOverrides, Config, Settings};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = ".toolperfrc.json";

/// Find and load the config file. Searches `work_dir` then its parents.
///
/// A `custom_path` must exist; without one, a missing file yields the defaults.
pub fn load_config(work_dir: &Path, custom_path: Option<&Path>) -> Result<Config> {
    let path = if let Some(p) = custom_path {
        let path = if p.is_absolute() {
            p.to_path_buf()
        } else {
            work_dir.join(p)
        };
        if path.exists() {
            Some(path)
        } else {
            anyhow::bail!("Config file not found: {}", path.display());
        }
    } else {
        find_config_in_parents(work_dir)
    };

    match path {
        Some(path) => read_config(&path),
        None => Ok(Config::default()),
    }
}

fn read_config(config_path: &Path) -> Result<Config> {
    let content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
    let mut config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in config: {}", config_path.display()))?;
    config.base_dir = config_path.parent().map(Path::to_path_buf);
    Ok(config)
}

/// Search for .toolperfrc.json in directory and its parents
fn find_config_in_parents(mut dir: &Path) -> Option<PathBuf> {
    loop {
        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
}
