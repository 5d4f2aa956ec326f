//! Per-project results: run records grouped by board/toolchain configuration

mod schema;

pub use schema::{parse_date, ClockFreq, MaxFreq, RunRecord, RunStatus};

use crate::{ReportError, ResultLoader};
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One run record together with where it was read from
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub source: PathBuf,
    pub timestamp: Option<NaiveDateTime>,
    pub record: RunRecord,
}

impl Run {
    pub fn new(source: PathBuf, record: RunRecord) -> Self {
        let timestamp = record.timestamp();
        Self {
            source,
            timestamp,
            record,
        }
    }
}

/// Board (or device) + toolchain pair that runs are grouped by
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConfigKey {
    pub target: String,
    pub toolchain: String,
}

impl std::fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.target, self.toolchain)
    }
}

/// All runs of one configuration, oldest first
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub key: ConfigKey,
    pub history: Vec<Run>,
}

impl Configuration {
    /// The most recent run
    pub fn latest(&self) -> Option<&Run> {
        self.history.last()
    }
}

/// Pass/fail counts over the latest run of each configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProjectSummary {
    pub configurations: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub unknown: usize,
}

/// Results of one project directory
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectResults {
    pub name: String,
    pub path: PathBuf,
    /// Ordered by configuration key
    pub configurations: Vec<Configuration>,
}

impl ProjectResults {
    /// Group `runs` into configurations and order each history by date.
    ///
    /// Undated runs sort before dated ones; ties keep source path order so
    /// the grouping does not depend on how the runs were collected.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, runs: Vec<Run>) -> Self {
        let mut grouped: BTreeMap<ConfigKey, Vec<Run>> = BTreeMap::new();
        for run in runs {
            let key = ConfigKey {
                target: run.record.target().to_string(),
                toolchain: run.record.toolchain.clone(),
            };
            grouped.entry(key).or_default().push(run);
        }

        let configurations = grouped
            .into_iter()
            .map(|(key, mut history)| {
                history.sort_by(|a, b| {
                    a.timestamp
                        .cmp(&b.timestamp)
                        .then_with(|| a.source.cmp(&b.source))
                });
                Configuration { key, history }
            })
            .collect();

        Self {
            name: name.into(),
            path: path.into(),
            configurations,
        }
    }

    pub fn run_count(&self) -> usize {
        self.configurations.iter().map(|c| c.history.len()).sum()
    }

    pub fn summary(&self) -> ProjectSummary {
        let mut summary = ProjectSummary {
            configurations: self.configurations.len(),
            ..Default::default()
        };
        for run in self.configurations.iter().filter_map(Configuration::latest) {
            match run.record.status {
                RunStatus::Succeeded => summary.succeeded += 1,
                RunStatus::Failed => summary.failed += 1,
                RunStatus::Unknown => summary.unknown += 1,
            }
        }
        summary
    }
}

/// Loads every `*.json` file below a project directory as a run record
#[derive(Debug, Default)]
pub struct JsonResultLoader;

impl JsonResultLoader {
    pub fn new() -> Self {
        Self
    }

    fn read_run(path: &Path) -> Result<Run, ReportError> {
        let content = fs::read_to_string(path).map_err(|e| ReportError::io(path, e))?;
        let record: RunRecord = serde_json::from_str(&content).map_err(|source| ReportError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Run::new(path.to_path_buf(), record))
    }
}

impl ResultLoader for JsonResultLoader {
    fn load(&self, project_name: &str, project_dir: &Path) -> Result<ProjectResults, ReportError> {
        let mut runs = Vec::new();
        for entry in WalkDir::new(project_dir).follow_links(true).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            // Failed runs are kept: the index reports them
            runs.push(Self::read_run(path)?);
        }
        Ok(ProjectResults::new(project_name, project_dir, runs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(json: &str) -> RunRecord {
        serde_json::from_str(json).unwrap()
    }

    fn run(source: &str, json: &str) -> Run {
        Run::new(PathBuf::from(source), record(json))
    }

    #[test]
    fn groups_runs_by_target_and_toolchain() {
        let runs = vec![
            run("a.json", r#"{"board": "arty", "toolchain": "vpr"}"#),
            run("b.json", r#"{"board": "arty", "toolchain": "nextpnr"}"#),
            run("c.json", r#"{"board": "arty", "toolchain": "vpr"}"#),
            run("d.json", r#"{"device": "ice40", "toolchain": "nextpnr"}"#),
        ];

        let p = ProjectResults::new("blinky", "/r/blinky", runs);

        let keys: Vec<String> = p.configurations.iter().map(|c| c.key.to_string()).collect();
        assert_eq!(keys, vec!["arty/nextpnr", "arty/vpr", "ice40/nextpnr"]);
        assert_eq!(p.configurations[1].history.len(), 2);
        assert_eq!(p.run_count(), 4);
    }

    #[test]
    fn history_sorted_by_date_with_undated_first() {
        let runs = vec![
            run("3.json", r#"{"toolchain": "vpr", "date": "2021-05-03T00:00:00"}"#),
            run("1.json", r#"{"toolchain": "vpr", "date": "2021-05-01T00:00:00"}"#),
            run("x.json", r#"{"toolchain": "vpr"}"#),
            run("2.json", r#"{"toolchain": "vpr", "date": "2021-05-02T00:00:00Z"}"#),
        ];

        let p = ProjectResults::new("blinky", "/r/blinky", runs);

        let order: Vec<_> = p.configurations[0]
            .history
            .iter()
            .map(|r| r.source.to_str().unwrap())
            .collect();
        assert_eq!(order, vec!["x.json", "1.json", "2.json", "3.json"]);
        assert_eq!(
            p.configurations[0].latest().unwrap().source,
            PathBuf::from("3.json")
        );
    }

    #[test]
    fn same_date_breaks_ties_by_source_path() {
        let runs = vec![
            run("b.json", r#"{"toolchain": "vpr", "date": "2021-05-01T00:00:00"}"#),
            run("a.json", r#"{"toolchain": "vpr", "date": "2021-05-01T00:00:00"}"#),
        ];
        let p = ProjectResults::new("p", "/r/p", runs);
        assert_eq!(p.configurations[0].history[0].source, PathBuf::from("a.json"));
    }

    #[test]
    fn summary_counts_latest_status_only() {
        let runs = vec![
            run("1.json", r#"{"board": "arty", "toolchain": "vpr", "date": "2021-05-01T00:00:00", "status": "failed"}"#),
            run("2.json", r#"{"board": "arty", "toolchain": "vpr", "date": "2021-05-02T00:00:00", "status": "succeeded"}"#),
            run("3.json", r#"{"board": "arty", "toolchain": "nextpnr", "status": "failed"}"#),
            run("4.json", r#"{"board": "basys3", "toolchain": "vivado"}"#),
        ];

        let s = ProjectResults::new("p", "/r/p", runs).summary();

        assert_eq!(
            s,
            ProjectSummary {
                configurations: 3,
                succeeded: 1,
                failed: 1,
                unknown: 1,
            }
        );
    }

    #[test]
    fn empty_project_has_no_configurations() {
        let p = ProjectResults::new("empty", "/r/empty", vec![]);
        assert!(p.configurations.is_empty());
        assert_eq!(p.summary(), ProjectSummary::default());
    }

    #[test]
    fn loader_reads_json_recursively_and_ignores_other_files() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("blinky");
        fs::create_dir_all(dir.join("2021-05-01")).unwrap();
        fs::write(
            dir.join("2021-05-01").join("arty_vpr.json"),
            r#"{"board": "arty", "toolchain": "vpr", "status": "succeeded"}"#,
        )
        .unwrap();
        fs::write(
            dir.join("arty_nextpnr.json"),
            r#"{"board": "arty", "toolchain": "nextpnr", "status": "failed"}"#,
        )
        .unwrap();
        fs::write(dir.join("build.log"), "not json").unwrap();

        let p = JsonResultLoader::new().load("blinky", &dir).unwrap();

        assert_eq!(p.name, "blinky");
        assert_eq!(p.path, dir);
        assert_eq!(p.run_count(), 2);
        assert_eq!(p.summary().failed, 1);
    }

    #[test]
    fn project_name_comes_from_directory_not_record() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("blinky");
        fs::create_dir(&dir).unwrap();
        fs::write(
            dir.join("run.json"),
            r#"{"project": "something-else", "toolchain": "vpr"}"#,
        )
        .unwrap();

        let p = JsonResultLoader::new().load("blinky", &dir).unwrap();

        assert_eq!(p.name, "blinky");
        assert_eq!(p.run_count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn loader_follows_symlinked_run_directories() {
        let tmp = TempDir::new().unwrap();
        let shared = tmp.path().join("shared-runs");
        fs::create_dir(&shared).unwrap();
        fs::write(shared.join("run.json"), r#"{"toolchain": "vpr"}"#).unwrap();
        let dir = tmp.path().join("blinky");
        fs::create_dir(&dir).unwrap();
        std::os::unix::fs::symlink(&shared, dir.join("nightly")).unwrap();

        let p = JsonResultLoader::new().load("blinky", &dir).unwrap();

        assert_eq!(p.run_count(), 1);
    }

    #[test]
    fn loader_on_empty_dir_yields_empty_project() {
        let tmp = TempDir::new().unwrap();
        let p = JsonResultLoader::new().load("none", tmp.path()).unwrap();
        assert_eq!(p.run_count(), 0);
    }

    #[test]
    fn loader_fails_on_invalid_json() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("broken.json"), "{ not json").unwrap();

        let err = JsonResultLoader::new().load("broken", tmp.path()).unwrap_err();

        match err {
            ReportError::Json { path, .. } => assert!(path.ends_with("broken.json")),
            other => panic!("expected Json error, got {:?}", other),
        }
    }
}
