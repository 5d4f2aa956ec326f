//! Index page renderer: view models for `index.html` and the chart payload for `data.js`

use crate::reporter::templates::{DATA_TEMPLATE, INDEX_TEMPLATE};
use crate::results::{Configuration, ProjectResults, Run};
use crate::{IndexRenderer, RenderedOutput, ReportError, Templates};
use serde::Serialize;
use std::collections::BTreeMap;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Renders the shipped index page and data script
#[derive(Debug, Default)]
pub struct IndexPageRenderer;

/// Context of the `index.html` template
#[derive(Serialize)]
struct IndexView {
    projects: Vec<ProjectView>,
    project_count: usize,
    configuration_count: usize,
}

#[derive(Serialize)]
struct ProjectView {
    /// Position in the results list; the page uses it to find its chart data
    id: usize,
    name: String,
    configuration_count: usize,
    succeeded: usize,
    failed: usize,
    unknown: usize,
    all_succeeded: bool,
    configurations: Vec<ConfigurationView>,
}

/// Latest run of one configuration, flattened for the summary table
#[derive(Serialize)]
struct ConfigurationView {
    /// `<project id>-<configuration index>`, ties the table row to its chart series
    chart_id: String,
    key: String,
    target: String,
    toolchain: String,
    runs: usize,
    status: &'static str,
    date: Option<String>,
    runtime: Option<String>,
    max_freq: Option<String>,
    memory: Option<String>,
    resources: Vec<Metric>,
    versions: Vec<Metric>,
}

#[derive(Serialize)]
struct Metric {
    name: String,
    value: String,
}

/// Context of the `data.js` template
#[derive(Serialize)]
struct DataView {
    /// JSON text, inserted into the script with a triple-stash
    data: String,
}

/// Chart series of one project, in results order
#[derive(Serialize)]
struct ProjectSeries<'a> {
    project: &'a str,
    configurations: Vec<ConfigurationSeries<'a>>,
}

#[derive(Serialize)]
struct ConfigurationSeries<'a> {
    key: String,
    target: &'a str,
    toolchain: &'a str,
    history: Vec<HistoryPoint<'a>>,
}

/// One run as a point on the history charts
#[derive(Serialize)]
struct HistoryPoint<'a> {
    date: Option<String>,
    status: &'static str,
    runtime_total: Option<f64>,
    runtime: &'a BTreeMap<String, f64>,
    max_freq: Option<f64>,
    resources: &'a BTreeMap<String, u64>,
    memory: Option<f64>,
    wirelength: Option<u64>,
}

impl IndexPageRenderer {
    pub fn new() -> Self {
        Self
    }

    fn index_view(results: &[ProjectResults]) -> IndexView {
        let projects: Vec<ProjectView> = results
            .iter()
            .enumerate()
            .map(|(id, p)| Self::project_view(id, p))
            .collect();
        IndexView {
            project_count: projects.len(),
            configuration_count: projects.iter().map(|p| p.configuration_count).sum(),
            projects,
        }
    }

    fn project_view(id: usize, project: &ProjectResults) -> ProjectView {
        let summary = project.summary();
        ProjectView {
            id,
            name: project.name.clone(),
            configuration_count: summary.configurations,
            succeeded: summary.succeeded,
            failed: summary.failed,
            unknown: summary.unknown,
            all_succeeded: summary.configurations > 0 && summary.succeeded == summary.configurations,
            configurations: project
                .configurations
                .iter()
                .enumerate()
                .filter_map(|(cid, c)| Self::configuration_view(format!("{}-{}", id, cid), c))
                .collect(),
        }
    }

    fn configuration_view(chart_id: String, config: &Configuration) -> Option<ConfigurationView> {
        let latest = config.latest()?;
        let record = &latest.record;
        Some(ConfigurationView {
            chart_id,
            key: config.key.to_string(),
            target: config.key.target.clone(),
            toolchain: config.key.toolchain.clone(),
            runs: config.history.len(),
            status: record.status.as_str(),
            date: format_date(latest),
            runtime: record.total_runtime().map(|s| format!("{:.2} s", s)),
            max_freq: record
                .max_freq
                .as_ref()
                .and_then(|f| f.achieved_mhz())
                .map(|mhz| format!("{:.2} MHz", mhz)),
            memory: record.maximum_memory_use.map(|m| format!("{:.1} MiB", m)),
            resources: record
                .resources
                .iter()
                .map(|(name, count)| Metric {
                    name: name.clone(),
                    value: count.to_string(),
                })
                .collect(),
            versions: record
                .versions
                .iter()
                .map(|(name, version)| Metric {
                    name: name.clone(),
                    value: version.clone(),
                })
                .collect(),
        })
    }

    fn series(results: &[ProjectResults]) -> Vec<ProjectSeries<'_>> {
        results
            .iter()
            .map(|p| ProjectSeries {
                project: &p.name,
                configurations: p
                    .configurations
                    .iter()
                    .map(|c| ConfigurationSeries {
                        key: c.key.to_string(),
                        target: &c.key.target,
                        toolchain: &c.key.toolchain,
                        history: c.history.iter().map(history_point).collect(),
                    })
                    .collect(),
            })
            .collect()
    }
}

impl IndexRenderer for IndexPageRenderer {
    fn render(
        &self,
        templates: &Templates,
        results: &[ProjectResults],
    ) -> Result<RenderedOutput, ReportError> {
        let index_html = templates.render(INDEX_TEMPLATE, &Self::index_view(results))?;

        let data = serde_json::to_string(&Self::series(results)).map_err(ReportError::Serialize)?;
        let data_js = templates.render(
            DATA_TEMPLATE,
            &DataView {
                data: escape_json_for_script(&data),
            },
        )?;

        Ok(RenderedOutput {
            index_html,
            data_js,
        })
    }
}

fn history_point(run: &Run) -> HistoryPoint<'_> {
    let record = &run.record;
    HistoryPoint {
        date: format_date(run),
        status: record.status.as_str(),
        runtime_total: record.total_runtime(),
        runtime: &record.runtime,
        max_freq: record.max_freq.as_ref().and_then(|f| f.achieved_mhz()),
        resources: &record.resources,
        memory: record.maximum_memory_use,
        wirelength: record.wirelength,
    }
}

/// Normalized date if it parsed, else the raw string from the record
fn format_date(run: &Run) -> Option<String> {
    run.timestamp
        .map(|t| t.format(DATE_FORMAT).to_string())
        .or_else(|| run.record.date.clone())
}

/// Keeps the payload safe to paste into an inline `<script>` block
fn escape_json_for_script(s: &str) -> String {
    s.replace("</", "<\\/")
}
