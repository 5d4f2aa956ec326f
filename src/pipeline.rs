//! The report pipeline: scan, load, render, write

use crate::config::Settings;
use crate::reporter::{write_outputs, WrittenFiles};
use crate::scanner::{ensure_input_dir, scan_projects};
use crate::{IndexRenderer, ProjectResults, RenderedOutput, ReportError, ResultLoader, Templates};
use std::path::{Path, PathBuf};

/// Everything a run produced, for the caller to report on
#[derive(Debug)]
pub struct ReportRun {
    /// Loaded projects in directory listing order
    pub results: Vec<ProjectResults>,
    pub output: RenderedOutput,
    /// Input entries skipped because they are not directories
    pub skipped: Vec<PathBuf>,
    /// The input directory did not exist and was created
    pub created_input: bool,
    /// `None` when no output directory was configured
    pub written: Option<WrittenFiles>,
}

/// Load one `ProjectResults` per subdirectory of `in_dir`.
///
/// Returns the results and the skipped non-directory entries.
pub fn collect_results<L: ResultLoader>(
    in_dir: &Path,
    loader: &L,
) -> Result<(Vec<ProjectResults>, Vec<PathBuf>), ReportError> {
    collect_results_with(in_dir, loader, |_| {})
}

/// Like `collect_results`, calling `on_skip` for every skipped entry before
/// any project is loaded, so skips are reported even if a load fails.
pub fn collect_results_with<L, F>(
    in_dir: &Path,
    loader: &L,
    mut on_skip: F,
) -> Result<(Vec<ProjectResults>, Vec<PathBuf>), ReportError>
where
    L: ResultLoader,
    F: FnMut(&Path),
{
    let scan = scan_projects(in_dir)?;
    for path in &scan.skipped {
        on_skip(path);
    }
    let results = scan
        .projects
        .iter()
        .map(|p| loader.load(&p.name, &p.path))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((results, scan.skipped))
}

/// Run the whole pipeline. The first error aborts the run; nothing is
/// written unless rendering succeeded.
pub fn generate_report<L: ResultLoader, R: IndexRenderer>(
    settings: &Settings,
    templates: &Templates,
    loader: &L,
    renderer: &R,
) -> Result<ReportRun, ReportError> {
    generate_report_with(settings, templates, loader, renderer, |_| {})
}

/// `generate_report` with a callback for skipped input entries
pub fn generate_report_with<L, R, F>(
    settings: &Settings,
    templates: &Templates,
    loader: &L,
    renderer: &R,
    on_skip: F,
) -> Result<ReportRun, ReportError>
where
    L: ResultLoader,
    R: IndexRenderer,
    F: FnMut(&Path),
{
    let created_input = ensure_input_dir(&settings.in_dir, settings.missing_input)?;
    let (results, skipped) = collect_results_with(&settings.in_dir, loader, on_skip)?;

    let output = renderer.render(templates, &results)?;

    let written = settings
        .out_dir
        .as_deref()
        .map(|out_dir| write_outputs(out_dir, &output))
        .transpose()?;

    Ok(ReportRun {
        results,
        output,
        skipped,
        created_input,
        written,
    })
}
