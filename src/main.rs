//! toolperf-report: render the FPGA tool-perf results index

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use toolperf_report::config::{load_config, CliOverrides};
use toolperf_report::pipeline::generate_report_with;
use toolperf_report::scanner::ensure_input_dir;
use toolperf_report::{IndexPageRenderer, JsonResultLoader, Templates};

/// Generate the HTML index and chart data for FPGA tool-perf CI results
#[derive(Parser, Debug)]
#[command(name = "toolperf-report")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory containing one subdirectory of JSON run records per project
    #[arg(short, long)]
    in_dir: Option<PathBuf>,

    /// Save index.html and data/data.js in this directory
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Directory with the index.html and data.js templates (default: html)
    #[arg(short, long)]
    template_dir: Option<PathBuf>,

    /// Fail if the input directory does not exist instead of creating it
    #[arg(long)]
    strict: bool,

    /// Path to config file (default: search .toolperfrc.json in current dir and parents)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Quiet mode (warnings and errors only)
    #[arg(long, short)]
    quiet: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<ExitCode> {
    let args = Args::parse();

    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let settings = load_config(&cwd, args.config.as_deref())?.merge_with_cli(CliOverrides {
        in_dir: args.in_dir,
        out_dir: args.out_dir,
        template_dir: args.template_dir,
        strict: args.strict,
    })?;

    // Input directory first: with the default policy it is created even if
    // the templates turn out to be missing
    let created_input = ensure_input_dir(&settings.in_dir, settings.missing_input)?;

    let templates = Templates::load(&settings.template_dir).with_context(|| {
        format!(
            "Failed to load templates from {}",
            settings.template_dir.display()
        )
    })?;

    let quiet = args.quiet;
    let report = generate_report_with(
        &settings,
        &templates,
        &JsonResultLoader::new(),
        &IndexPageRenderer::new(),
        |path| {
            if !quiet {
                eprintln!(
                    "{}: Skipping `{}` because it's not a directory.",
                    "Info".blue(),
                    path.display()
                );
            }
        },
    )?;

    if created_input || report.created_input {
        eprintln!(
            "{}: Input directory {} did not exist; created it, no results to report",
            "Warning".yellow(),
            settings.in_dir.display()
        );
    }

    if !args.quiet {
        let configurations: usize = report
            .results
            .iter()
            .map(|p| p.configurations.len())
            .sum();
        let runs: usize = report.results.iter().map(|p| p.run_count()).sum();
        eprintln!(
            "{}: {} projects, {} configurations, {} runs",
            "Info".blue(),
            report.results.len(),
            configurations,
            runs
        );

        match &report.written {
            Some(written) => eprintln!(
                "{}: Wrote {} and {}",
                "Info".blue(),
                written.index.display(),
                written.data.display()
            ),
            None => eprintln!(
                "{}: No --out-dir given; rendered output was not saved",
                "Info".blue()
            ),
        }
    }

    Ok(ExitCode::SUCCESS)
}
