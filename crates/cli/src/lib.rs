// Copyright 2025 AOT Benchmarker Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI for the AOT composite benchmarker.
//!
//! This crate provides the `aotbench` command: `run` builds and benchmarks
//! the configurations of a description file, `validate` only checks it,
//! `report` re-averages a stored results file, and `engine` is the build
//! engine entry point used inside builder containers.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod logging;
pub mod settings;

use aotbench_adapters::{
    AdapterError, BuildEngine, ContainerBuilder, EngineEnvironment, LoadClient, NativeBuilder,
    ProcessRunner,
};
use aotbench_core::{BenchmarkDescription, CoreError, ValidationReport};
use aotbench_pipeline::{
    BuildOrchestrator, Pipeline, PipelineError, RunOrchestrator, SessionOptions,
};
use aotbench_results::io::{read_results_json, write_report};
use aotbench_results::markdown::generate_summary;
use aotbench_results::{average, GlobalResults, ReportFormat, TableModel};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::settings::Settings;

/// Exit code of a run that failed while executing.
pub const EXIT_FAILURE: u8 = 1;

/// Exit code of a run rejected for configuration errors.
pub const EXIT_CONFIGURATION: u8 = 2;

/// AOT composite benchmarker.
#[derive(Parser, Debug)]
#[command(name = "aotbench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file (defaults to ./aotbench.toml when present).
    #[arg(long, global = true, env = "AOTBENCH_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the variants of every configuration, run each one and report.
    ///
    /// Every iteration record is written to `<results>/results-<ts>.json`
    /// and the complete log to `<logs>/run-log-<ts>.txt`.
    Run {
        /// Benchmark description (YAML).
        #[arg(long, env = "AOTBENCH_CONFIG_FILE")]
        config_file: PathBuf,

        /// Iterations per configuration.
        #[arg(short, long)]
        iterations: Option<usize>,

        /// Only build the artifacts.
        #[arg(long)]
        build_only: bool,

        /// Metrics to average into the report.
        #[arg(short, long, num_args = 1..)]
        metrics: Vec<String>,

        /// Report format: text, csv or markdown.
        #[arg(short, long, default_value = "text")]
        format: ReportFormat,

        /// Report file (stdout when omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Kill a load client run after this many seconds.
        #[arg(long)]
        iteration_timeout: Option<u64>,
    },

    /// Check a benchmark description without running anything.
    Validate {
        /// Benchmark description (YAML).
        #[arg(long, env = "AOTBENCH_CONFIG_FILE")]
        config_file: PathBuf,
    },

    /// Average metrics of a stored results file.
    Report {
        /// Results JSON written by `run`.
        #[arg(long)]
        results: PathBuf,

        /// Metrics to average.
        #[arg(short, long, num_args = 1.., required = true)]
        metrics: Vec<String>,

        /// Report format: text, csv or markdown.
        #[arg(short, long, default_value = "text")]
        format: ReportFormat,

        /// Report file (stdout when omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compile one variant as described by the build engine environment
    /// variables.
    Engine,
}

/// Run the CLI with parsed arguments.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run {
            config_file,
            iterations,
            build_only,
            metrics,
            format,
            output,
            iteration_timeout,
        } => {
            let settings = Settings::load(cli.settings.as_deref())?;
            let layout = settings.layout();
            layout.ensure_dirs()?;
            logging::init(Some(&layout.log_file()), cli.verbose)?;
            info!(log = %layout.log_file().display(), "Benchmark session started");

            let mut configurations = BenchmarkDescription::load(&config_file)?.resolve()?;
            for config in &configurations {
                info!("{config}");
            }

            let build_runner = Arc::new(ProcessRunner::new());
            let planner = BuildOrchestrator::new(
                layout,
                Box::new(ContainerBuilder::new(build_runner.clone(), &settings.docker)),
                Box::new(NativeBuilder::new(build_runner)),
            );

            let mut client_runner = ProcessRunner::new();
            if let Some(seconds) = iteration_timeout {
                client_runner = client_runner.with_timeout(Duration::from_secs(seconds));
            }
            let client = LoadClient::new(
                &settings.crank,
                &settings.app_framework,
                &settings.profile_prefix,
            );
            let runs = RunOrchestrator::new(
                client_runner,
                client,
                iterations.unwrap_or(settings.iterations),
            );

            let outcome = Pipeline::new(planner, runs)
                .execute(&mut configurations, &SessionOptions { build_only, metrics })
                .await?;

            if let Some(table) = &outcome.table {
                let report = render(format, &outcome.results, table)?;
                write_report(&report, output.as_deref())?;
            }
            if let Some(path) = &outcome.results_file {
                println!("Results written to {}", path.display());
            }
            Ok(())
        }

        Commands::Validate { config_file } => {
            logging::init(None, cli.verbose)?;
            let configurations = BenchmarkDescription::load(&config_file)?.resolve()?;
            for config in &configurations {
                println!("{config}");
            }
            println!(
                "{}",
                format!("{} configuration(s) are valid", configurations.len()).green()
            );
            Ok(())
        }

        Commands::Report {
            results,
            metrics,
            format,
            output,
        } => {
            logging::init(None, cli.verbose)?;
            report(&results, &metrics, format, output.as_deref())
        }

        Commands::Engine => {
            logging::init(None, cli.verbose)?;
            let env = EngineEnvironment::from_env()?;
            let invocations = BuildEngine::new(ProcessRunner::new()).process(&env).await?;
            info!(variant = %env.variant, invocations, "Engine build complete");
            Ok(())
        }
    }
}

fn report(
    results: &Path,
    metrics: &[String],
    format: ReportFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let stored = read_results_json(results)?;
    let table = average(&stored, metrics)?;
    write_report(&render(format, &stored, &table)?, output)?;
    Ok(())
}

/// Render a report. Markdown reports carry the full summary.
pub fn render(
    format: ReportFormat,
    results: &GlobalResults,
    table: &TableModel<f64>,
) -> anyhow::Result<String> {
    let rendered = match format {
        ReportFormat::Markdown => generate_summary(results, table)?,
        other => other.render(table)?,
    };
    Ok(rendered)
}

/// Configuration errors carried by `err`, if any.
pub fn validation_report(err: &anyhow::Error) -> Option<&ValidationReport> {
    if let Some(CoreError::Invalid(report)) = err.downcast_ref::<CoreError>() {
        return Some(report);
    }
    match err.downcast_ref::<PipelineError>() {
        Some(PipelineError::Resources(report))
        | Some(PipelineError::Core(CoreError::Invalid(report))) => Some(report),
        _ => None,
    }
}

/// Process exit code for a failed command.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    let configuration = validation_report(err).is_some()
        || err
            .downcast_ref::<PipelineError>()
            .map(PipelineError::is_configuration_error)
            .unwrap_or(false)
        || matches!(
            err.downcast_ref::<AdapterError>(),
            Some(AdapterError::MissingEnv(_) | AdapterError::InvalidEnv { .. })
        );

    if configuration {
        EXIT_CONFIGURATION
    } else {
        EXIT_FAILURE
    }
}

/// Print a failed command's error to stderr, grouping configuration errors
/// by configuration.
pub fn report_error(err: &anyhow::Error) {
    match validation_report(err) {
        Some(report) => {
            eprintln!("{}", "Configuration errors:".red().bold());
            for (group, messages) in report.groups() {
                eprintln!("  {}", group.bold());
                for message in messages {
                    eprintln!("    - {message}");
                }
            }
            eprintln!("{}", format!("Total errors: {}", report.total()).red());
        }
        None => eprintln!("{} {err:#}", "Error:".red().bold()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aotbench_results::{ConfigurationResults, IterationRecord};

    #[test]
    fn test_parse_run_arguments() {
        let cli = Cli::try_parse_from([
            "aotbench",
            "run",
            "--config-file",
            "bench.yml",
            "--iterations",
            "3",
            "--metrics",
            "Requests/sec",
            "Mean latency (ms)",
            "--format",
            "csv",
        ])
        .unwrap();

        match cli.command {
            Commands::Run {
                config_file,
                iterations,
                metrics,
                format,
                build_only,
                ..
            } => {
                assert_eq!(config_file, PathBuf::from("bench.yml"));
                assert_eq!(iterations, Some(3));
                assert_eq!(metrics, vec!["Requests/sec", "Mean latency (ms)"]);
                assert_eq!(format, ReportFormat::Csv);
                assert!(!build_only);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_report_requires_metrics() {
        assert!(Cli::try_parse_from(["aotbench", "report", "--results", "r.json"]).is_err());
    }

    #[test]
    fn test_exit_codes() {
        let mut report = ValidationReport::default();
        report.push("cfg", "Unknown build flag 'fastest'");

        let invalid = anyhow::Error::from(CoreError::Invalid(report.clone()));
        assert_eq!(exit_code(&invalid), EXIT_CONFIGURATION);
        assert_eq!(validation_report(&invalid).map(ValidationReport::total), Some(1));

        let resources = anyhow::Error::from(PipelineError::Resources(report));
        assert_eq!(exit_code(&resources), EXIT_CONFIGURATION);

        let failed = anyhow::Error::from(PipelineError::Adapter(AdapterError::ExitStatus {
            command: "crank".to_string(),
            code: Some(1),
        }));
        assert_eq!(exit_code(&failed), EXIT_FAILURE);
        assert!(validation_report(&failed).is_none());
    }

    #[test]
    fn test_markdown_report_has_summary() {
        let mut results = GlobalResults::new();
        let mut runs = ConfigurationResults::new();
        let mut record = IterationRecord::new(1);
        record.insert("Requests/sec", "100");
        runs.push(record);
        results.insert("cfg-a", runs);
        let table = average(&results, &["Requests/sec"]).unwrap();

        let markdown = render(ReportFormat::Markdown, &results, &table).unwrap();
        assert!(markdown.starts_with("# Benchmark Summary"));
        assert!(markdown.contains("| cfg-a | 100 |"));

        let csv = render(ReportFormat::Csv, &results, &table).unwrap();
        assert_eq!(csv, "Configuration,Requests/sec\ncfg-a,100\n");
    }
}
