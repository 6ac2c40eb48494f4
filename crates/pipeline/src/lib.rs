// Copyright 2025 AOT Benchmarker Contributors
// SPDX-License-Identifier: Apache-2.0

//! End-to-end benchmark session.
//!
//! A session plans the artifact of every configuration (building each
//! variant once), runs each configuration for the requested number of
//! iterations, persists every iteration record as JSON and averages the
//! requested metrics into a report table.
//!
//! # Modules
//!
//! - [`planner`] - Artifact planning and build dispatch
//! - [`run`] - Repeated load client runs

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod error;
pub mod planner;
pub mod run;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{PipelineError, Result};
pub use planner::{BuildOrchestrator, PlanOutcome, VariantCache};
pub use run::RunOrchestrator;

use aotbench_adapters::CommandRunner;
use aotbench_core::Configuration;
use aotbench_results::io::write_results_json;
use aotbench_results::{average, GlobalResults, ResultsAggregator, TableModel};
use std::path::PathBuf;
use tracing::info;

/// What a session should do beyond planning.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Stop after building artifacts
    pub build_only: bool,
    /// Metrics to average into the report
    pub metrics: Vec<String>,
}

/// Result of a session.
#[derive(Debug, Default)]
pub struct SessionOutcome {
    /// How each configuration's artifact was obtained, in order
    pub plans: Vec<PlanOutcome>,
    /// Every recorded iteration
    pub results: GlobalResults,
    /// Where the results were written
    pub results_file: Option<PathBuf>,
    /// Averaged report, when metrics were requested
    pub table: Option<TableModel<f64>>,
}

/// Drives planning and runs for a list of configurations.
#[derive(Debug)]
pub struct Pipeline<R> {
    planner: BuildOrchestrator,
    runs: RunOrchestrator<R>,
}

impl<R: CommandRunner> Pipeline<R> {
    /// Assemble a pipeline.
    pub fn new(planner: BuildOrchestrator, runs: RunOrchestrator<R>) -> Self {
        Self { planner, runs }
    }

    /// Run a full session over `configurations`.
    pub async fn execute(
        &mut self,
        configurations: &mut [Configuration],
        options: &SessionOptions,
    ) -> Result<SessionOutcome> {
        let layout = self.planner.layout().clone();
        layout.ensure_dirs()?;

        self.planner.check_resources(configurations)?;
        let mut cache = VariantCache::new();
        let plans = self.planner.plan_all(configurations, &mut cache).await?;

        if options.build_only {
            info!(variants = cache.len(), "Build only requested, skipping runs");
            return Ok(SessionOutcome {
                plans,
                ..Default::default()
            });
        }

        let mut aggregator = ResultsAggregator::new();
        self.runs.run_all(configurations, &mut aggregator).await?;
        let results = aggregator.into_results();

        let results_file = layout.results_file();
        write_results_json(&results, &results_file)?;

        let table = if options.metrics.is_empty() {
            None
        } else {
            Some(average(&results, &options.metrics)?)
        };

        Ok(SessionOutcome {
            plans,
            results,
            results_file: Some(results_file),
            table,
        })
    }
}
