// Copyright 2025 AOT Benchmarker Contributors
// SPDX-License-Identifier: Apache-2.0

//! Repeated load-client runs of planned configurations.

use aotbench_adapters::materials::directory_size_kb;
use aotbench_adapters::{CommandRunner, LoadClient};
use aotbench_core::Configuration;
use aotbench_results::ResultsAggregator;
use tracing::info;

use crate::error::{PipelineError, Result};

/// Runs every configuration a fixed number of times and feeds the output
/// to a [`ResultsAggregator`].
#[derive(Debug)]
pub struct RunOrchestrator<R> {
    runner: R,
    client: LoadClient,
    iterations: usize,
}

impl<R: CommandRunner> RunOrchestrator<R> {
    /// Create an orchestrator. `iterations` below one is raised to one.
    pub fn new(runner: R, client: LoadClient, iterations: usize) -> Self {
        Self {
            runner,
            client,
            iterations: iterations.max(1),
        }
    }

    /// Iterations per configuration.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Run one configuration to completion and seal its results.
    pub async fn run(
        &self,
        config: &Configuration,
        aggregator: &mut ResultsAggregator,
    ) -> Result<()> {
        let artifact = config
            .artifact()
            .ok_or_else(|| PipelineError::NoArtifact(config.name.clone()))?;
        let directories = artifact.directories();
        let size_kb = directory_size_kb(directories)?;

        info!(
            configuration = %config.name,
            variant = %config.variant_name(),
            assemblies_kb = size_kb,
            "Running configuration"
        );
        aggregator.begin(config.name.clone(), size_kb);

        let command = self.client.command(config, directories);
        for iteration in 1..=self.iterations {
            info!(
                configuration = %config.name,
                "Iteration {iteration}/{}",
                self.iterations
            );
            let output = self.runner.run(&command).await?;
            aggregator.record(iteration, &output)?;
        }

        aggregator.seal()?;
        Ok(())
    }

    /// Run every configuration in order.
    pub async fn run_all(
        &self,
        configurations: &[Configuration],
        aggregator: &mut ResultsAggregator,
    ) -> Result<()> {
        for (index, config) in configurations.iter().enumerate() {
            info!("Configuration {}/{}: {}", index + 1, configurations.len(), config.name);
            self.run(config, aggregator).await?;
        }
        Ok(())
    }
}
