// Copyright 2025 AOT Benchmarker Contributors
// SPDX-License-Identifier: Apache-2.0

//! Artifact planning: decide which directories each configuration runs with,
//! building each variant at most once.

use aotbench_adapters::materials::{merge_missing_files, stage_file};
use aotbench_adapters::{ArtifactBuilder, BuildRequest};
use aotbench_core::layout::has_markers;
use aotbench_core::{ArtifactLocation, Configuration, CoreError, Layout, TargetOs, ValidationReport};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::error::{PipelineError, Result};

/// Variants resolved during one session, keyed by target OS and variant
/// name.
#[derive(Debug, Default)]
pub struct VariantCache {
    entries: HashMap<(TargetOs, String), PathBuf>,
}

impl VariantCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Output directory of a resolved variant.
    pub fn get(&self, os: TargetOs, variant: &str) -> Option<&PathBuf> {
        self.entries.get(&(os, variant.to_string()))
    }

    /// Record a resolved variant.
    pub fn insert(&mut self, os: TargetOs, variant: impl Into<String>, output: PathBuf) {
        self.entries.insert((os, variant.into()), output);
    }

    /// Number of resolved variants.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was resolved yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// How a configuration's artifact was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanOutcome {
    /// Supplied materials are used as is
    Vanilla,
    /// Resolved earlier in this session
    Memoized,
    /// Found complete on disk
    Reused,
    /// Compiled now
    Built,
}

/// Plans artifacts and dispatches builds to the OS-specific builder.
pub struct BuildOrchestrator {
    layout: Layout,
    container: Box<dyn ArtifactBuilder>,
    native: Box<dyn ArtifactBuilder>,
}

impl std::fmt::Debug for BuildOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildOrchestrator")
            .field("layout", &self.layout)
            .field("container", &self.container.name())
            .field("native", &self.native.name())
            .finish()
    }
}

impl BuildOrchestrator {
    /// Create an orchestrator. Linux variants go to `container`, Windows
    /// and macOS variants to `native`.
    pub fn new(
        layout: Layout,
        container: Box<dyn ArtifactBuilder>,
        native: Box<dyn ArtifactBuilder>,
    ) -> Self {
        Self {
            layout,
            container,
            native,
        }
    }

    /// Session layout.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    fn builder_for(&mut self, os: TargetOs) -> &mut dyn ArtifactBuilder {
        match os {
            TargetOs::Linux => self.container.as_mut(),
            TargetOs::Windows | TargetOs::Macos => self.native.as_mut(),
        }
    }

    /// Check that every configuration needing a build has a compiler and
    /// runtime on disk. Nothing is checked when no configuration builds.
    pub fn check_resources(&self, configurations: &[Configuration]) -> Result<()> {
        let mut report = ValidationReport::default();

        for config in configurations.iter().filter(|c| c.needs_build()) {
            match &config.materials.compiler {
                Some(compiler) if compiler.path.is_dir() => {}
                Some(compiler) => report.push(
                    &config.name,
                    format!(
                        "Compiler '{}' for {} was not found at {}",
                        compiler.name,
                        config.os,
                        compiler.path.display()
                    ),
                ),
                None => report.push(
                    &config.name,
                    format!("No compiler is available to build for {}", config.os),
                ),
            }
            match &config.materials.runtime {
                Some(runtime) if runtime.framework.is_dir() => {}
                Some(runtime) => report.push(
                    &config.name,
                    format!(
                        "Runtime '{}' framework directory {} was not found",
                        runtime.name,
                        runtime.framework.display()
                    ),
                ),
                None => report.push(&config.name, "No runtime is available to compile"),
            }
        }

        if report.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::Resources(report))
        }
    }

    /// Resolve the artifact of `config`, building its variant if needed.
    pub async fn plan(
        &mut self,
        config: &mut Configuration,
        cache: &mut VariantCache,
    ) -> Result<PlanOutcome> {
        if !config.needs_build() {
            let directories = match (&config.materials.processed, &config.materials.runtime) {
                (Some(processed), _) => vec![processed.path.clone()],
                (None, Some(runtime)) => runtime.directories(),
                (None, None) => {
                    let mut report = ValidationReport::default();
                    report.push(&config.name, "No runtime or processed assemblies to run with");
                    return Err(CoreError::Invalid(report).into());
                }
            };
            info!(configuration = %config.name, "Using vanilla assemblies, no build needed");
            config.set_artifact(ArtifactLocation::provided(directories))?;
            return Ok(PlanOutcome::Vanilla);
        }

        let variant = config.variant_name().to_string();
        if let Some(output) = cache.get(config.os, &variant) {
            info!(
                configuration = %config.name,
                variant = %variant,
                "Variant already resolved in this session"
            );
            config.set_artifact(ArtifactLocation::built(output.clone()))?;
            return Ok(PlanOutcome::Memoized);
        }

        let output = self.layout.output_dir(config.os, &variant);
        if has_markers(&output) {
            info!(
                configuration = %config.name,
                output = %output.display(),
                "Found existing build of variant, reusing it"
            );
            cache.insert(config.os, variant, output.clone());
            config.set_artifact(ArtifactLocation::built(output))?;
            return Ok(PlanOutcome::Reused);
        }

        let request = self.build_request(config, &variant, &output)?;
        let builder = self.builder_for(config.os);
        info!(
            configuration = %config.name,
            variant = %variant,
            builder = builder.name(),
            "Building variant"
        );
        builder.build(&request).await?;

        let mut copied = 0;
        for dir in request.runtime.directories() {
            if dir.is_dir() {
                copied += merge_missing_files(&dir, &output)?;
            }
        }
        debug!(variant = %variant, copied, "Merged remaining runtime files");

        cache.insert(config.os, variant, output.clone());
        config.set_artifact(ArtifactLocation::built(output))?;
        Ok(PlanOutcome::Built)
    }

    /// Plan every configuration in order.
    pub async fn plan_all(
        &mut self,
        configurations: &mut [Configuration],
        cache: &mut VariantCache,
    ) -> Result<Vec<PlanOutcome>> {
        let mut outcomes = Vec::with_capacity(configurations.len());
        for config in configurations.iter_mut() {
            outcomes.push(self.plan(config, cache).await?);
        }
        let built = outcomes.iter().filter(|o| **o == PlanOutcome::Built).count();
        info!(configurations = outcomes.len(), built, "Artifact planning finished");
        Ok(outcomes)
    }

    fn build_request(
        &self,
        config: &Configuration,
        variant: &str,
        output: &std::path::Path,
    ) -> Result<BuildRequest> {
        let missing = |message: &str| {
            let mut report = ValidationReport::default();
            report.push(&config.name, message);
            PipelineError::Resources(report)
        };
        let runtime = config
            .materials
            .runtime
            .clone()
            .ok_or_else(|| missing("No runtime is available to compile"))?;
        let compiler = config
            .materials
            .compiler
            .as_ref()
            .map(|c| c.path.clone())
            .ok_or_else(|| missing("No compiler is available"))?;
        let build_phase = config
            .build_phase
            .as_ref()
            .ok_or_else(|| missing("No build phase"))?;

        let subset = match build_phase.assemblies_subset() {
            Some(file) => Some(stage_file(file, &self.layout.resources)?),
            None => None,
        };

        Ok(BuildRequest {
            configuration: config.name.clone(),
            os: config.os,
            flags: *build_phase.flags(),
            variant: variant.to_string(),
            runtime,
            compiler,
            subset,
            resources: self.layout.resources.clone(),
            output: output.to_path_buf(),
        })
    }
}
