// Copyright 2025 AOT Benchmarker Contributors
// SPDX-License-Identifier: Apache-2.0

//! Load-generation client invocation.

use aotbench_core::{Configuration, RunPhaseSpec};
use std::path::PathBuf;

use crate::process::CommandSpec;

/// Default load client executable.
pub const DEFAULT_PROGRAM: &str = "crank";

/// Default application framework moniker.
pub const DEFAULT_FRAMEWORK: &str = "net8.0";

/// Default prefix of the per-OS machine profile.
pub const DEFAULT_PROFILE_PREFIX: &str = "aspnet-citrine-";

/// Composes load client command lines for configurations.
#[derive(Debug, Clone)]
pub struct LoadClient {
    program: String,
    framework: String,
    profile_prefix: String,
}

impl Default for LoadClient {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM, DEFAULT_FRAMEWORK, DEFAULT_PROFILE_PREFIX)
    }
}

impl LoadClient {
    /// Create a client description.
    pub fn new(
        program: impl Into<String>,
        framework: impl Into<String>,
        profile_prefix: impl Into<String>,
    ) -> Self {
        Self {
            program: program.into(),
            framework: framework.into(),
            profile_prefix: profile_prefix.into(),
        }
    }

    /// Arguments for one run of `config` with `artifact` as the runtime
    /// directories pushed to the application.
    pub fn arguments(&self, config: &Configuration, artifact: &[PathBuf]) -> Vec<String> {
        let mut args = vec![
            "--config".to_string(),
            config.scenarios_file.clone(),
            "--scenario".to_string(),
            config.scenario.clone(),
            "--profile".to_string(),
            format!("{}{}", self.profile_prefix, config.os.code()),
            "--application.framework".to_string(),
            self.framework.clone(),
        ];

        if let Some(run) = &config.run_phase {
            args.extend(run_phase_arguments(run));
        }

        for dir in artifact {
            args.push("--application.options.outputFiles".to_string());
            args.push(format!("{}/*", dir.display()));
        }
        args
    }

    /// Full command for one run.
    pub fn command(&self, config: &Configuration, artifact: &[PathBuf]) -> CommandSpec {
        CommandSpec::new(&self.program).args(self.arguments(config, artifact))
    }
}

fn run_phase_arguments(run: &RunPhaseSpec) -> Vec<String> {
    let mut build = format!("-p:PublishReadyToRun={}", run.app_r2r);
    if run.app_avx2 {
        build.push_str(" -p:PublishReadyToRunCrossgen2ExtraArgs=--instruction-set:avx2");
    }

    vec![
        "--application.buildArguments".to_string(),
        build,
        "--application.environmentVariables".to_string(),
        format!("DOTNET_ReadyToRun={}", u8::from(run.env_ready_to_run)),
        "--application.environmentVariables".to_string(),
        format!("DOTNET_TieredCompilation={}", u8::from(run.env_tiered_compilation)),
    ]
}
