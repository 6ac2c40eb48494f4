// Copyright 2025 AOT Benchmarker Contributors
// SPDX-License-Identifier: Apache-2.0

//! Run phase flags: how the benchmarked application is built by the load
//! client, and which runtime environment toggles are set.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One recognized run flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunFlag {
    /// Publish the application ReadyToRun
    AppR2R,
    /// Compile the application ReadyToRun code for AVX2
    AppAvx2,
    /// Set `DOTNET_ReadyToRun=1`
    EnvReadyToRun,
    /// Set `DOTNET_TieredCompilation=1`
    EnvTieredCompilation,
}

const RUN_FLAG_NAMES: &[(&str, RunFlag)] = &[
    ("appr2r", RunFlag::AppR2R),
    ("appavx2", RunFlag::AppAvx2),
    ("envreadytorun", RunFlag::EnvReadyToRun),
    ("envtieredcompilation", RunFlag::EnvTieredCompilation),
];

impl RunFlag {
    /// Look up a flag by its case-insensitive name.
    pub fn lookup(name: &str) -> Option<Self> {
        let key = name.trim().to_lowercase();
        RUN_FLAG_NAMES
            .iter()
            .find(|(flag_name, _)| *flag_name == key)
            .map(|(_, flag)| *flag)
    }
}

/// Run phase of a configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunPhaseSpec {
    /// Application published ReadyToRun
    pub app_r2r: bool,
    /// Application ReadyToRun code targets AVX2
    pub app_avx2: bool,
    /// Runtime ReadyToRun enabled
    pub env_ready_to_run: bool,
    /// Runtime tiered compilation enabled
    pub env_tiered_compilation: bool,
}

impl RunPhaseSpec {
    /// Build the run phase from a list of flag names, returning unknown
    /// names as the error value.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> std::result::Result<Self, Vec<String>> {
        let mut spec = Self::default();
        let mut unknown = Vec::new();

        for name in names {
            match RunFlag::lookup(name.as_ref()) {
                Some(RunFlag::AppR2R) => spec.app_r2r = true,
                Some(RunFlag::AppAvx2) => spec.app_avx2 = true,
                Some(RunFlag::EnvReadyToRun) => spec.env_ready_to_run = true,
                Some(RunFlag::EnvTieredCompilation) => spec.env_tiered_compilation = true,
                None => unknown.push(name.as_ref().to_string()),
            }
        }

        if unknown.is_empty() {
            Ok(spec)
        } else {
            Err(unknown)
        }
    }
}

impl fmt::Display for RunPhaseSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run Phase Parameters:")?;
        writeln!(f, "  App Built with R2R: {}", self.app_r2r)?;
        writeln!(f, "  App Built with AVX2: {}", self.app_avx2)?;
        writeln!(f, "  Set DOTNET_ReadyToRun: {}", self.env_ready_to_run)?;
        write!(f, "  Set DOTNET_TieredCompilation: {}", self.env_tiered_compilation)
    }
}
