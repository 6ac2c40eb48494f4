// Copyright 2025 AOT Benchmarker Contributors
// SPDX-License-Identifier: Apache-2.0

//! Resolved benchmark configurations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::build_phase::{BuildPhaseSpec, VANILLA};
use crate::error::{CoreError, Result};
use crate::os::TargetOs;
use crate::run_phase::RunPhaseSpec;

/// Default scenarios file handed to the load client.
pub const DEFAULT_SCENARIOS_FILE: &str =
    "https://raw.githubusercontent.com/aspnet/Benchmarks/main/scenarios/plaintext.benchmarks.yml";

/// Default scenario name.
pub const DEFAULT_SCENARIO: &str = "plaintext";

/// Runtime assemblies supplied for a target OS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeMaterials {
    /// Name used to reference these materials
    pub name: String,
    /// Directory with the framework assemblies
    pub framework: PathBuf,
    /// Directory with the web framework assemblies, when shipped separately
    #[serde(default)]
    pub aspnet: Option<PathBuf>,
}

impl RuntimeMaterials {
    /// All assembly directories, framework first.
    pub fn directories(&self) -> Vec<PathBuf> {
        let mut dirs = vec![self.framework.clone()];
        if let Some(aspnet) = &self.aspnet {
            dirs.push(aspnet.clone());
        }
        dirs
    }
}

/// A named directory of materials (compiler build or ready assemblies).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedPath {
    /// Name used to reference this directory
    pub name: String,
    /// Location on disk
    pub path: PathBuf,
}

/// Materials a configuration was resolved against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Materials {
    /// Runtime assemblies to benchmark or recompile
    pub runtime: Option<RuntimeMaterials>,
    /// Compiler build used to recompile the runtime
    pub compiler: Option<NamedPath>,
    /// Already processed assemblies that replace the build phase
    pub processed: Option<NamedPath>,
}

/// Where the assemblies a configuration runs with live.
///
/// A vanilla configuration may span more than one directory (framework and
/// web framework shipped separately); a built variant is a single directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactLocation {
    directories: Vec<PathBuf>,
    built: bool,
}

impl ArtifactLocation {
    /// A directory produced by a build.
    pub fn built(directory: impl Into<PathBuf>) -> Self {
        Self {
            directories: vec![directory.into()],
            built: true,
        }
    }

    /// Directories used as provided.
    pub fn provided(directories: Vec<PathBuf>) -> Self {
        Self {
            directories,
            built: false,
        }
    }

    /// All directories making up the artifact.
    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    /// Whether the artifact came out of a build.
    pub fn is_built(&self) -> bool {
        self.built
    }

    /// The first directory.
    pub fn primary(&self) -> Option<&Path> {
        self.directories.first().map(PathBuf::as_path)
    }
}

/// One named benchmark unit.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    /// Configuration name, unique within a description
    pub name: String,
    /// Target OS
    pub os: TargetOs,
    /// Scenarios file handed to the load client
    pub scenarios_file: String,
    /// Scenario name within the scenarios file
    pub scenario: String,
    /// Materials resolved from the description's assemblies section
    pub materials: Materials,
    /// Optional build phase
    pub build_phase: Option<BuildPhaseSpec>,
    /// Optional run phase
    pub run_phase: Option<RunPhaseSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    artifact: Option<ArtifactLocation>,
}

impl Configuration {
    /// Create a configuration with the default scenario and no phases.
    pub fn new(name: impl Into<String>, os: TargetOs) -> Self {
        Self {
            name: name.into(),
            os,
            scenarios_file: DEFAULT_SCENARIOS_FILE.to_string(),
            scenario: DEFAULT_SCENARIO.to_string(),
            materials: Materials::default(),
            build_phase: None,
            run_phase: None,
            artifact: None,
        }
    }

    /// Set the build phase.
    pub fn with_build_phase(mut self, build_phase: BuildPhaseSpec) -> Self {
        self.build_phase = Some(build_phase);
        self
    }

    /// Set the run phase.
    pub fn with_run_phase(mut self, run_phase: RunPhaseSpec) -> Self {
        self.run_phase = Some(run_phase);
        self
    }

    /// Set the materials.
    pub fn with_materials(mut self, materials: Materials) -> Self {
        self.materials = materials;
        self
    }

    /// Variant name of this configuration's artifact.
    ///
    /// Configurations with processed assemblies or without a recompiling
    /// build phase are `vanilla`.
    pub fn variant_name(&self) -> &str {
        if self.materials.processed.is_some() {
            return VANILLA;
        }
        self.build_phase
            .as_ref()
            .map(BuildPhaseSpec::variant_name)
            .unwrap_or(VANILLA)
    }

    /// Whether running this configuration requires compiling anything.
    pub fn needs_build(&self) -> bool {
        self.variant_name() != VANILLA
    }

    /// The resolved artifact, once planned.
    pub fn artifact(&self) -> Option<&ArtifactLocation> {
        self.artifact.as_ref()
    }

    /// Record the artifact. Fails if it was already recorded.
    pub fn set_artifact(&mut self, artifact: ArtifactLocation) -> Result<()> {
        if self.artifact.is_some() {
            return Err(CoreError::ArtifactAlreadySet(self.name.clone()));
        }
        self.artifact = Some(artifact);
        Ok(())
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Configuration {}", self.name)?;
        writeln!(f, "  Target OS: {}", self.os)?;
        writeln!(f, "  Scenarios File: {}", self.scenarios_file)?;
        writeln!(f, "  Scenario: {}", self.scenario)?;
        writeln!(f, "  Variant: {}", self.variant_name())?;
        match &self.build_phase {
            Some(build) => writeln!(f, "{build}")?,
            None => writeln!(f, "No build phase.")?,
        }
        match &self.run_phase {
            Some(run) => write!(f, "{run}"),
            None => write!(f, "No run phase."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_phase::BuildFlags;

    fn fx_composite() -> BuildPhaseSpec {
        BuildPhaseSpec::new(
            BuildFlags {
                framework_composite: true,
                ..Default::default()
            },
            None,
        )
    }

    #[test]
    fn test_variant_without_build_phase() {
        let config = Configuration::new("cfg", TargetOs::Linux);
        assert_eq!(config.variant_name(), VANILLA);
        assert!(!config.needs_build());
    }

    #[test]
    fn test_processed_assemblies_skip_build() {
        let config = Configuration::new("cfg", TargetOs::Linux)
            .with_build_phase(fx_composite())
            .with_materials(Materials {
                processed: Some(NamedPath {
                    name: "ready".to_string(),
                    path: PathBuf::from("/ready"),
                }),
                ..Default::default()
            });
        assert!(!config.needs_build());
    }

    #[test]
    fn test_artifact_is_set_once() {
        let mut config = Configuration::new("cfg", TargetOs::Linux).with_build_phase(fx_composite());
        assert!(config.needs_build());
        config
            .set_artifact(ArtifactLocation::built("/res/lin-output-framework"))
            .unwrap();
        let err = config
            .set_artifact(ArtifactLocation::built("/elsewhere"))
            .unwrap_err();
        assert!(matches!(err, CoreError::ArtifactAlreadySet(name) if name == "cfg"));
        assert_eq!(
            config.artifact().unwrap().primary(),
            Some(Path::new("/res/lin-output-framework"))
        );
    }
}
