// Copyright 2025 AOT Benchmarker Contributors
// SPDX-License-Identifier: Apache-2.0

//! Declarative benchmark description (YAML) and its resolution into
//! validated [`Configuration`]s.
//!
//! # Example
//!
//! ```yaml
//! assemblies:
//!   linux:
//!     runtimes:
//!       - name: net8
//!         framework: runtimes/net8/Microsoft.NETCore.App
//!         aspnet: runtimes/net8/Microsoft.AspNetCore.App
//!     crossgen2s:
//!       - name: cg2
//!         path: tools/crossgen2
//! configurations:
//!   - name: cfg-fx
//!     os: linux
//!     buildPhase:
//!       params: [frameworkComposite]
//!     runPhase:
//!       params: [appR2R]
//! ```
//!
//! Relative paths are resolved against the directory holding the file.

use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::build_phase::{BuildFlag, BuildFlags, BuildPhaseSpec};
use crate::configuration::{
    Configuration, Materials, NamedPath, RuntimeMaterials, DEFAULT_SCENARIO, DEFAULT_SCENARIOS_FILE,
};
use crate::error::{CoreError, Result};
use crate::os::TargetOs;
use crate::run_phase::RunPhaseSpec;
use crate::validation::ValidationReport;

/// Group name used for errors in the `assemblies` section.
pub const ASSEMBLIES_GROUP: &str = "Assemblies";

/// Materials declared for one target OS.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssembliesCollection {
    /// Runtime assembly sets
    #[serde(default)]
    pub runtimes: Vec<RuntimeMaterials>,
    /// Compiler builds
    #[serde(default)]
    pub crossgen2s: Vec<NamedPath>,
    /// Ready to use, already processed assembly sets
    #[serde(default)]
    pub processed: Vec<NamedPath>,
}

/// Names of the materials a configuration wants.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialLinks {
    /// Processed assemblies to use instead of building
    #[serde(default)]
    pub processed: Option<String>,
    /// Runtime assemblies; defaults to the first declared for the OS
    #[serde(default)]
    pub runtime: Option<String>,
    /// Compiler build; defaults to the first declared for the OS
    #[serde(default)]
    pub crossgen2: Option<String>,
}

/// A build or run phase as written in the description.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseEntry {
    /// Flag names
    #[serde(default)]
    pub params: Vec<String>,
    /// Partial-subset list file (build phase only)
    #[serde(default)]
    pub assemblies_subset: Option<PathBuf>,
}

/// A configuration as written in the description.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationEntry {
    /// Configuration name
    pub name: String,
    /// Target OS name
    pub os: String,
    /// Scenarios file for the load client
    #[serde(default = "default_scenarios_file")]
    pub scenarios_file: String,
    /// Scenario within the scenarios file
    #[serde(default = "default_scenario")]
    pub scenario: String,
    /// Material links
    #[serde(default)]
    pub assemblies_to_use: MaterialLinks,
    /// Build phase
    #[serde(default)]
    pub build_phase: Option<PhaseEntry>,
    /// Run phase
    #[serde(default)]
    pub run_phase: Option<PhaseEntry>,
}

fn default_scenarios_file() -> String {
    DEFAULT_SCENARIOS_FILE.to_string()
}

fn default_scenario() -> String {
    DEFAULT_SCENARIO.to_string()
}

/// The whole benchmark description.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkDescription {
    /// Materials keyed by OS name
    #[serde(default)]
    pub assemblies: BTreeMap<String, AssembliesCollection>,
    /// Configurations, in execution order
    #[serde(default)]
    pub configurations: Vec<ConfigurationEntry>,
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl BenchmarkDescription {
    /// Parse a description from YAML text. Relative paths stay relative to
    /// the current directory.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a description from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| CoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut description = Self::from_yaml_str(&yaml)?;
        description.base_dir = path.parent().map(Path::to_path_buf);
        Ok(description)
    }

    /// Resolve every configuration, collecting all configuration errors.
    ///
    /// Returns [`CoreError::Invalid`] with the grouped report when anything
    /// is wrong; no configuration is returned in that case.
    pub fn resolve(&self) -> Result<Vec<Configuration>> {
        let mut report = ValidationReport::new();
        let mut collections: BTreeMap<TargetOs, &AssembliesCollection> = BTreeMap::new();

        for (os_name, collection) in &self.assemblies {
            match os_name.parse::<TargetOs>() {
                Ok(os) => {
                    collections.insert(os, collection);
                }
                Err(err) => report.push(ASSEMBLIES_GROUP, err.to_string()),
            }
        }

        let mut seen = HashSet::new();
        let mut configurations = Vec::with_capacity(self.configurations.len());

        for entry in &self.configurations {
            let group = entry.name.as_str();
            if !seen.insert(group) {
                report.push(group, "Configuration name is declared more than once.");
            }
            if let Some(configuration) = self.resolve_entry(entry, &collections, &mut report) {
                configurations.push(configuration);
            }
        }

        if report.is_empty() {
            Ok(configurations)
        } else {
            Err(CoreError::Invalid(report))
        }
    }

    fn resolve_entry(
        &self,
        entry: &ConfigurationEntry,
        collections: &BTreeMap<TargetOs, &AssembliesCollection>,
        report: &mut ValidationReport,
    ) -> Option<Configuration> {
        let group = entry.name.as_str();
        let errors_before = report.total();

        let os = match entry.os.parse::<TargetOs>() {
            Ok(os) => Some(os),
            Err(err) => {
                report.push(group, err.to_string());
                None
            }
        };

        let build_phase = entry
            .build_phase
            .as_ref()
            .map(|phase| self.resolve_build_phase(group, phase, report));

        let run_phase = entry.run_phase.as_ref().map(|phase| {
            RunPhaseSpec::from_names(&phase.params).unwrap_or_else(|unknown| {
                for name in unknown {
                    report.push(group, format!("RunPhase: Unknown parameter '{name}'."));
                }
                RunPhaseSpec::default()
            })
        });

        let os = os?;
        let empty = AssembliesCollection::default();
        let collection = collections.get(&os).copied().unwrap_or(&empty);
        let links = &entry.assemblies_to_use;

        let processed = self.find_named(
            group,
            "Processed",
            links.processed.as_deref(),
            &collection.processed,
            false,
            report,
        );
        let runtime = match links.runtime.as_deref() {
            Some(name) => match collection.runtimes.iter().find(|r| r.name == name) {
                Some(runtime) => Some(self.absolute_runtime(runtime)),
                None => {
                    report.push(group, missing_link_message("Runtime", name));
                    None
                }
            },
            None => collection.runtimes.first().map(|r| self.absolute_runtime(r)),
        };
        let compiler = self.find_named(
            group,
            "Crossgen2",
            links.crossgen2.as_deref(),
            &collection.crossgen2s,
            true,
            report,
        );

        let needs_build = processed.is_none()
            && build_phase
                .as_ref()
                .map(BuildPhaseSpec::needs_recompilation)
                .unwrap_or(false);

        if processed.is_some() && build_phase.is_some() {
            info!(
                configuration = group,
                "Build phase and processed assemblies both specified; using the assemblies and skipping the build phase"
            );
        }

        // A dangling link has already been reported.
        if processed.is_none() && runtime.is_none() && links.runtime.is_none() {
            report.push(
                group,
                format!("OS {os} requires runtime assemblies, but none were provided."),
            );
        }
        if needs_build && compiler.is_none() && links.crossgen2.is_none() {
            report.push(
                group,
                format!("OS {os} requires building materials, but no Crossgen2 build was provided."),
            );
        }

        if run_phase.is_none() {
            info!(
                configuration = group,
                "No run phase; the load client's default parameters will be used"
            );
        }

        if report.total() > errors_before {
            return None;
        }

        let mut configuration = Configuration::new(entry.name.clone(), os).with_materials(Materials {
            runtime,
            compiler,
            processed,
        });
        configuration.scenarios_file = entry.scenarios_file.clone();
        configuration.scenario = entry.scenario.clone();
        configuration.build_phase = build_phase;
        configuration.run_phase = run_phase;
        Some(configuration)
    }

    fn resolve_build_phase(
        &self,
        group: &str,
        phase: &PhaseEntry,
        report: &mut ValidationReport,
    ) -> BuildPhaseSpec {
        let mut flags = BuildFlags::default();
        for name in &phase.params {
            match BuildFlag::lookup(name) {
                Some(flag) => flags.set(flag),
                None => report.push(group, format!("BuildPhase: Unknown parameter '{name}'.")),
            }
        }
        report.extend(group, flags.conflicts());

        let subset = phase.assemblies_subset.as_ref().map(|p| self.absolute(p));
        if let Some(subset) = &subset {
            if !flags.is_composite() {
                report.push(
                    group,
                    "BuildPhase: 'AssembliesSubset' can only be used with a composite build.",
                );
            }
            if !subset.is_file() {
                report.push(
                    group,
                    format!(
                        "BuildPhase: Assemblies subset file {} was not found.",
                        subset.display()
                    ),
                );
            }
        }

        BuildPhaseSpec::new(flags, subset)
    }

    fn find_named(
        &self,
        group: &str,
        kind: &str,
        link: Option<&str>,
        provided: &[NamedPath],
        default_to_first: bool,
        report: &mut ValidationReport,
    ) -> Option<NamedPath> {
        let found = match link {
            Some(name) => {
                let found = provided.iter().find(|p| p.name == name);
                if found.is_none() {
                    report.push(group, missing_link_message(kind, name));
                }
                found
            }
            None if default_to_first => provided.first(),
            None => None,
        };
        found.map(|p| NamedPath {
            name: p.name.clone(),
            path: self.absolute(&p.path),
        })
    }

    fn absolute_runtime(&self, runtime: &RuntimeMaterials) -> RuntimeMaterials {
        RuntimeMaterials {
            name: runtime.name.clone(),
            framework: self.absolute(&runtime.framework),
            aspnet: runtime.aspnet.as_ref().map(|p| self.absolute(p)),
        }
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

fn missing_link_message(kind: &str, name: &str) -> String {
    format!(
        "AssembliesToUse: The config references the {kind} Assemblies '{name}', \
         but they were not found in the 'Assemblies' section."
    )
}
