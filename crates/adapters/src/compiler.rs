// Copyright 2025 AOT Benchmarker Contributors
// SPDX-License-Identifier: Apache-2.0

//! Composition of ahead-of-time compiler invocations.
//!
//! Every invocation starts with the same preamble:
//!
//! ```text
//! crossgen2 --targetos=<os> --targetarch=x64 [--instruction-set=avx2] [--mibc=<dir>/StandardOptimizationData.mibc]
//! ```
//!
//! Composite builds then add `--composite`, their inputs (a `<dir>/*.dll`
//! glob, or the explicit paths listed in a subset file together with a
//! `--reference=<dir>/*.dll` back to the same directory) and
//! `--out=<output>/<variant>.r2r.dll`. A separate web framework composite
//! gets its own invocation referencing the framework directory.
//!
//! AVX2-only builds are not composite: each assembly is compiled on its own
//! into `<output>/<assembly file name>`.

use aotbench_core::{BuildFlags, TargetOs};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{AdapterError, Result};
use crate::materials::{assembly_file_name, list_assemblies, read_subset_entries};
use crate::process::CommandSpec;

/// Optimization profile picked up from the compiler directory when present.
pub const MIBC_FILE: &str = "StandardOptimizationData.mibc";

/// Extension of composite images.
pub const COMPOSITE_EXTENSION: &str = "r2r.dll";

/// Suffix of the web framework image when it is compiled separately.
pub const WEB_FRAMEWORK_IMAGE_SUFFIX: &str = "aspnetcore";

/// Value of `--targetos` for an OS.
pub fn compiler_target_os(os: TargetOs) -> &'static str {
    match os {
        TargetOs::Windows => "windows",
        TargetOs::Linux => "linux",
        TargetOs::Macos => "osx",
    }
}

/// The compiler executable inside a compiler directory. A path to a file is
/// taken as the executable itself.
pub fn compiler_executable(compiler: &Path) -> PathBuf {
    if compiler.is_file() {
        return compiler.to_path_buf();
    }
    let name = if cfg!(windows) { "crossgen2.exe" } else { "crossgen2" };
    compiler.join(name)
}

/// Locations an invocation reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerPaths {
    /// Compiler executable
    pub compiler: PathBuf,
    /// Framework assemblies
    pub framework: PathBuf,
    /// Web framework assemblies, when shipped separately
    pub aspnet: Option<PathBuf>,
    /// Output directory
    pub output: PathBuf,
}

/// Turns build flags into compiler invocations.
#[derive(Debug, Clone)]
pub struct CompilerCommandComposer<'a> {
    os: TargetOs,
    flags: BuildFlags,
    variant: &'a str,
    paths: &'a CompilerPaths,
    subset: Option<&'a Path>,
}

/// Subset entries resolved against the runtime directories.
struct SubsetSelection<'a> {
    file: &'a Path,
    entries: Vec<PathBuf>,
}

impl SubsetSelection<'_> {
    fn entries_in(&self, dir: &Path) -> Vec<String> {
        self.entries
            .iter()
            .filter(|entry| entry.parent() == Some(dir))
            .map(|entry| entry.display().to_string())
            .collect()
    }

    fn inputs_in(&self, dir: &Path) -> Result<Vec<String>> {
        let inputs = self.entries_in(dir);
        if inputs.is_empty() {
            return Err(AdapterError::EmptySubset {
                subset: self.file.to_path_buf(),
                directory: dir.to_path_buf(),
            });
        }
        Ok(inputs)
    }
}

fn glob(dir: &Path) -> String {
    dir.join("*.dll").display().to_string()
}

fn reference(dir: &Path) -> String {
    format!("--reference={}", glob(dir))
}

impl<'a> CompilerCommandComposer<'a> {
    /// Composer for one variant.
    pub fn new(os: TargetOs, flags: BuildFlags, variant: &'a str, paths: &'a CompilerPaths) -> Self {
        Self {
            os,
            flags,
            variant,
            paths,
            subset: None,
        }
    }

    /// Restrict composites to the assemblies listed in `subset`.
    pub fn with_subset(mut self, subset: Option<&'a Path>) -> Self {
        self.subset = subset;
        self
    }

    /// All invocations for the variant, in execution order.
    ///
    /// Fails before anything runs when the flags map to no build target or
    /// an input is missing.
    pub fn compose(&self) -> Result<Vec<CommandSpec>> {
        if !self.flags.needs_recompilation() {
            return Err(AdapterError::NoBuildTarget(self.variant.to_string()));
        }
        if !self.paths.framework.is_dir() {
            return Err(AdapterError::MissingDirectory {
                what: "Framework",
                path: self.paths.framework.clone(),
            });
        }

        let commands = if self.flags.is_composite() {
            self.composite()?
        } else {
            self.non_composite()?
        };
        info!(
            variant = self.variant,
            invocations = commands.len(),
            "Composed compiler invocations"
        );
        Ok(commands)
    }

    fn preamble(&self) -> CommandSpec {
        let mut command = CommandSpec::new(self.paths.compiler.display().to_string())
            .arg(format!("--targetos={}", compiler_target_os(self.os)))
            .arg("--targetarch=x64");

        if self.flags.use_avx2 {
            command = command.arg("--instruction-set=avx2");
        }

        let mibc = self
            .paths
            .compiler
            .parent()
            .map(|dir| dir.join(MIBC_FILE))
            .filter(|path| path.is_file());
        if let Some(mibc) = mibc {
            command = command.arg(format!("--mibc={}", mibc.display()));
        }
        command
    }

    fn web_framework(&self) -> Result<&'a Path> {
        let aspnet = self
            .paths
            .aspnet
            .as_deref()
            .ok_or_else(|| AdapterError::MissingWebFramework(self.variant.to_string()))?;
        if !aspnet.is_dir() {
            return Err(AdapterError::MissingDirectory {
                what: "Web framework",
                path: aspnet.to_path_buf(),
            });
        }
        Ok(aspnet)
    }

    fn resolve_subset(&self) -> Result<Option<SubsetSelection<'a>>> {
        let Some(file) = self.subset else {
            return Ok(None);
        };

        let mut dirs = vec![self.paths.framework.as_path()];
        if let Some(aspnet) = self.paths.aspnet.as_deref() {
            dirs.push(aspnet);
        }

        let mut entries = Vec::new();
        for entry in read_subset_entries(file)? {
            let name = assembly_file_name(&entry);
            let found = dirs
                .iter()
                .flat_map(|dir| [dir.join(&name), dir.join(&entry)])
                .find(|candidate| candidate.is_file())
                .ok_or_else(|| AdapterError::UnknownSubsetEntry {
                    entry: entry.clone(),
                    subset: file.to_path_buf(),
                })?;
            entries.push(found);
        }
        debug!(subset = %file.display(), entries = entries.len(), "Resolved subset");

        Ok(Some(SubsetSelection { file, entries }))
    }

    /// Inputs for one directory plus, for subsets, the back reference.
    fn inputs(&self, dir: &Path, subset: Option<&SubsetSelection<'_>>) -> Result<Vec<String>> {
        match subset {
            Some(selection) => {
                let mut args = selection.inputs_in(dir)?;
                args.push(reference(dir));
                Ok(args)
            }
            None => Ok(vec![glob(dir)]),
        }
    }

    fn image(&self, suffix: Option<&str>) -> String {
        let name = match suffix {
            Some(suffix) => format!("{}-{}.{}", self.variant, suffix, COMPOSITE_EXTENSION),
            None => format!("{}.{}", self.variant, COMPOSITE_EXTENSION),
        };
        format!("--out={}", self.paths.output.join(name).display())
    }

    fn composite(&self) -> Result<Vec<CommandSpec>> {
        let subset = self.resolve_subset()?;
        let framework = self.paths.framework.as_path();
        let mut commands = Vec::new();

        if self.flags.framework_composite {
            let mut args = self.inputs(framework, subset.as_ref())?;
            if self.flags.bundle_aspnet {
                let aspnet = self.web_framework()?;
                match subset.as_ref() {
                    // A subset may leave the bundled web framework out.
                    Some(selection) => {
                        args.extend(selection.entries_in(aspnet));
                        args.push(reference(aspnet));
                    }
                    None => args.push(glob(aspnet)),
                }
            }
            commands.push(
                self.preamble()
                    .arg("--composite")
                    .args(args)
                    .arg(self.image(None)),
            );
        }

        if self.flags.aspnet_composite && !self.flags.bundle_aspnet {
            let aspnet = self.web_framework()?;
            let args = self.inputs(aspnet, subset.as_ref())?;
            let suffix = self
                .flags
                .framework_composite
                .then_some(WEB_FRAMEWORK_IMAGE_SUFFIX);
            commands.push(
                self.preamble()
                    .arg("--composite")
                    .args(args)
                    .arg(reference(framework))
                    .arg(self.image(suffix)),
            );
        }

        Ok(commands)
    }

    fn non_composite(&self) -> Result<Vec<CommandSpec>> {
        let framework = self.paths.framework.as_path();
        let mut groups = vec![(framework, vec![framework])];
        if let Some(aspnet) = self.paths.aspnet.as_deref().filter(|dir| dir.is_dir()) {
            groups.push((aspnet, vec![framework, aspnet]));
        }

        let mut commands = Vec::new();
        for (dir, references) in groups {
            for assembly in list_assemblies(dir)? {
                let Some(file_name) = assembly.file_name() else {
                    continue;
                };
                let mut command = self.preamble();
                for reference_dir in &references {
                    command = command.arg(reference(reference_dir));
                }
                command = command.arg(assembly.display().to_string()).arg(format!(
                    "--out={}",
                    self.paths.output.join(file_name).display()
                ));
                commands.push(command);
            }
        }
        Ok(commands)
    }
}
