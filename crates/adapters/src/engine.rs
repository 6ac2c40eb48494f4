// Copyright 2025 AOT Benchmarker Contributors
// SPDX-License-Identifier: Apache-2.0

//! The build engine: compiles one variant from environment-provided
//! settings.
//!
//! The engine runs wherever the compiler runs, natively or inside a build
//! container. Its settings come from environment variables, bound through a
//! fixed `(name, parser)` table:
//!
//! | Variable              | Meaning                               | Required |
//! |-----------------------|---------------------------------------|----------|
//! | `FRAMEWORK_COMPOSITE` | framework composite (`true`/`false`)  | no       |
//! | `ASPNET_COMPOSITE`    | web framework composite               | no       |
//! | `BUNDLE_ASPNET`       | bundle web framework into framework   | no       |
//! | `USE_AVX2`            | target AVX2                           | no       |
//! | `COMPOSITES_TYPE`     | variant name                          | yes      |
//! | `PARTIAL_COMPOSITES`  | subset list file                      | no       |
//! | `TARGET_OS`           | target OS                             | yes      |
//! | `CROSSGEN2_PATH`      | compiler directory or executable      | yes      |
//! | `FRAMEWORK_PATH`      | framework assemblies                  | yes      |
//! | `ASPNET_PATH`         | web framework assemblies              | no       |
//! | `OUTPUT_PATH`         | output directory                      | yes      |
//!
//! Empty values and `0` count as unset.

use aotbench_core::{BuildFlags, TargetOs};
use std::path::PathBuf;
use tracing::info;

use crate::compiler::{compiler_executable, CompilerCommandComposer, CompilerPaths};
use crate::error::{AdapterError, Result};
use crate::materials::merge_missing_files;
use crate::process::CommandRunner;

/// Framework composite flag.
pub const FRAMEWORK_COMPOSITE: &str = "FRAMEWORK_COMPOSITE";
/// Web framework composite flag.
pub const ASPNET_COMPOSITE: &str = "ASPNET_COMPOSITE";
/// Bundle flag.
pub const BUNDLE_ASPNET: &str = "BUNDLE_ASPNET";
/// AVX2 flag.
pub const USE_AVX2: &str = "USE_AVX2";
/// Variant name.
pub const COMPOSITES_TYPE: &str = "COMPOSITES_TYPE";
/// Subset list file.
pub const PARTIAL_COMPOSITES: &str = "PARTIAL_COMPOSITES";
/// Target OS.
pub const TARGET_OS: &str = "TARGET_OS";
/// Compiler location.
pub const CROSSGEN2_PATH: &str = "CROSSGEN2_PATH";
/// Framework assemblies.
pub const FRAMEWORK_PATH: &str = "FRAMEWORK_PATH";
/// Web framework assemblies.
pub const ASPNET_PATH: &str = "ASPNET_PATH";
/// Output directory.
pub const OUTPUT_PATH: &str = "OUTPUT_PATH";

/// Settings of one engine run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineEnvironment {
    /// Build flags
    pub flags: BuildFlags,
    /// Variant name
    pub variant: String,
    /// Subset list file
    pub partial_composites: Option<PathBuf>,
    /// Target OS
    pub target_os: TargetOs,
    /// Compiler directory or executable
    pub compiler: PathBuf,
    /// Framework assemblies
    pub framework: PathBuf,
    /// Web framework assemblies
    pub aspnet: Option<PathBuf>,
    /// Output directory
    pub output: PathBuf,
}

type Setter = fn(&mut Partial, &str) -> bool;

#[derive(Default)]
struct Partial {
    flags: BuildFlags,
    variant: Option<String>,
    partial_composites: Option<PathBuf>,
    target_os: Option<TargetOs>,
    compiler: Option<PathBuf>,
    framework: Option<PathBuf>,
    aspnet: Option<PathBuf>,
    output: Option<PathBuf>,
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

const VARIABLES: &[(&str, Setter)] = &[
    (FRAMEWORK_COMPOSITE, |p, v| {
        parse_bool(v).map(|b| p.flags.framework_composite = b).is_some()
    }),
    (ASPNET_COMPOSITE, |p, v| {
        parse_bool(v).map(|b| p.flags.aspnet_composite = b).is_some()
    }),
    (BUNDLE_ASPNET, |p, v| {
        parse_bool(v).map(|b| p.flags.bundle_aspnet = b).is_some()
    }),
    (USE_AVX2, |p, v| parse_bool(v).map(|b| p.flags.use_avx2 = b).is_some()),
    (COMPOSITES_TYPE, |p, v| {
        p.variant = Some(v.to_string());
        true
    }),
    (PARTIAL_COMPOSITES, |p, v| {
        p.partial_composites = Some(PathBuf::from(v));
        true
    }),
    (TARGET_OS, |p, v| {
        p.target_os = v.parse().ok();
        p.target_os.is_some()
    }),
    (CROSSGEN2_PATH, |p, v| {
        p.compiler = Some(PathBuf::from(v));
        true
    }),
    (FRAMEWORK_PATH, |p, v| {
        p.framework = Some(PathBuf::from(v));
        true
    }),
    (ASPNET_PATH, |p, v| {
        p.aspnet = Some(PathBuf::from(v));
        true
    }),
    (OUTPUT_PATH, |p, v| {
        p.output = Some(PathBuf::from(v));
        true
    }),
];

fn required<T>(value: Option<T>, name: &'static str) -> Result<T> {
    value.ok_or(AdapterError::MissingEnv(name))
}

impl EngineEnvironment {
    /// Read the settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the settings through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut partial = Partial::default();

        for &(name, setter) in VARIABLES {
            let Some(value) = lookup(name) else {
                continue;
            };
            let value = value.trim();
            if value.is_empty() || value == "0" {
                continue;
            }
            if !setter(&mut partial, value) {
                return Err(AdapterError::InvalidEnv {
                    name,
                    value: value.to_string(),
                });
            }
        }

        Ok(Self {
            flags: partial.flags,
            variant: required(partial.variant, COMPOSITES_TYPE)?,
            partial_composites: partial.partial_composites,
            target_os: required(partial.target_os, TARGET_OS)?,
            compiler: required(partial.compiler, CROSSGEN2_PATH)?,
            framework: required(partial.framework, FRAMEWORK_PATH)?,
            aspnet: partial.aspnet,
            output: required(partial.output, OUTPUT_PATH)?,
        })
    }

    /// The settings as environment variables, in table order.
    pub fn to_vars(&self) -> Vec<(String, String)> {
        let mut vars = vec![
            (FRAMEWORK_COMPOSITE, self.flags.framework_composite.to_string()),
            (ASPNET_COMPOSITE, self.flags.aspnet_composite.to_string()),
            (BUNDLE_ASPNET, self.flags.bundle_aspnet.to_string()),
            (USE_AVX2, self.flags.use_avx2.to_string()),
            (COMPOSITES_TYPE, self.variant.clone()),
        ];
        if let Some(subset) = &self.partial_composites {
            vars.push((PARTIAL_COMPOSITES, subset.display().to_string()));
        }
        vars.push((TARGET_OS, self.target_os.to_string()));
        vars.push((CROSSGEN2_PATH, self.compiler.display().to_string()));
        vars.push((FRAMEWORK_PATH, self.framework.display().to_string()));
        if let Some(aspnet) = &self.aspnet {
            vars.push((ASPNET_PATH, aspnet.display().to_string()));
        }
        vars.push((OUTPUT_PATH, self.output.display().to_string()));

        vars.into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }

    /// Paths handed to the compiler composer.
    pub fn compiler_paths(&self) -> CompilerPaths {
        CompilerPaths {
            compiler: compiler_executable(&self.compiler),
            framework: self.framework.clone(),
            aspnet: self.aspnet.clone(),
            output: self.output.clone(),
        }
    }
}

/// Composes and runs compiler invocations, then completes the output with
/// the files the compiler did not produce.
#[derive(Debug)]
pub struct BuildEngine<R> {
    runner: R,
}

impl<R: CommandRunner> BuildEngine<R> {
    /// An engine running commands through `runner`.
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Build the variant described by `env`. Returns the number of compiler
    /// invocations.
    pub async fn process(&self, env: &EngineEnvironment) -> Result<usize> {
        let paths = env.compiler_paths();
        let commands = CompilerCommandComposer::new(env.target_os, env.flags, &env.variant, &paths)
            .with_subset(env.partial_composites.as_deref())
            .compose()?;

        std::fs::create_dir_all(&env.output)?;
        for command in &commands {
            self.runner.run(command).await?;
        }

        let mut copied = merge_missing_files(&env.framework, &env.output)?;
        if let Some(aspnet) = env.aspnet.as_deref().filter(|dir| dir.is_dir()) {
            copied += merge_missing_files(aspnet, &env.output)?;
        }
        info!(
            variant = %env.variant,
            output = %env.output.display(),
            copied,
            "Build engine finished"
        );

        Ok(commands.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::MockCommandRunner;
    use std::collections::HashMap;
    use std::fs;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_reads_table() {
        let env = EngineEnvironment::from_lookup(lookup(&[
            (FRAMEWORK_COMPOSITE, "True"),
            (USE_AVX2, "0"),
            (BUNDLE_ASPNET, ""),
            (COMPOSITES_TYPE, "framework"),
            (TARGET_OS, "linux"),
            (CROSSGEN2_PATH, "/mount/crossgen2"),
            (FRAMEWORK_PATH, "/mount/fx"),
            (OUTPUT_PATH, "/mount/lin-output-framework"),
        ]))
        .unwrap();

        assert!(env.flags.framework_composite);
        assert!(!env.flags.use_avx2);
        assert!(!env.flags.bundle_aspnet);
        assert_eq!(env.target_os, TargetOs::Linux);
        assert_eq!(env.aspnet, None);
        assert_eq!(env.partial_composites, None);
    }

    #[test]
    fn test_missing_and_invalid_values() {
        let err = EngineEnvironment::from_lookup(lookup(&[(COMPOSITES_TYPE, "framework")]))
            .unwrap_err();
        assert!(matches!(err, AdapterError::MissingEnv(TARGET_OS)));

        let err = EngineEnvironment::from_lookup(lookup(&[(USE_AVX2, "maybe")])).unwrap_err();
        assert!(matches!(err, AdapterError::InvalidEnv { name: USE_AVX2, .. }));
    }

    #[test]
    fn test_vars_round_trip() {
        let env = EngineEnvironment {
            flags: BuildFlags {
                aspnet_composite: true,
                ..Default::default()
            },
            variant: "framework-aspnet".to_string(),
            partial_composites: None,
            target_os: TargetOs::Windows,
            compiler: PathBuf::from("C:/cg2"),
            framework: PathBuf::from("C:/fx"),
            aspnet: Some(PathBuf::from("C:/asp")),
            output: PathBuf::from("C:/out"),
        };
        let vars = env.to_vars();
        let parsed = EngineEnvironment::from_lookup(|name| {
            vars.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
        })
        .unwrap();
        assert_eq!(parsed, env);
    }

    #[tokio::test]
    async fn test_process_runs_and_merges() {
        let root = tempfile::tempdir().unwrap();
        let fx = root.path().join("fx");
        fs::create_dir_all(&fx).unwrap();
        fs::write(fx.join("System.Runtime.dll"), b"il").unwrap();
        fs::write(fx.join("libclrjit.so"), b"native").unwrap();

        let env = EngineEnvironment {
            flags: BuildFlags {
                framework_composite: true,
                ..Default::default()
            },
            variant: "framework".to_string(),
            partial_composites: None,
            target_os: TargetOs::Linux,
            compiler: root.path().join("cg2"),
            framework: fx,
            aspnet: None,
            output: root.path().join("out"),
        };

        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|command| command.args.contains(&"--composite".to_string()))
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let invocations = BuildEngine::new(runner).process(&env).await.unwrap();
        assert_eq!(invocations, 1);
        assert!(env.output.join("libclrjit.so").is_file());
        assert!(env.output.join("System.Runtime.dll").is_file());
    }

    #[tokio::test]
    async fn test_process_partial_subset() {
        let root = tempfile::tempdir().unwrap();
        let fx = root.path().join("fx");
        fs::create_dir_all(&fx).unwrap();
        for name in ["System.Private.CoreLib.dll", "System.Runtime.dll", "System.Linq.dll"] {
            fs::write(fx.join(name), b"il").unwrap();
        }
        let subset = root.path().join("web.txt");
        fs::write(&subset, "System.Private.CoreLib\nSystem.Runtime\n").unwrap();

        let env = EngineEnvironment {
            flags: BuildFlags {
                framework_composite: true,
                ..Default::default()
            },
            variant: "framework-web-partial".to_string(),
            partial_composites: Some(subset),
            target_os: TargetOs::Linux,
            compiler: root.path().join("cg2"),
            framework: fx.clone(),
            aspnet: None,
            output: root.path().join("out"),
        };

        let expected_inputs = vec![
            fx.join("System.Private.CoreLib.dll").display().to_string(),
            fx.join("System.Runtime.dll").display().to_string(),
        ];
        let expected_reference = format!("--reference={}", fx.join("*.dll").display());
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(move |command| {
                let inputs: Vec<_> = command
                    .args
                    .iter()
                    .filter(|a| !a.starts_with("--"))
                    .cloned()
                    .collect();
                let references: Vec<_> = command
                    .args
                    .iter()
                    .filter(|a| a.starts_with("--reference="))
                    .collect();
                inputs == expected_inputs && references == vec![&expected_reference]
            })
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let invocations = BuildEngine::new(runner).process(&env).await.unwrap();
        assert_eq!(invocations, 1);
        assert!(env.output.join("System.Linq.dll").is_file());
    }
}
