// Copyright 2025 AOT Benchmarker Contributors
// SPDX-License-Identifier: Apache-2.0

//! Application settings.
//!
//! Sources, lowest priority first: built-in defaults, `aotbench.toml` in the
//! working directory (or the file given with `--settings`), then
//! `AOTBENCH__*` environment variables. A `.env` file is loaded into the
//! environment beforehand.

use aotbench_adapters::load_client::{DEFAULT_FRAMEWORK, DEFAULT_PROFILE_PREFIX, DEFAULT_PROGRAM};
use aotbench_core::layout::timestamp;
use aotbench_core::Layout;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Stem of the optional settings file.
pub const SETTINGS_FILE: &str = "aotbench";

/// Prefix of settings environment variables.
pub const ENV_PREFIX: &str = "AOTBENCH";

/// Resolved application settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root under which resources, logs and results live by default
    pub base_dir: PathBuf,
    /// Shared build mount, `<base_dir>/resources` when unset
    pub resources_dir: Option<PathBuf>,
    /// Run logs, `<base_dir>/logs` when unset
    pub logs_dir: Option<PathBuf>,
    /// Results files, `<base_dir>/results` when unset
    pub results_dir: Option<PathBuf>,
    /// Container tool executable
    pub docker: String,
    /// Load client executable
    pub crank: String,
    /// Application target framework moniker
    pub app_framework: String,
    /// Machine profile prefix, completed with the OS code
    pub profile_prefix: String,
    /// Iterations per configuration when not given on the command line
    pub iterations: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            resources_dir: None,
            logs_dir: None,
            results_dir: None,
            docker: "docker".to_string(),
            crank: DEFAULT_PROGRAM.to_string(),
            app_framework: DEFAULT_FRAMEWORK.to_string(),
            profile_prefix: DEFAULT_PROFILE_PREFIX.to_string(),
            iterations: 1,
        }
    }
}

impl Settings {
    /// Load settings from the standard sources.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load_from(
            file,
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
    }

    fn load_from(file: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let builder = match file {
            Some(path) => Config::builder().add_source(File::from(path).required(true)),
            None => Config::builder().add_source(File::with_name(SETTINGS_FILE).required(false)),
        };
        builder.add_source(env).build()?.try_deserialize()
    }

    /// Session layout with a fresh timestamp.
    pub fn layout(&self) -> Layout {
        let pick = |dir: &Option<PathBuf>, default: &str| {
            dir.clone().unwrap_or_else(|| self.base_dir.join(default))
        };
        Layout::new(
            pick(&self.resources_dir, "resources"),
            pick(&self.logs_dir, "logs"),
            pick(&self.results_dir, "results"),
            timestamp(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn no_env() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .source(Some(config::Map::new()))
    }

    #[test]
    fn test_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("aotbench.toml");
        fs::write(&file, "").unwrap();

        let settings = Settings::load_from(Some(&file), no_env()).unwrap();
        assert_eq!(settings, Settings::default());

        let layout = settings.layout();
        assert_eq!(layout.resources, PathBuf::from("./resources"));
        assert_eq!(layout.results, PathBuf::from("./results"));
    }

    #[test]
    fn test_file_then_environment() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("aotbench.toml");
        fs::write(
            &file,
            "base_dir = \"/work\"\ndocker = \"podman\"\niterations = 5\n",
        )
        .unwrap();

        let mut vars = config::Map::new();
        vars.insert("AOTBENCH__ITERATIONS".to_string(), "3".to_string());
        vars.insert("AOTBENCH__LOGS_DIR".to_string(), "/var/log/aotbench".to_string());
        let env = Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
            .source(Some(vars));

        let settings = Settings::load_from(Some(&file), env).unwrap();
        assert_eq!(settings.docker, "podman");
        assert_eq!(settings.iterations, 3);

        let layout = settings.layout();
        assert_eq!(layout.resources, PathBuf::from("/work/resources"));
        assert_eq!(layout.logs, PathBuf::from("/var/log/aotbench"));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("absent.toml");
        assert!(Settings::load_from(Some(&file), no_env()).is_err());
    }
}
