// Copyright 2025 AOT Benchmarker Contributors
// SPDX-License-Identifier: Apache-2.0

//! Errors raised by external tool adapters.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while driving external tools.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The program could not be started
    #[error("Failed to start {program}: {source}")]
    Spawn {
        /// Program that failed to start
        program: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The program exited unsuccessfully
    #[error("Command `{command}` exited with {}", .code.map(|c| format!("status {c}")).unwrap_or_else(|| "a signal".to_string()))]
    ExitStatus {
        /// Rendered command line
        command: String,
        /// Exit code, when the process was not killed by a signal
        code: Option<i32>,
    },

    /// The program ran longer than allowed
    #[error("Command `{command}` did not finish within {seconds}s")]
    Timeout {
        /// Rendered command line
        command: String,
        /// Limit that was exceeded
        seconds: u64,
    },

    /// Flags map to nothing the compiler can build
    #[error("Variant {0} has no recognized build target")]
    NoBuildTarget(String),

    /// A directory the build depends on is missing
    #[error("{what} directory {} was not found", .path.display())]
    MissingDirectory {
        /// What the directory holds
        what: &'static str,
        /// Expected location
        path: PathBuf,
    },

    /// A build input is not visible inside the build container
    #[error("{} is outside the container mount {}", .path.display(), .mount.display())]
    OutsideMount {
        /// Host path
        path: PathBuf,
        /// Host directory mounted into the container
        mount: PathBuf,
    },

    /// The web framework is compiled but was not supplied
    #[error("Variant {0} needs web framework assemblies, but none were provided")]
    MissingWebFramework(String),

    /// A subset entry matches no assembly
    #[error("Assembly '{entry}' listed in {} was not found in any runtime directory", .subset.display())]
    UnknownSubsetEntry {
        /// Identifier from the subset file
        entry: String,
        /// The subset file
        subset: PathBuf,
    },

    /// A composite would get no input assemblies
    #[error("No assemblies from {} belong to {}", .subset.display(), .directory.display())]
    EmptySubset {
        /// The subset file
        subset: PathBuf,
        /// Directory of the composite
        directory: PathBuf,
    },

    /// A required engine environment variable is unset
    #[error("Environment variable {0} is required")]
    MissingEnv(&'static str),

    /// An engine environment variable has an unusable value
    #[error("Environment variable {name} has invalid value '{value}'")]
    InvalidEnv {
        /// Variable name
        name: &'static str,
        /// Offending value
        value: String,
    },

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for adapter operations.
pub type Result<T> = std::result::Result<T, AdapterError>;
