// Copyright 2025 AOT Benchmarker Contributors
// SPDX-License-Identifier: Apache-2.0

//! Errors raised while loading and resolving benchmark descriptions.

use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ValidationReport;

/// Errors that can occur in the configuration layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The description file could not be read
    #[error("Failed to read benchmark description {path}: {source}")]
    Read {
        /// Path that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The description file is not valid YAML for our schema
    #[error("Invalid benchmark description: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Unrecognized target OS
    #[error("The OS {0} is not currently supported")]
    UnsupportedOs(String),

    /// A configuration's artifact was resolved twice
    #[error("Artifact for configuration {0} has already been resolved")]
    ArtifactAlreadySet(String),

    /// One or more configurations failed validation
    #[error("{} configuration error(s) found", .0.total())]
    Invalid(ValidationReport),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, CoreError>;
