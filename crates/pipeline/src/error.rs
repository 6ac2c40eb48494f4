// Copyright 2025 AOT Benchmarker Contributors
// SPDX-License-Identifier: Apache-2.0

//! Pipeline error types.

use aotbench_adapters::AdapterError;
use aotbench_core::{CoreError, ValidationReport};
use aotbench_results::ResultsError;
use thiserror::Error;

/// Errors that stop a benchmark session.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration model error
    #[error(transparent)]
    Core(#[from] CoreError),

    /// External tool failure
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// Results could not be recorded or reported
    #[error(transparent)]
    Results(#[from] ResultsError),

    /// Materials needed for building are missing
    #[error("Insufficient resources to build the requested variants:\n{0}")]
    Resources(ValidationReport),

    /// A configuration reached the run phase without an artifact
    #[error("Configuration {0} has no planned artifact")]
    NoArtifact(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Whether the error comes from the benchmark description rather than a
    /// failure while running.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            PipelineError::Resources(_)
                | PipelineError::Core(CoreError::Invalid(_))
                | PipelineError::Adapter(
                    AdapterError::NoBuildTarget(_)
                        | AdapterError::MissingWebFramework(_)
                        | AdapterError::UnknownSubsetEntry { .. }
                        | AdapterError::EmptySubset { .. }
                        | AdapterError::OutsideMount { .. }
                )
        )
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
