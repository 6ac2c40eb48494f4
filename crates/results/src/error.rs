// Copyright 2025 AOT Benchmarker Contributors
// SPDX-License-Identifier: Apache-2.0

//! Errors raised while aggregating and rendering results.

use thiserror::Error;

/// Errors from the results pipeline.
#[derive(Debug, Error)]
pub enum ResultsError {
    /// A requested metric is absent from an iteration record
    #[error("The requested metric {metric} was not found in the results of configuration {configuration}")]
    MissingMetric {
        /// Requested metric
        metric: String,
        /// Configuration whose record lacks it
        configuration: String,
    },

    /// Metrics were requested for a configuration without iterations
    #[error("Configuration {0} has no iteration records to average")]
    NoIterations(String),

    /// A metric value is not numeric
    #[error("Metric {metric} of configuration {configuration} has a non-numeric value '{value}'")]
    InvalidValue {
        /// Metric name
        metric: String,
        /// Raw value
        value: String,
        /// Configuration name
        configuration: String,
    },

    /// The table has no headers to render
    #[error("Table has no headers")]
    MissingHeaders,

    /// The table has no side labels to render
    #[error("Table has no side labels")]
    MissingSideLabels,

    /// Headers or side labels do not match the data shape
    #[error("Table shape mismatch: {0}")]
    Shape(String),

    /// Records were added without an open configuration
    #[error("No configuration is being recorded")]
    NoOpenConfiguration,

    /// A configuration was recorded twice
    #[error("Results for configuration {0} were already stored")]
    DuplicateConfiguration(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for results operations.
pub type Result<T> = std::result::Result<T, ResultsError>;
