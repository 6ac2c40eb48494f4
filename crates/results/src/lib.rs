// Copyright 2025 AOT Benchmarker Contributors
// SPDX-License-Identifier: Apache-2.0

//! Results pipeline of the AOT benchmarker.
//!
//! Load client output is parsed into per-iteration records, collected per
//! configuration, persisted as JSON, averaged into a [`TableModel`] and
//! rendered as text, CSV or markdown.
//!
//! # Quick Start
//!
//! ```
//! use aotbench_results::{average, ReportFormat, ResultsAggregator};
//!
//! let output = ["| app | |", "| --- | |", "| Requests/sec | 1,000 |"];
//! let mut aggregator = ResultsAggregator::new();
//! aggregator.begin("cfg-a", 0);
//! aggregator.record(1, &output)?;
//! aggregator.seal()?;
//!
//! let table = average(aggregator.results(), &["Requests/sec"])?;
//! print!("{}", ReportFormat::Csv.render(&table)?);
//! # Ok::<(), aotbench_results::ResultsError>(())
//! ```
//!
//! # Modules
//!
//! - [`result`] - Iteration, configuration and global results
//! - [`parse`] - Metric table extraction
//! - [`aggregate`] - Accumulation and averaging
//! - [`table`] - The report table model
//! - [`format`] - Text and CSV formatters
//! - [`markdown`] - Markdown formatter and summary
//! - [`io`] - JSON persistence

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod aggregate;
pub mod error;
pub mod format;
pub mod io;
pub mod markdown;
pub mod parse;
pub mod result;
pub mod table;

pub use aggregate::{average, ResultsAggregator, LABEL_HEADER};
pub use error::{Result, ResultsError};
pub use format::{CsvFormatter, ReportFormat, TableFormatter, TextFormatter};
pub use markdown::MarkdownFormatter;
pub use result::{
    ConfigurationResults, GlobalResults, IterationRecord, ASSEMBLIES_SIZE_KEY, ITERATION_KEY,
};
pub use table::TableModel;
