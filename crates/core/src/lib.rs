// Copyright 2025 AOT Benchmarker Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration model for the AOT composite benchmarker.
//!
//! A benchmark description (YAML) declares the materials available per
//! target OS and a list of configurations. Resolving it yields validated
//! [`Configuration`]s, each knowing its variant name and, once planned, the
//! artifact directories it runs with.
//!
//! # Quick Start
//!
//! ```no_run
//! use aotbench_core::BenchmarkDescription;
//!
//! let configurations = BenchmarkDescription::load("bench.yml")?.resolve()?;
//! for config in &configurations {
//!     println!("{} -> {}", config.name, config.variant_name());
//! }
//! # Ok::<(), aotbench_core::CoreError>(())
//! ```
//!
//! # Modules
//!
//! - [`build_phase`] - Build flags and variant naming
//! - [`run_phase`] - Run flags
//! - [`configuration`] - Resolved configurations and artifacts
//! - [`description`] - YAML description and resolution
//! - [`validation`] - Grouped configuration errors
//! - [`layout`] - Session directories and file names

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod build_phase;
pub mod configuration;
pub mod description;
pub mod error;
pub mod layout;
pub mod os;
pub mod run_phase;
pub mod validation;

pub use build_phase::{variant_name, BuildFlag, BuildFlags, BuildPhaseSpec, VANILLA};
pub use configuration::{
    ArtifactLocation, Configuration, Materials, NamedPath, RuntimeMaterials,
};
pub use description::BenchmarkDescription;
pub use error::{CoreError, Result};
pub use layout::Layout;
pub use os::TargetOs;
pub use run_phase::{RunFlag, RunPhaseSpec};
pub use validation::ValidationReport;
