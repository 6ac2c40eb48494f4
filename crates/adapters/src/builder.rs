// Copyright 2025 AOT Benchmarker Contributors
// SPDX-License-Identifier: Apache-2.0

//! The seam between the planner and the OS-specific builders.

use aotbench_core::{BuildFlags, RuntimeMaterials, TargetOs};
use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::Result;

/// Everything a builder needs to produce one variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    /// Configuration that asked for the build
    pub configuration: String,
    /// Target OS
    pub os: TargetOs,
    /// Build flags
    pub flags: BuildFlags,
    /// Variant name
    pub variant: String,
    /// Runtime assemblies to compile
    pub runtime: RuntimeMaterials,
    /// Compiler directory
    pub compiler: PathBuf,
    /// Subset list file, already staged under `resources`
    pub subset: Option<PathBuf>,
    /// Shared resources root
    pub resources: PathBuf,
    /// Output directory of the variant
    pub output: PathBuf,
}

/// Produces a variant's output directory.
#[async_trait]
pub trait ArtifactBuilder: Send {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Build the requested variant into `request.output`.
    async fn build(&mut self, request: &BuildRequest) -> Result<()>;
}
