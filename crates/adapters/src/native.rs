// Copyright 2025 AOT Benchmarker Contributors
// SPDX-License-Identifier: Apache-2.0

//! Builder that runs the build engine on the host.

use async_trait::async_trait;
use tracing::info;

use crate::builder::{ArtifactBuilder, BuildRequest};
use crate::engine::{BuildEngine, EngineEnvironment};
use crate::error::Result;
use crate::process::CommandRunner;

/// Compiles variants with the host's compiler, one invocation at a time.
#[derive(Debug)]
pub struct NativeBuilder<R> {
    engine: BuildEngine<R>,
}

impl<R: CommandRunner> NativeBuilder<R> {
    /// A builder running the compiler through `runner`.
    pub fn new(runner: R) -> Self {
        Self {
            engine: BuildEngine::new(runner),
        }
    }
}

/// Engine settings for a build request.
pub fn engine_environment(request: &BuildRequest) -> EngineEnvironment {
    EngineEnvironment {
        flags: request.flags,
        variant: request.variant.clone(),
        partial_composites: request.subset.clone(),
        target_os: request.os,
        compiler: request.compiler.clone(),
        framework: request.runtime.framework.clone(),
        aspnet: request.runtime.aspnet.clone(),
        output: request.output.clone(),
    }
}

#[async_trait]
impl<R: CommandRunner> ArtifactBuilder for NativeBuilder<R> {
    fn name(&self) -> &'static str {
        "native"
    }

    async fn build(&mut self, request: &BuildRequest) -> Result<()> {
        info!(
            configuration = %request.configuration,
            variant = %request.variant,
            os = %request.os,
            "Building natively"
        );
        let env = engine_environment(request);
        self.engine.process(&env).await?;
        Ok(())
    }
}
