// Copyright 2025 AOT Benchmarker Contributors
// SPDX-License-Identifier: Apache-2.0

//! Recording fakes for pipeline tests.

use aotbench_adapters::{ArtifactBuilder, BuildRequest, CommandRunner, CommandSpec};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::fs;
use std::sync::{Arc, Mutex};

/// Builder that records requests and writes a minimal marked output.
#[derive(Debug, Clone)]
pub(crate) struct FakeBuilder {
    name: &'static str,
    requests: Arc<Mutex<Vec<BuildRequest>>>,
}

impl FakeBuilder {
    pub(crate) fn new(name: &'static str) -> Self {
        Self {
            name,
            requests: Arc::default(),
        }
    }

    pub(crate) fn requests(&self) -> Vec<BuildRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn builds(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ArtifactBuilder for FakeBuilder {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn build(&mut self, request: &BuildRequest) -> aotbench_adapters::Result<()> {
        fs::create_dir_all(&request.output)?;
        fs::write(request.output.join(format!("{}.r2r.dll", request.variant)), b"composite")?;
        fs::write(request.output.join("System.Runtime.dll"), b"compiled")?;
        self.requests.lock().unwrap().push(request.clone());
        Ok(())
    }
}

/// Runner that records commands and replays canned stdout, one entry per
/// call.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingRunner {
    calls: Arc<Mutex<Vec<CommandSpec>>>,
    outputs: Arc<Mutex<VecDeque<Vec<String>>>>,
}

impl RecordingRunner {
    pub(crate) fn with_outputs<I, S>(outputs: I) -> Self
    where
        I: IntoIterator<Item = Vec<S>>,
        S: Into<String>,
    {
        let runner = Self::default();
        runner
            .outputs
            .lock()
            .unwrap()
            .extend(outputs.into_iter().map(|lines| lines.into_iter().map(Into::into).collect()));
        runner
    }

    pub(crate) fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, command: &CommandSpec) -> aotbench_adapters::Result<Vec<String>> {
        self.calls.lock().unwrap().push(command.clone());
        Ok(self.outputs.lock().unwrap().pop_front().unwrap_or_default())
    }
}

/// Load client output reporting `requests` requests per second.
pub(crate) fn client_output(requests: &str) -> Vec<String> {
    vec![
        "| application           |                |".to_string(),
        "| --------------------- | -------------- |".to_string(),
        format!("| Requests/sec          | {requests} |"),
        "| Mean latency (ms)     | 1.50           |".to_string(),
        String::new(),
        "Finished".to_string(),
    ]
}
