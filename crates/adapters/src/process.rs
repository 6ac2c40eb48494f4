// Copyright 2025 AOT Benchmarker Contributors
// SPDX-License-Identifier: Apache-2.0

//! Running external programs with streamed output.
//!
//! Every stdout line is emitted as a `tracing` event on [`OUTPUT_TARGET`]
//! as soon as it is read, so the durable log receives it, and is also kept
//! in memory for the caller.

use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{AdapterError, Result};

/// Tracing target of external process output.
pub const OUTPUT_TARGET: &str = "aotbench::output";

/// A program invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program to run
    pub program: String,
    /// Arguments, one per element
    pub args: Vec<String>,
    /// Extra environment variables
    pub envs: Vec<(String, String)>,
    /// Working directory
    pub current_dir: Option<PathBuf>,
}

impl CommandSpec {
    /// A command with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Set the working directory.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.contains(' ') {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Runs external programs to completion.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command`, returning its stdout lines. A non-zero exit is an
    /// error.
    async fn run(&self, command: &CommandSpec) -> Result<Vec<String>>;
}

#[async_trait]
impl<T: CommandRunner + ?Sized> CommandRunner for Arc<T> {
    async fn run(&self, command: &CommandSpec) -> Result<Vec<String>> {
        (**self).run(command).await
    }
}

/// [`CommandRunner`] backed by `tokio::process`.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
}

impl ProcessRunner {
    /// A runner without a time limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill and fail any command running longer than `limit`.
    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<Vec<String>> {
        info!("{spec}");

        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .envs(spec.envs.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &spec.current_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|source| AdapterError::Spawn {
            program: spec.program.clone(),
            source,
        })?;

        let stderr_task = child.stderr.take().map(|stderr| {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    info!(target: OUTPUT_TARGET, stream = "stderr", "{line}");
                }
            })
        });
        let stdout = child.stdout.take();

        let drain = async {
            let mut captured = Vec::new();
            if let Some(stdout) = stdout {
                let mut lines = BufReader::new(stdout).lines();
                while let Some(line) = lines.next_line().await? {
                    info!(target: OUTPUT_TARGET, "{line}");
                    captured.push(line);
                }
            }
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((captured, status))
        };

        let outcome = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, drain).await.map_err(|_| {
                AdapterError::Timeout {
                    command: spec.to_string(),
                    seconds: limit.as_secs(),
                }
            })?,
            None => drain.await,
        };
        let (captured, status) = outcome?;

        if let Some(task) = stderr_task {
            let _ = task.await;
        }

        debug!(program = %spec.program, lines = captured.len(), %status, "Process finished");

        if !status.success() {
            return Err(AdapterError::ExitStatus {
                command: spec.to_string(),
                code: status.code(),
            });
        }
        Ok(captured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_quotes_spaced_args() {
        let spec = CommandSpec::new("crank")
            .arg("--config")
            .arg("bench.yml")
            .arg("-p:PublishReadyToRun=true -p:Other=1");
        assert_eq!(
            spec.to_string(),
            "crank --config bench.yml \"-p:PublishReadyToRun=true -p:Other=1\""
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_captures_stdout_lines() {
        let spec = CommandSpec::new("sh").args(["-c", "echo '| a | 1 |'; echo done"]);
        let lines = ProcessRunner::new().run(&spec).await.unwrap();
        assert_eq!(lines, vec!["| a | 1 |", "done"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_an_error() {
        let spec = CommandSpec::new("sh").args(["-c", "echo partial; exit 3"]);
        let err = ProcessRunner::new().run(&spec).await.unwrap_err();
        assert!(matches!(err, AdapterError::ExitStatus { code: Some(3), .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_kills() {
        let spec = CommandSpec::new("sh").args(["-c", "sleep 5"]);
        let err = ProcessRunner::new()
            .with_timeout(Duration::from_millis(100))
            .run(&spec)
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let spec = CommandSpec::new("definitely-not-a-real-program-4711");
        let err = ProcessRunner::new().run(&spec).await.unwrap_err();
        assert!(matches!(err, AdapterError::Spawn { .. }));
    }
}
