// Copyright 2025 AOT Benchmarker Contributors
// SPDX-License-Identifier: Apache-2.0

//! Adapters to the external tools the benchmarker drives.
//!
//! The ahead-of-time compiler, `docker` and the load-generation client are
//! all reached through the [`CommandRunner`] seam, which streams process
//! output into the log as it arrives.
//!
//! # Quick Start
//!
//! ```no_run
//! use aotbench_adapters::{CommandRunner, CommandSpec, ProcessRunner};
//!
//! # async fn demo() -> aotbench_adapters::Result<()> {
//! let runner = ProcessRunner::new();
//! let lines = runner.run(&CommandSpec::new("crank").arg("--version")).await?;
//! println!("{} lines", lines.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`process`] - Command lines and the streaming process runner
//! - [`compiler`] - Compiler invocation composer
//! - [`engine`] - Build engine and its environment contract
//! - [`builder`] - Builder seam used by the planner
//! - [`native`] - Builder running the engine on the host
//! - [`container`] - Builder running the engine in a container
//! - [`load_client`] - Load client command lines
//! - [`materials`] - File helpers for runtime materials

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod builder;
pub mod compiler;
pub mod container;
pub mod engine;
pub mod error;
pub mod load_client;
pub mod materials;
pub mod native;
pub mod process;

pub use builder::{ArtifactBuilder, BuildRequest};
pub use compiler::{CompilerCommandComposer, CompilerPaths};
pub use container::ContainerBuilder;
pub use engine::{BuildEngine, EngineEnvironment};
pub use error::{AdapterError, Result};
pub use load_client::LoadClient;
pub use native::NativeBuilder;
pub use process::{CommandRunner, CommandSpec, ProcessRunner, OUTPUT_TARGET};
