// Copyright 2025 AOT Benchmarker Contributors
// SPDX-License-Identifier: Apache-2.0

//! `aotbench` entry point.

use clap::Parser;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = aotbench_cli::Cli::parse();
    match aotbench_cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            aotbench_cli::report_error(&err);
            ExitCode::from(aotbench_cli::exit_code(&err))
        }
    }
}
