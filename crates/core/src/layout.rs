// Copyright 2025 AOT Benchmarker Contributors
// SPDX-License-Identifier: Apache-2.0

//! Filesystem layout of a benchmark session.
//!
//! ```text
//! <base>/
//!   resources/              shared mount for builders
//!     lin-output-framework/ one directory per (os, variant)
//!   logs/run-log-<ts>.txt
//!   results/results-<ts>.json
//! ```

use chrono::Local;
use std::io;
use std::path::{Path, PathBuf};

use crate::os::TargetOs;

/// Files whose joint presence marks a usable artifact directory.
pub const MARKER_FILES: [&str; 2] = ["System.Private.CoreLib.dll", "System.Runtime.dll"];

/// Where the resources directory is mounted inside the build container.
pub const CONTAINER_MOUNT: &str = "/mount";

/// Timestamp used in log and results file names (`MMdd-HHmm`).
pub fn timestamp() -> String {
    Local::now().format("%m%d-%H%M").to_string()
}

/// Directory layout for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Shared resources root (build mount)
    pub resources: PathBuf,
    /// Durable logs directory
    pub logs: PathBuf,
    /// Results directory
    pub results: PathBuf,
    /// Session timestamp
    pub timestamp: String,
}

impl Layout {
    /// Standard layout under `base` with a fresh timestamp.
    pub fn under(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self::new(
            base.join("resources"),
            base.join("logs"),
            base.join("results"),
            timestamp(),
        )
    }

    /// Layout with explicit directories.
    pub fn new(
        resources: impl Into<PathBuf>,
        logs: impl Into<PathBuf>,
        results: impl Into<PathBuf>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            resources: resources.into(),
            logs: logs.into(),
            results: results.into(),
            timestamp: timestamp.into(),
        }
    }

    /// Output directory of a built variant.
    pub fn output_dir(&self, os: TargetOs, variant: &str) -> PathBuf {
        self.resources.join(format!("{}-output-{}", os.code(), variant))
    }

    /// Where a subset list file is staged for builders.
    pub fn staged_subset(&self, subset: &Path) -> Option<PathBuf> {
        subset.file_name().map(|name| self.resources.join(name))
    }

    /// Durable run log for this session.
    pub fn log_file(&self) -> PathBuf {
        self.logs.join(format!("run-log-{}.txt", self.timestamp))
    }

    /// Results file for this session.
    pub fn results_file(&self) -> PathBuf {
        self.results.join(format!("results-{}.json", self.timestamp))
    }

    /// Create the session directories.
    pub fn ensure_dirs(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.resources)?;
        std::fs::create_dir_all(&self.logs)?;
        std::fs::create_dir_all(&self.results)?;
        Ok(())
    }
}

/// Whether `dir` holds every marker file.
pub fn has_markers(dir: &Path) -> bool {
    MARKER_FILES.iter().all(|marker| dir.join(marker).is_file())
}
