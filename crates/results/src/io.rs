// Copyright 2025 AOT Benchmarker Contributors
// SPDX-License-Identifier: Apache-2.0

//! Reading and writing persisted results and rendered reports.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::result::GlobalResults;

/// Write results as pretty JSON, creating parent directories.
pub fn write_results_json(results: &GlobalResults, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(results)?;
    fs::write(path, json)?;
    info!(path = %path.display(), configurations = results.len(), "Results written");
    Ok(())
}

/// Read results from a JSON file.
pub fn read_results_json(path: impl AsRef<Path>) -> Result<GlobalResults> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Write a rendered report to `path`, or to stdout when `path` is `None`.
pub fn write_report(report: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, report)?;
        }
        None => {
            println!();
            print!("{report}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{ConfigurationResults, IterationRecord};

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results").join("results-0101-1200.json");

        let mut record = IterationRecord::new(1);
        record.insert("Requests/sec", "1000");
        let mut runs = ConfigurationResults::new();
        runs.push(record);
        let mut results = GlobalResults::new();
        results.insert("cfg", runs);

        write_results_json(&results, &path).unwrap();
        assert_eq!(read_results_json(&path).unwrap(), results);
    }

    #[test]
    fn test_write_report_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        write_report("a,b\n", Some(&path)).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "a,b\n");
    }
}
