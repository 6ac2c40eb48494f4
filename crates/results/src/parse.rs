// Copyright 2025 AOT Benchmarker Contributors
// SPDX-License-Identifier: Apache-2.0

//! Extraction of the metric table from load client output.
//!
//! The client prints a pipe-bordered table among other free-form text:
//!
//! ```text
//! | application           |             |
//! | --------------------- | ----------- |
//! | CPU Usage (%)         | 97          |
//! | Requests/sec          | 1,204,113   |
//!
//! ```
//!
//! The first `|` line is the header and the next one its separator; the
//! data rows follow until the first empty or non `|` line.

const DELIMITER: char = '|';

/// Parse `(metric, value)` pairs out of captured output lines.
///
/// Metric names are trimmed; values are trimmed with thousands separators
/// removed. Rows with fewer than two cells are ignored.
pub fn parse_metric_table<S: AsRef<str>>(lines: &[S]) -> Vec<(String, String)> {
    lines
        .iter()
        .map(AsRef::as_ref)
        .skip_while(|line| !line.starts_with(DELIMITER))
        .skip(2)
        .take_while(|line| !line.trim().is_empty() && line.starts_with(DELIMITER))
        .filter_map(parse_row)
        .collect()
}

fn parse_row(line: &str) -> Option<(String, String)> {
    let mut cells = line.split(DELIMITER).skip(1);
    let metric = cells.next()?.trim();
    let value = cells.next()?.trim().replace(',', "");
    if metric.is_empty() {
        return None;
    }
    Some((metric.to_string(), value))
}
