// Copyright 2025 AOT Benchmarker Contributors
// SPDX-License-Identifier: Apache-2.0

//! Markdown output for benchmark reports.

use std::fmt::{Display, Write};

use crate::error::Result;
use crate::format::{labelled_rows, TableFormatter};
use crate::result::GlobalResults;
use crate::table::TableModel;

/// Pipe table in GitHub flavoured markdown.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownFormatter;

impl TableFormatter for MarkdownFormatter {
    fn draw<T: Display>(&self, table: &TableModel<T>) -> Result<String> {
        let (headers, rows) = labelled_rows(table)?;
        let mut output = String::new();

        let _ = writeln!(output, "| {} |", headers.join(" | "));
        let separator: Vec<String> = headers
            .iter()
            .map(|h| "-".repeat(h.chars().count().max(3)))
            .collect();
        let _ = writeln!(output, "|{}|", separator.join("|"));
        for row in rows {
            let _ = writeln!(output, "| {} |", row.join(" | "));
        }

        Ok(output)
    }
}

/// Generate a markdown summary: the averaged table followed by the number of
/// iterations recorded per configuration.
pub fn generate_summary<T: Display>(results: &GlobalResults, table: &TableModel<T>) -> Result<String> {
    let mut output = String::new();

    let _ = writeln!(output, "# Benchmark Summary");
    let _ = writeln!(output);
    let _ = writeln!(output, "Generated: {}", chrono::Local::now().to_rfc3339());
    let _ = writeln!(output);
    let _ = writeln!(output, "## Averages");
    let _ = writeln!(output);
    output.push_str(&MarkdownFormatter.draw(table)?);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Iterations");
    let _ = writeln!(output);
    for (name, runs) in results.iter() {
        let _ = writeln!(output, "- **{}**: {} iteration(s)", name, runs.len());
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "---");
    let _ = writeln!(output, "Total configurations: {}", results.len());

    Ok(output)
}
