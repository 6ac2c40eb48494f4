// Copyright 2025 AOT Benchmarker Contributors
// SPDX-License-Identifier: Apache-2.0

//! Rendering of a [`TableModel`] as a bordered text table or CSV.
//!
//! ```text
//! +---------------+-----------------+
//! | Configuration | Build Time (ms) |
//! +---------------+-----------------+
//! | cfg-a         | 123.4           |
//! +---------------+-----------------+
//! ```

use std::fmt::{Display, Write};
use std::str::FromStr;

use crate::error::{Result, ResultsError};
use crate::markdown::MarkdownFormatter;
use crate::table::TableModel;

/// Something that turns a labelled table into text.
pub trait TableFormatter {
    /// Render the table. Headers and side labels must be present.
    fn draw<T: Display>(&self, table: &TableModel<T>) -> Result<String>;
}

/// Bordered plain-text table.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFormatter;

/// Comma separated values, header line first.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvFormatter;

/// Output format of a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// [`TextFormatter`]
    #[default]
    Text,
    /// [`CsvFormatter`]
    Csv,
    /// [`MarkdownFormatter`]
    Markdown,
}

impl ReportFormat {
    /// Render with the matching formatter.
    pub fn render<T: Display>(&self, table: &TableModel<T>) -> Result<String> {
        match self {
            Self::Text => TextFormatter.draw(table),
            Self::Csv => CsvFormatter.draw(table),
            Self::Markdown => MarkdownFormatter.draw(table),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "table" => Ok(Self::Text),
            "csv" => Ok(Self::Csv),
            "markdown" | "md" => Ok(Self::Markdown),
            other => Err(format!("unknown report format '{other}'")),
        }
    }
}

/// Header row and `(label, cells)` rows as strings.
pub(crate) fn labelled_rows<T: Display>(
    table: &TableModel<T>,
) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let headers = table.headers().ok_or(ResultsError::MissingHeaders)?;
    let labels = table.side_labels().ok_or(ResultsError::MissingSideLabels)?;

    let rows = labels
        .iter()
        .enumerate()
        .map(|(row, label)| {
            let mut cells = vec![label.clone()];
            if let Some(values) = table.row(row) {
                cells.extend(values.iter().map(ToString::to_string));
            }
            cells
        })
        .collect();

    Ok((headers.to_vec(), rows))
}

impl TableFormatter for TextFormatter {
    fn draw<T: Display>(&self, table: &TableModel<T>) -> Result<String> {
        let (headers, rows) = labelled_rows(table)?;

        let widths: Vec<usize> = (0..headers.len())
            .map(|col| {
                rows.iter()
                    .filter_map(|row| row.get(col))
                    .chain(std::iter::once(&headers[col]))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
                    + 2
            })
            .collect();

        let rule = widths.iter().fold(String::from("+"), |mut line, width| {
            line.push_str(&"-".repeat(*width));
            line.push('+');
            line
        });

        let mut out = String::new();
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "{}", text_row(&headers, &widths));
        let _ = writeln!(out, "{rule}");
        for row in &rows {
            let _ = writeln!(out, "{}", text_row(row, &widths));
        }
        let _ = writeln!(out, "{rule}");
        if let Some(footers) = table.footers() {
            for footer in footers {
                let _ = writeln!(out, "{footer}");
            }
        }
        Ok(out)
    }
}

fn text_row(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (cell, width) in cells.iter().zip(widths) {
        let _ = write!(line, " {cell:<inner$} |", inner = width.saturating_sub(2));
    }
    line
}

impl TableFormatter for CsvFormatter {
    fn draw<T: Display>(&self, table: &TableModel<T>) -> Result<String> {
        let (headers, rows) = labelled_rows(table)?;

        let mut out = String::new();
        let _ = writeln!(out, "{}", csv_line(&headers));
        for row in &rows {
            let _ = writeln!(out, "{}", csv_line(row));
        }
        Ok(out)
    }
}

fn csv_line(cells: &[String]) -> String {
    cells
        .iter()
        .map(|cell| {
            if cell.contains([',', '"', '\n']) {
                format!("\"{}\"", cell.replace('"', "\"\""))
            } else {
                cell.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_time_table() -> TableModel<f64> {
        let mut table = TableModel::new(1, 1);
        *table.get_mut(0, 0).unwrap() = 123.4;
        table
            .set_headers(vec!["Configuration".into(), "Build Time (ms)".into()])
            .unwrap();
        table.set_side_labels(vec!["cfg-a".into()]).unwrap();
        table
    }

    #[test]
    fn test_csv() {
        let csv = CsvFormatter.draw(&build_time_table()).unwrap();
        assert_eq!(csv, "Configuration,Build Time (ms)\ncfg-a,123.4\n");
    }

    #[test]
    fn test_text_widths() {
        let text = TextFormatter.draw(&build_time_table()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "+---------------+-----------------+");
        assert_eq!(lines[1], "| Configuration | Build Time (ms) |");
        assert_eq!(lines[3], "| cfg-a         | 123.4           |");
        assert_eq!(lines[0], lines[2]);
        assert_eq!(lines[0], lines[4]);
    }

    #[test]
    fn test_long_label_widens_column() {
        let mut table = build_time_table();
        table
            .set_side_labels(vec!["a-rather-long-configuration-name".into()])
            .unwrap();
        let text = TextFormatter.draw(&table).unwrap();
        assert!(text.starts_with(&format!("+{}+", "-".repeat(34))));
    }

    #[test]
    fn test_absent_labels_are_errors() {
        let table = TableModel::<f64>::new(1, 1);
        assert!(matches!(
            TextFormatter.draw(&table),
            Err(ResultsError::MissingHeaders)
        ));

        let mut table = TableModel::<f64>::new(1, 1);
        table
            .set_headers(vec!["Configuration".into(), "M".into()])
            .unwrap();
        assert!(matches!(
            CsvFormatter.draw(&table),
            Err(ResultsError::MissingSideLabels)
        ));
    }

    #[test]
    fn test_format_names() {
        assert_eq!("CSV".parse::<ReportFormat>().unwrap(), ReportFormat::Csv);
        assert_eq!("md".parse::<ReportFormat>().unwrap(), ReportFormat::Markdown);
        assert!("xml".parse::<ReportFormat>().is_err());
    }
}
