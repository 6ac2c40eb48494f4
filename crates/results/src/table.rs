// Copyright 2025 AOT Benchmarker Contributors
// SPDX-License-Identifier: Apache-2.0

//! Plain two-dimensional table with optional headers, footers and side
//! labels. No formatting happens here.

use crate::error::{Result, ResultsError};

/// Rows × columns of `T` plus optional labels.
///
/// When present, `side_labels` has one entry per row and `headers` has one
/// entry per column plus a leading label-column header.
#[derive(Debug, Clone, PartialEq)]
pub struct TableModel<T> {
    rows: usize,
    columns: usize,
    data: Vec<T>,
    headers: Option<Vec<String>>,
    footers: Option<Vec<String>>,
    side_labels: Option<Vec<String>>,
}

impl<T: Default + Clone> TableModel<T> {
    /// A table filled with `T::default()`.
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            data: vec![T::default(); rows * columns],
            headers: None,
            footers: None,
            side_labels: None,
        }
    }
}

impl<T> TableModel<T> {
    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of data columns.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Cell at `(row, column)`.
    pub fn get(&self, row: usize, column: usize) -> Option<&T> {
        self.index(row, column).map(|i| &self.data[i])
    }

    /// Mutable cell at `(row, column)`.
    pub fn get_mut(&mut self, row: usize, column: usize) -> Option<&mut T> {
        self.index(row, column).map(move |i| &mut self.data[i])
    }

    /// One row as a slice.
    pub fn row(&self, row: usize) -> Option<&[T]> {
        if row >= self.rows {
            return None;
        }
        let start = row * self.columns;
        Some(&self.data[start..start + self.columns])
    }

    /// Set the headers; the first one names the label column.
    pub fn set_headers(&mut self, headers: Vec<String>) -> Result<()> {
        if headers.len() != self.columns + 1 {
            return Err(ResultsError::Shape(format!(
                "{} headers for {} columns",
                headers.len(),
                self.columns
            )));
        }
        self.headers = Some(headers);
        Ok(())
    }

    /// Set one side label per row.
    pub fn set_side_labels(&mut self, labels: Vec<String>) -> Result<()> {
        if labels.len() != self.rows {
            return Err(ResultsError::Shape(format!(
                "{} side labels for {} rows",
                labels.len(),
                self.rows
            )));
        }
        self.side_labels = Some(labels);
        Ok(())
    }

    /// Set free-form footers.
    pub fn set_footers(&mut self, footers: Vec<String>) {
        self.footers = Some(footers);
    }

    /// Headers, if set.
    pub fn headers(&self) -> Option<&[String]> {
        self.headers.as_deref()
    }

    /// Side labels, if set.
    pub fn side_labels(&self) -> Option<&[String]> {
        self.side_labels.as_deref()
    }

    /// Footers, if set.
    pub fn footers(&self) -> Option<&[String]> {
        self.footers.as_deref()
    }

    fn index(&self, row: usize, column: usize) -> Option<usize> {
        (row < self.rows && column < self.columns).then(|| row * self.columns + column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cells() {
        let mut table = TableModel::<f64>::new(2, 3);
        *table.get_mut(1, 2).unwrap() = 4.5;
        assert_eq!(table.get(1, 2), Some(&4.5));
        assert_eq!(table.row(0), Some(&[0.0, 0.0, 0.0][..]));
        assert!(table.get(2, 0).is_none());
        assert!(table.get(0, 3).is_none());
    }

    #[test]
    fn test_label_shapes_are_checked() {
        let mut table = TableModel::<f64>::new(1, 1);
        assert!(table.set_headers(vec!["Configuration".into()]).is_err());
        assert!(table
            .set_headers(vec!["Configuration".into(), "Requests/sec".into()])
            .is_ok());
        assert!(table.set_side_labels(vec![]).is_err());
        assert!(table.set_side_labels(vec!["cfg".into()]).is_ok());
    }
}
