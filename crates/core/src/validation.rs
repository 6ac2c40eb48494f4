// Copyright 2025 AOT Benchmarker Contributors
// SPDX-License-Identifier: Apache-2.0

//! Grouped configuration errors.
//!
//! Every problem found while resolving a benchmark description is recorded
//! under the name of the section or configuration it belongs to, so the whole
//! list can be shown at once and the run aborted before anything executes.

use std::fmt;

/// Configuration errors grouped by section or configuration name, in the
/// order they were first reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    groups: Vec<(String, Vec<String>)>,
}

impl ValidationReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error under `group`.
    pub fn push(&mut self, group: &str, message: impl Into<String>) {
        let message = message.into();
        match self.groups.iter_mut().find(|(name, _)| name == group) {
            Some((_, messages)) => messages.push(message),
            None => self.groups.push((group.to_string(), vec![message])),
        }
    }

    /// Record several errors under `group`.
    pub fn extend<I, S>(&mut self, group: &str, messages: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for message in messages {
            self.push(group, message);
        }
    }

    /// Whether no errors were recorded.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of errors across groups.
    pub fn total(&self) -> usize {
        self.groups.iter().map(|(_, messages)| messages.len()).sum()
    }

    /// Errors of one group.
    pub fn errors_for(&self, group: &str) -> &[String] {
        self.groups
            .iter()
            .find(|(name, _)| name == group)
            .map(|(_, messages)| messages.as_slice())
            .unwrap_or(&[])
    }

    /// Iterate over `(group, errors)` pairs.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups
            .iter()
            .map(|(name, messages)| (name.as_str(), messages.as_slice()))
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (group, messages) in self.groups() {
            writeln!(f, "{group}:")?;
            for message in messages {
                writeln!(f, "  - {message}")?;
            }
        }
        write!(f, "Total errors: {}", self.total())
    }
}
