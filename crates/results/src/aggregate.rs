// Copyright 2025 AOT Benchmarker Contributors
// SPDX-License-Identifier: Apache-2.0

//! Per-configuration accumulation of iteration records and averaging into a
//! report table.

use tracing::debug;

use crate::error::{Result, ResultsError};
use crate::parse::parse_metric_table;
use crate::result::{
    ConfigurationResults, GlobalResults, IterationRecord, ASSEMBLIES_SIZE_KEY,
};
use crate::table::TableModel;

/// Header of the label column in reports.
pub const LABEL_HEADER: &str = "Configuration";

/// Collects iteration records one configuration at a time.
///
/// ```text
/// begin("cfg-a", size) -> record(1, out) -> record(2, out) -> seal()
/// begin("cfg-b", size) -> ...
/// ```
#[derive(Debug, Default)]
pub struct ResultsAggregator {
    open: Option<OpenConfiguration>,
    current: ConfigurationResults,
    global: GlobalResults,
}

#[derive(Debug)]
struct OpenConfiguration {
    name: String,
    assemblies_size_kb: u64,
}

impl ResultsAggregator {
    /// An aggregator with no results.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start collecting for a configuration whose artifact weighs
    /// `assemblies_size_kb`.
    pub fn begin(&mut self, configuration: impl Into<String>, assemblies_size_kb: u64) {
        self.current.clear();
        self.open = Some(OpenConfiguration {
            name: configuration.into(),
            assemblies_size_kb,
        });
    }

    /// Parse one iteration's output and append it.
    pub fn record<S: AsRef<str>>(&mut self, iteration: usize, output: &[S]) -> Result<&IterationRecord> {
        let open = self.open.as_ref().ok_or(ResultsError::NoOpenConfiguration)?;

        let mut record = IterationRecord::new(iteration);
        for (metric, value) in parse_metric_table(output) {
            record.insert(metric, value);
        }
        record.insert(ASSEMBLIES_SIZE_KEY, open.assemblies_size_kb.to_string());

        debug!(
            configuration = %open.name,
            iteration,
            metrics = record.metrics.len(),
            "Recorded iteration"
        );

        self.current.push(record);
        self.current
            .records()
            .last()
            .ok_or(ResultsError::NoOpenConfiguration)
    }

    /// Move the open configuration's records into the global results and
    /// reset for the next configuration.
    pub fn seal(&mut self) -> Result<()> {
        let open = self.open.take().ok_or(ResultsError::NoOpenConfiguration)?;
        let records = std::mem::take(&mut self.current);
        if !self.global.insert(open.name.clone(), records) {
            return Err(ResultsError::DuplicateConfiguration(open.name));
        }
        Ok(())
    }

    /// Everything sealed so far.
    pub fn results(&self) -> &GlobalResults {
        &self.global
    }

    /// Consume the aggregator.
    pub fn into_results(self) -> GlobalResults {
        self.global
    }
}

/// Average the requested metrics of every configuration.
///
/// One row per configuration, in stored order, one column per metric.
/// A metric missing from any record fails the whole report, and so does a
/// configuration without records.
pub fn average<S: AsRef<str>>(results: &GlobalResults, metrics: &[S]) -> Result<TableModel<f64>> {
    let mut table = TableModel::new(results.len(), metrics.len());

    for (row, (name, runs)) in results.iter().enumerate() {
        if runs.is_empty() && !metrics.is_empty() {
            return Err(ResultsError::NoIterations(name.to_string()));
        }
        for (column, metric) in metrics.iter().enumerate() {
            let metric = metric.as_ref();
            let mut sum = 0.0;
            for record in runs.records() {
                let raw = record.get(metric).ok_or_else(|| ResultsError::MissingMetric {
                    metric: metric.to_string(),
                    configuration: name.to_string(),
                })?;
                sum += raw.replace(',', "").trim().parse::<f64>().map_err(|_| {
                    ResultsError::InvalidValue {
                        metric: metric.to_string(),
                        value: raw.clone(),
                        configuration: name.to_string(),
                    }
                })?;
            }
            if let Some(cell) = table.get_mut(row, column) {
                *cell = sum / runs.len() as f64;
            }
        }
    }

    let headers = std::iter::once(LABEL_HEADER.to_string())
        .chain(metrics.iter().map(|m| m.as_ref().to_string()))
        .collect();
    table.set_headers(headers)?;
    table.set_side_labels(results.names())?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(value: &str) -> Vec<String> {
        vec![
            "| application | |".to_string(),
            "| ----------- | |".to_string(),
            format!("| Requests/sec | {value} |"),
            String::new(),
        ]
    }

    #[test]
    fn test_mean_of_iterations() {
        let mut aggregator = ResultsAggregator::new();
        aggregator.begin("cfg-a", 512);
        for (i, value) in ["10", "20", "30"].iter().enumerate() {
            aggregator.record(i + 1, &output(value)).unwrap();
        }
        aggregator.seal().unwrap();

        let table = average(aggregator.results(), &["Requests/sec"]).unwrap();
        assert_eq!(table.get(0, 0), Some(&20.0));
        assert_eq!(table.side_labels().unwrap(), ["cfg-a"]);
        assert_eq!(table.headers().unwrap(), [LABEL_HEADER, "Requests/sec"]);
    }

    #[test]
    fn test_size_and_iteration_are_recorded() {
        let mut aggregator = ResultsAggregator::new();
        aggregator.begin("cfg-a", 2048);
        let record = aggregator.record(1, &output("1,000")).unwrap();
        assert_eq!(record.get(ASSEMBLIES_SIZE_KEY).as_deref(), Some("2048"));
        assert_eq!(record.get("Requests/sec").as_deref(), Some("1000"));
        assert_eq!(record.get("Iteration").as_deref(), Some("1"));
    }

    #[test]
    fn test_records_are_cleared_between_configurations() {
        let mut aggregator = ResultsAggregator::new();
        aggregator.begin("cfg-a", 1);
        aggregator.record(1, &output("1")).unwrap();
        aggregator.record(2, &output("3")).unwrap();
        aggregator.seal().unwrap();
        aggregator.begin("cfg-b", 1);
        aggregator.record(1, &output("5")).unwrap();
        aggregator.seal().unwrap();

        let results = aggregator.into_results();
        assert_eq!(results.get("cfg-a").unwrap().len(), 2);
        assert_eq!(results.get("cfg-b").unwrap().len(), 1);

        let table = average(&results, &["Requests/sec", "Assemblies Size (KB)"]).unwrap();
        assert_eq!(table.row(0), Some(&[2.0, 1.0][..]));
        assert_eq!(table.row(1), Some(&[5.0, 1.0][..]));
    }

    #[test]
    fn test_missing_metric_is_fatal() {
        let mut aggregator = ResultsAggregator::new();
        aggregator.begin("cfg-a", 1);
        aggregator.record(1, &output("1")).unwrap();
        aggregator.seal().unwrap();

        let err = average(aggregator.results(), &["Latency (ms)"]).unwrap_err();
        assert!(matches!(err, ResultsError::MissingMetric { ref metric, .. } if metric == "Latency (ms)"));
    }

    #[test]
    fn test_empty_configuration_is_fatal() {
        let mut results = GlobalResults::new();
        results.insert("cfg-a", ConfigurationResults::new());

        let err = average(&results, &["Requests/sec"]).unwrap_err();
        assert!(matches!(err, ResultsError::NoIterations(ref name) if name == "cfg-a"));
    }

    #[test]
    fn test_record_requires_begin() {
        let mut aggregator = ResultsAggregator::new();
        assert!(matches!(
            aggregator.record(1, &output("1")),
            Err(ResultsError::NoOpenConfiguration)
        ));
        assert!(aggregator.seal().is_err());
    }
}
