// Copyright 2025 AOT Benchmarker Contributors
// SPDX-License-Identifier: Apache-2.0

//! Per-iteration, per-configuration and session-wide result types.
//!
//! These are persisted as-is: a JSON object mapping configuration name to
//! the array of its iteration records, each a flat string map.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Key holding the iteration number in a record.
pub const ITERATION_KEY: &str = "Iteration";

/// Key holding the artifact size in a record.
pub const ASSEMBLIES_SIZE_KEY: &str = "Assemblies Size (KB)";

/// Metrics captured from one run of the load client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "BTreeMap<String, String>", try_from = "BTreeMap<String, String>")]
pub struct IterationRecord {
    /// 1-based iteration number
    pub iteration: usize,
    /// Metric name to raw value
    pub metrics: BTreeMap<String, String>,
}

impl IterationRecord {
    /// Create an empty record for an iteration.
    pub fn new(iteration: usize) -> Self {
        Self {
            iteration,
            metrics: BTreeMap::new(),
        }
    }

    /// Add or replace a metric.
    pub fn insert(&mut self, metric: impl Into<String>, value: impl Into<String>) {
        self.metrics.insert(metric.into(), value.into());
    }

    /// Raw value of a metric. `Iteration` is answered too.
    pub fn get(&self, metric: &str) -> Option<String> {
        if metric == ITERATION_KEY {
            return Some(self.iteration.to_string());
        }
        self.metrics.get(metric).cloned()
    }
}

impl From<IterationRecord> for BTreeMap<String, String> {
    fn from(record: IterationRecord) -> Self {
        let mut map = record.metrics;
        map.insert(ITERATION_KEY.to_string(), record.iteration.to_string());
        map
    }
}

impl TryFrom<BTreeMap<String, String>> for IterationRecord {
    type Error = String;

    fn try_from(mut map: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        let raw = map
            .remove(ITERATION_KEY)
            .ok_or_else(|| format!("record has no '{ITERATION_KEY}' entry"))?;
        let iteration = raw
            .trim()
            .parse()
            .map_err(|_| format!("invalid iteration number '{raw}'"))?;
        Ok(Self {
            iteration,
            metrics: map,
        })
    }
}

/// Ordered iteration records of one configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigurationResults {
    records: Vec<IterationRecord>,
}

impl ConfigurationResults {
    /// Empty results.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one iteration.
    pub fn push(&mut self, record: IterationRecord) {
        self.records.push(record);
    }

    /// All records, in iteration order.
    pub fn records(&self) -> &[IterationRecord] {
        &self.records
    }

    /// Number of iterations recorded.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop all records, keeping the allocation.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

/// Results of every configuration, in the order they ran.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalResults {
    entries: Vec<(String, ConfigurationResults)>,
}

impl GlobalResults {
    /// Empty results.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a configuration's results. Returns `false` when the name is
    /// already present, leaving the stored results untouched.
    pub fn insert(&mut self, name: impl Into<String>, results: ConfigurationResults) -> bool {
        let name = name.into();
        if self.get(&name).is_some() {
            return false;
        }
        self.entries.push((name, results));
        true
    }

    /// Results of one configuration.
    pub fn get(&self, name: &str) -> Option<&ConfigurationResults> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, results)| results)
    }

    /// Iterate `(name, results)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigurationResults)> {
        self.entries.iter().map(|(name, results)| (name.as_str(), results))
    }

    /// Configuration names in insertion order.
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
    }

    /// Number of configurations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no configuration was stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for GlobalResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, results) in &self.entries {
            map.serialize_entry(name, results)?;
        }
        map.end()
    }
}

struct GlobalResultsVisitor;

impl<'de> Visitor<'de> for GlobalResultsVisitor {
    type Value = GlobalResults;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of configuration name to iteration records")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut results = GlobalResults::new();
        while let Some((name, records)) = access.next_entry::<String, ConfigurationResults>()? {
            if !results.insert(name.clone(), records) {
                return Err(serde::de::Error::custom(format!(
                    "duplicate configuration '{name}'"
                )));
            }
        }
        Ok(results)
    }
}

impl<'de> Deserialize<'de> for GlobalResults {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(GlobalResultsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GlobalResults {
        let mut global = GlobalResults::new();
        for name in ["zeta", "alpha"] {
            let mut runs = ConfigurationResults::new();
            for i in 1..=2 {
                let mut record = IterationRecord::new(i);
                record.insert("Requests/sec", format!("{}", i * 1000));
                record.insert(ASSEMBLIES_SIZE_KEY, "2048");
                runs.push(record);
            }
            global.insert(name, runs);
        }
        global
    }

    #[test]
    fn test_json_round_trip_keeps_order() {
        let global = sample();
        let json = serde_json::to_string_pretty(&global).unwrap();
        assert!(json.find("zeta").unwrap() < json.find("alpha").unwrap());

        let parsed: GlobalResults = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, global);
        assert_eq!(parsed.names(), vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_record_is_flat_string_map() {
        let mut record = IterationRecord::new(3);
        record.insert("Latency (ms)", "0.51");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["Iteration"], "3");
        assert_eq!(value["Latency (ms)"], "0.51");
        assert_eq!(record.get(ITERATION_KEY).as_deref(), Some("3"));
    }

    #[test]
    fn test_record_without_iteration_is_rejected() {
        let err = serde_json::from_str::<IterationRecord>(r#"{"Requests/sec": "1"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut global = sample();
        assert!(!global.insert("alpha", ConfigurationResults::new()));
        assert_eq!(global.get("alpha").unwrap().len(), 2);
    }
}
