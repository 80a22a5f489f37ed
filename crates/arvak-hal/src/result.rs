//! Execution results: bitstring counts and the per-job result envelope.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Shot counts keyed by measured bitstring.
///
/// Bitstrings of length 32 or more are kept only in the raw map, never
/// in the derived integer map — integer overflow protection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Counts {
    raw: HashMap<String, u64>,
    as_integers: HashMap<u64, u64>,
    total_shots: u64,
}

impl Counts {
    /// An empty count table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a `Counts` from raw bitstring counts.
    pub fn from_raw(raw: HashMap<String, u64>) -> Self {
        let mut counts = Self::new();
        for (bitstring, count) in raw {
            counts.insert(bitstring, count);
        }
        counts
    }

    /// Add (or accumulate into) one bitstring's count.
    pub fn insert(&mut self, bitstring: impl Into<String>, count: u64) {
        let bitstring = bitstring.into();
        if bitstring.len() < 32 {
            if let Ok(value) = u64::from_str_radix(&bitstring, 2) {
                *self.as_integers.entry(value).or_insert(0) += count;
            }
        }
        *self.raw.entry(bitstring).or_insert(0) += count;
        self.total_shots += count;
    }

    /// Shot count recorded for a bitstring, or 0 if never observed.
    pub fn get(&self, bitstring: &str) -> u64 {
        self.raw.get(bitstring).copied().unwrap_or(0)
    }

    /// Total shots represented across all bitstrings.
    pub fn total_shots(&self) -> u64 {
        self.total_shots
    }

    /// Raw bitstring -> count map.
    pub fn raw(&self) -> &HashMap<String, u64> {
        &self.raw
    }

    /// Bitstring-as-integer -> count map, omitted for bitstrings of
    /// length >= 32.
    pub fn as_integers(&self) -> &HashMap<u64, u64> {
        &self.as_integers
    }

    /// Bitstring/count pairs sorted by count, descending.
    pub fn sorted(&self) -> Vec<(&String, &u64)> {
        let mut pairs: Vec<_> = self.raw.iter().collect();
        pairs.sort_by(|a, b| b.1.cmp(a.1));
        pairs
    }

    /// The most frequently observed bitstring, if any shots were recorded.
    pub fn most_frequent(&self) -> Option<(&str, u64)> {
        self.raw
            .iter()
            .max_by_key(|(_, &count)| count)
            .map(|(bitstring, &count)| (bitstring.as_str(), count))
    }

    /// Probability of each bitstring (count / total_shots).
    pub fn probabilities(&self) -> HashMap<String, f64> {
        if self.total_shots == 0 {
            return HashMap::new();
        }
        self.raw
            .iter()
            .map(|(bitstring, &count)| (bitstring.clone(), count as f64 / self.total_shots as f64))
            .collect()
    }

    /// Expectation value of the Z operator on a single qubit position
    /// (0 = most significant bit of the bitstring), computed as
    /// `P(0) - P(1)` for that bit over all recorded shots.
    pub fn expectation_z(&self, qubit_position: usize) -> f64 {
        if self.total_shots == 0 {
            return 0.0;
        }
        let mut plus = 0u64;
        let mut minus = 0u64;
        for (bitstring, &count) in &self.raw {
            match bitstring.as_bytes().get(qubit_position) {
                Some(b'0') => plus += count,
                Some(b'1') => minus += count,
                _ => {}
            }
        }
        (plus as f64 - minus as f64) / self.total_shots as f64
    }
}

/// The outcome of a completed job: counts plus optional timing and
/// statevector data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Shot counts.
    pub counts: Counts,
    /// Shots requested at submission time.
    pub shots: u32,
    /// Wall-clock execution time in milliseconds, if reported by the
    /// backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<f64>,
    /// Queue wait time in milliseconds, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_time_ms: Option<f64>,
    /// Exact statevector amplitudes, present only for `shots = 0`
    /// (deterministic) simulator runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statevector: Option<Vec<(f64, f64)>>,
}

impl ExecutionResult {
    /// Build a result from counts and the originally requested shot count.
    pub fn new(counts: Counts, shots: u32) -> Self {
        Self {
            counts,
            shots,
            execution_time_ms: None,
            queue_time_ms: None,
            statevector: None,
        }
    }

    /// Attach execution and queue timing.
    pub fn with_timing(mut self, execution_time_ms: f64, queue_time_ms: f64) -> Self {
        self.execution_time_ms = Some(execution_time_ms);
        self.queue_time_ms = Some(queue_time_ms);
        self
    }

    /// Attach an exact statevector (deterministic `shots = 0` runs).
    pub fn with_statevector(mut self, statevector: Vec<(f64, f64)>) -> Self {
        self.statevector = Some(statevector);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_from_raw_derives_integers_and_total() {
        let mut raw = HashMap::new();
        raw.insert("00".to_string(), 60);
        raw.insert("11".to_string(), 40);

        let counts = Counts::from_raw(raw);
        assert_eq!(counts.total_shots(), 100);
        assert_eq!(counts.as_integers().get(&0), Some(&60));
        assert_eq!(counts.as_integers().get(&3), Some(&40));
    }

    #[test]
    fn test_long_bitstrings_skip_integer_map() {
        let mut raw = HashMap::new();
        let long_bitstring = "1".repeat(32);
        raw.insert(long_bitstring, 5);

        let counts = Counts::from_raw(raw);
        assert!(counts.as_integers().is_empty());
        assert_eq!(counts.total_shots(), 5);
    }

    #[test]
    fn test_insert_accumulates() {
        let mut counts = Counts::new();
        counts.insert("01", 10);
        counts.insert("01", 5);
        assert_eq!(counts.get("01"), 15);
        assert_eq!(counts.total_shots(), 15);
    }

    #[test]
    fn test_most_frequent() {
        let mut raw = HashMap::new();
        raw.insert("00".to_string(), 5);
        raw.insert("11".to_string(), 95);
        let counts = Counts::from_raw(raw);
        assert_eq!(counts.most_frequent(), Some(("11", 95)));
    }

    #[test]
    fn test_expectation_z() {
        let mut raw = HashMap::new();
        raw.insert("0".to_string(), 75);
        raw.insert("1".to_string(), 25);
        let counts = Counts::from_raw(raw);
        assert!((counts.expectation_z(0) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_execution_result_new_carries_shots() {
        let result = ExecutionResult::new(Counts::new(), 1000);
        assert_eq!(result.shots, 1000);
        assert!(result.statevector.is_none());
    }
}
