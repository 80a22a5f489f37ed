//! Remote backend database (spec §6): maps backend names to endpoint,
//! shot limits, contrast thresholds and gate timings.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{RemoteError, RemoteResult};

/// One entry of the remote backend database.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteDeviceEntry {
    /// Base HTTP endpoint.
    pub endpoint: String,
    /// Number of qubits the device exposes.
    pub num_qubits: u32,
    /// Default shots used when a run config does not specify one.
    pub default_shots: u32,
    /// Hard per-submission shot ceiling.
    pub safe_shot_limit: u32,
    /// Path segment job ids are appended to for polling.
    #[serde(default = "default_post_path")]
    pub post_path: String,
    /// Minimum acceptable readout contrast for the init pulse.
    #[serde(default)]
    pub init_contrast_threshold: Option<f64>,
    /// Per-qubit readout contrast thresholds.
    #[serde(default)]
    pub qubit_contrast_thresholds: Vec<f64>,
    /// Per-qubit gate timings in nanoseconds, keyed by gate name.
    #[serde(default)]
    pub gate_timings_ns: HashMap<String, f64>,
}

fn default_post_path() -> String {
    "circuit".to_string()
}

/// In-memory remote backend database, keyed by backend name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteDeviceDb {
    #[serde(flatten)]
    entries: HashMap<String, RemoteDeviceEntry>,
}

impl RemoteDeviceDb {
    /// Load a database from a YAML file.
    pub fn load_from_path(path: impl AsRef<Path>) -> RemoteResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| RemoteError::DeviceDb(format!("{}: {e}", path.as_ref().display())))?;
        Self::load_from_str(&text)
    }

    /// Parse a database from a YAML string.
    pub fn load_from_str(text: &str) -> RemoteResult<Self> {
        serde_yaml_ng::from_str(text).map_err(|e| RemoteError::DeviceDb(e.to_string()))
    }

    /// The built-in default database, covering the backends referenced in
    /// the remote protocol's own sample configuration.
    pub fn built_in() -> Self {
        let mut entries = HashMap::new();
        entries.insert(
            "gen1_canberra".to_string(),
            RemoteDeviceEntry {
                endpoint: "https://qpu.quantum-brilliance.com".to_string(),
                num_qubits: 2,
                default_shots: 1024,
                safe_shot_limit: 512,
                post_path: default_post_path(),
                init_contrast_threshold: None,
                qubit_contrast_thresholds: vec![],
                gate_timings_ns: HashMap::new(),
            },
        );
        Self { entries }
    }

    /// Look up a backend entry by name.
    pub fn get(&self, name: &str) -> RemoteResult<&RemoteDeviceEntry> {
        self.entries
            .get(name)
            .ok_or_else(|| RemoteError::UnknownBackend(name.to_string()))
    }

    /// Insert or replace an entry (used by tests and programmatic setup).
    pub fn insert(&mut self, name: impl Into<String>, entry: RemoteDeviceEntry) {
        self.entries.insert(name.into(), entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_built_in_has_gen1_canberra() {
        let db = RemoteDeviceDb::built_in();
        let entry = db.get("gen1_canberra").unwrap();
        assert_eq!(entry.num_qubits, 2);
        assert_eq!(entry.safe_shot_limit, 512);
    }

    #[test]
    fn test_unknown_backend_is_error() {
        let db = RemoteDeviceDb::built_in();
        assert!(matches!(
            db.get("nonexistent"),
            Err(RemoteError::UnknownBackend(_))
        ));
    }

    #[test]
    fn test_load_from_yaml_string() {
        let yaml = r#"
my_backend:
  endpoint: "https://example.com"
  num_qubits: 8
  default_shots: 2000
  safe_shot_limit: 1000
"#;
        let db = RemoteDeviceDb::load_from_str(yaml).unwrap();
        let entry = db.get("my_backend").unwrap();
        assert_eq!(entry.num_qubits, 8);
        assert_eq!(entry.post_path, "circuit");
    }
}
