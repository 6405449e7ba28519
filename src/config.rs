//! Configuration management for the interaction clusterer

use crate::error::{ClusterError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// How core clusters are formed before duplication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Breadth-first core clusters built over the whole index in memory
    #[default]
    InMemory,

    /// Round-based label propagation with externally stored snapshots
    Iterative,
}

/// Run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Clustering mode
    pub mode: Mode,

    /// Number of label propagation rounds (iterative mode)
    pub num_iterations: usize,

    /// Duplication sensitivity, lower means more duplication
    pub duplication_threshold_ratio: f64,

    /// Stop propagating once a round changes no label
    pub stop_when_stable: bool,

    /// Display name of side A entities in reports
    pub a_label: String,

    /// Display name of side B entities in reports
    pub b_label: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::InMemory,
            num_iterations: 5,
            duplication_threshold_ratio: 0.3,
            stop_when_stable: false,
            a_label: "A".to_string(),
            b_label: "B".to_string(),
        }
    }
}

impl Config {
    /// Create a new configuration with custom algorithm parameters
    pub fn new(mode: Mode, num_iterations: usize, duplication_threshold_ratio: f64) -> Self {
        Self {
            mode,
            num_iterations,
            duplication_threshold_ratio,
            ..Self::default()
        }
    }

    /// Read a JSON configuration file; absent fields take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let config = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }

    /// Reject parameters the algorithms cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.num_iterations < 1 {
            return Err(ClusterError::InvalidIterations {
                got: self.num_iterations,
            });
        }

        let ratio = self.duplication_threshold_ratio;
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(ClusterError::InvalidThreshold { got: ratio });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn zero_iterations_rejected() {
        let config = Config::new(Mode::Iterative, 0, 0.3);
        assert!(matches!(
            config.validate(),
            Err(ClusterError::InvalidIterations { got: 0 })
        ));
    }

    #[test]
    fn threshold_bounds() {
        for bad in [0.0, -0.1, 1.01, f64::NAN] {
            let config = Config::new(Mode::InMemory, 1, bad);
            assert!(matches!(
                config.validate(),
                Err(ClusterError::InvalidThreshold { .. })
            ));
        }
        assert!(Config::new(Mode::InMemory, 1, 1.0).validate().is_ok());
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"mode": "iterative", "num_iterations": 3}"#).unwrap();
        assert_eq!(config.mode, Mode::Iterative);
        assert_eq!(config.num_iterations, 3);
        assert_eq!(config.duplication_threshold_ratio, 0.3);
        assert_eq!(config.a_label, "A");
    }
}
