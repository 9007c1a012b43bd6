//! Simulation configuration
//!
//! Every physical and numerical knob of a run lives in one value that can be
//! read from a JSON file and then overridden from the command line.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::forcefield::CoulombParams;
use crate::optimization::metropolis::{MetropolisParams, BODY_TEMPERATURE};
use crate::optimization::perturbation::PerturbationParams;
use crate::validation::DEFAULT_SHIFT_THRESHOLD;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub iterations: usize,
    pub rotate: bool,
    pub temperature: f64,
    /// Worker count; `None` uses one worker per thread of the rayon pool
    pub workers: Option<usize>,
    pub min_distance: f64,
    pub max_angle: f64,
    pub step: f64,
    pub max_perturbation_attempts: Option<usize>,
    /// Pull distant ligands to this closest-approach distance before docking
    pub shift_threshold: Option<f64>,
    pub coulomb_constant: f64,
    pub distance_floor: f64,
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let perturbation = PerturbationParams::default();
        let coulomb = CoulombParams::default();
        Self {
            iterations: 3000,
            rotate: true,
            temperature: BODY_TEMPERATURE,
            workers: None,
            min_distance: perturbation.min_distance,
            max_angle: perturbation.max_angle,
            step: perturbation.step,
            max_perturbation_attempts: perturbation.max_attempts,
            shift_threshold: Some(DEFAULT_SHIFT_THRESHOLD),
            coulomb_constant: coulomb.coulomb_constant,
            distance_floor: coulomb.distance_floor,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Load a configuration from a JSON file; omitted keys keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Resolved worker count
    pub fn workers(&self) -> usize {
        self.workers.unwrap_or_else(rayon::current_num_threads)
    }

    pub fn metropolis_params(&self) -> MetropolisParams {
        MetropolisParams {
            iterations: self.iterations,
            rotate: self.rotate,
            temperature: self.temperature,
            workers: self.workers(),
            perturbation: PerturbationParams {
                min_distance: self.min_distance,
                max_angle: self.max_angle,
                step: self.step,
                max_attempts: self.max_perturbation_attempts,
            },
        }
    }

    pub fn coulomb_params(&self) -> CoulombParams {
        CoulombParams {
            coulomb_constant: self.coulomb_constant,
            distance_floor: self.distance_floor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = SimulationConfig::default();
        assert_eq!(config.iterations, 3000);
        assert_eq!(config.temperature, 310.15);
        assert_eq!(config.min_distance, 0.5);
        assert_eq!(config.max_angle, 0.79);
        assert_eq!(config.shift_threshold, Some(5.0));
        assert_eq!(config.coulomb_constant, 9e9);
        assert!(config.workers() >= 1);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            SimulationConfig::from_json(r#"{"iterations": 50, "workers": 3, "rotate": false, "seed": 7}"#)
                .unwrap();
        assert_eq!(config.iterations, 50);
        assert_eq!(config.workers(), 3);
        assert!(!config.rotate);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.temperature, 310.15);

        let params = config.metropolis_params();
        assert_eq!(params.workers, 3);
        assert_eq!(params.perturbation.min_distance, 0.5);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(matches!(
            SimulationConfig::from_json(r#"{"iterationz": 5}"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.json");
        std::fs::write(&path, r#"{"temperature": 1.5, "shift_threshold": null}"#).unwrap();

        let config = SimulationConfig::from_file(&path).unwrap();
        assert_eq!(config.temperature, 1.5);
        assert_eq!(config.shift_threshold, None);
        assert_eq!(config.coulomb_params(), CoulombParams::default());
    }
}
