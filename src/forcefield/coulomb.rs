//! Coulomb-only pairwise scoring

use crate::atom::Atom;
use crate::forcefield::{ForceField, ForceFieldError};
use serde::{Deserialize, Serialize};

/// Parameters for the Coulomb forcefield
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoulombParams {
    /// Coulomb constant surrogate
    pub coulomb_constant: f64,

    /// Distances below this are clamped before dividing
    pub distance_floor: f64,
}

impl Default for CoulombParams {
    fn default() -> Self {
        Self {
            coulomb_constant: 9e9,
            distance_floor: 1e-6,
        }
    }
}

/// Signed pairwise Coulomb energy `K q1 q2 / r`.
///
/// Like charges contribute positive energy, opposite charges negative.
#[derive(Debug, Clone, Default)]
pub struct CoulombForceField {
    pub params: CoulombParams,
}

impl CoulombForceField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a forcefield with custom parameters
    pub fn with_params(params: CoulombParams) -> Result<Self, ForceFieldError> {
        if !params.coulomb_constant.is_finite() {
            return Err(ForceFieldError::InvalidParameter {
                name: "coulomb_constant",
                value: params.coulomb_constant,
            });
        }
        if !(params.distance_floor > 0.0 && params.distance_floor.is_finite()) {
            return Err(ForceFieldError::InvalidParameter {
                name: "distance_floor",
                value: params.distance_floor,
            });
        }
        Ok(Self { params })
    }
}

impl ForceField for CoulombForceField {
    fn name(&self) -> &'static str {
        "Coulomb"
    }

    fn pair_energy(&self, atom1: &Atom, atom2: &Atom, distance: f64) -> f64 {
        let distance = distance.max(self.params.distance_floor);
        self.params.coulomb_constant * atom1.charge * atom2.charge / distance
    }
}
