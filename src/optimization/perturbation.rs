//! Random pose perturbation under a minimum interatomic distance constraint

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::math::{random_unit_axis, rotate_around_axis};
use crate::molecule::Molecule;
use crate::optimization::OptimizationError;

/// Parameters for ligand perturbation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerturbationParams {
    /// Minimum allowed distance between any two ligand atoms (in Angstroms)
    pub min_distance: f64,

    /// Maximum rotation per step (in radians, ~45 degrees)
    pub max_angle: f64,

    /// Width of the per-atom translation jitter (in Angstroms)
    pub step: f64,

    /// Rejected candidates allowed before giving up (at least 1); `None` retries forever
    pub max_attempts: Option<usize>,
}

impl Default for PerturbationParams {
    fn default() -> Self {
        Self {
            min_distance: 0.5,
            max_angle: 0.79,
            step: 0.1,
            max_attempts: Some(100_000),
        }
    }
}

/// Generates candidate poses from a current pose
#[derive(Debug, Clone, Default)]
pub struct Perturber {
    pub params: PerturbationParams,
}

impl Perturber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: PerturbationParams) -> Self {
        Self { params }
    }

    /// Propose a new pose.
    ///
    /// Each attempt starts from `ligand` again: optional rigid rotation about the
    /// coordinate origin, then independent per-atom jitter. Candidates that put
    /// two atoms closer than `min_distance` are discarded.
    pub fn perturb<R: Rng + ?Sized>(
        &self,
        ligand: &Molecule,
        rotate: bool,
        rng: &mut R,
    ) -> Result<Molecule, OptimizationError> {
        let mut attempts = 0;
        loop {
            let mut candidate = if rotate {
                rotate_randomly(ligand, self.params.max_angle, rng)
            } else {
                ligand.clone()
            };
            jitter(&mut candidate, self.params.step, rng);

            if candidate.is_collision_free(self.params.min_distance) {
                return Ok(candidate);
            }

            attempts += 1;
            if let Some(max_attempts) = self.params.max_attempts {
                if attempts >= max_attempts {
                    return Err(OptimizationError::PerturbationExhausted { attempts });
                }
            }
        }
    }
}

/// Shift every coordinate of every atom independently by `(u - 0.5) * step`
pub fn jitter<R: Rng + ?Sized>(molecule: &mut Molecule, step: f64, rng: &mut R) {
    for atom in &mut molecule.atoms {
        atom.coordinates.x += (rng.gen::<f64>() - 0.5) * step;
        atom.coordinates.y += (rng.gen::<f64>() - 0.5) * step;
        atom.coordinates.z += (rng.gen::<f64>() - 0.5) * step;
    }
}

/// Rotate a copy of `molecule` about a random axis through the origin by an
/// angle uniform in `[-max_angle, max_angle]`
pub fn rotate_randomly<R: Rng + ?Sized>(molecule: &Molecule, max_angle: f64, rng: &mut R) -> Molecule {
    let axis = random_unit_axis(rng);
    let theta = (rng.gen::<f64>() * 2.0 - 1.0) * max_angle;

    let mut rotated = molecule.clone();
    for atom in &mut rotated.atoms {
        atom.coordinates = rotate_around_axis(&atom.coordinates, &axis, theta);
    }
    rotated
}
