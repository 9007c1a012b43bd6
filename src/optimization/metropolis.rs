//! Metropolis Monte Carlo energy minimization
//!
//! A chain repeatedly perturbs the current pose and accepts the candidate with
//! the Metropolis criterion. The parallel variant splits the iteration budget
//! across independent chains that all start from the same snapshot, then runs
//! one more Metropolis test per chain outcome, in worker order, to fold them
//! back into a single pose. The fused result depends on the worker count.

use log::{debug, trace};
use rand::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::forcefield::ForceField;
use crate::molecule::Molecule;
use crate::optimization::perturbation::{PerturbationParams, Perturber};
use crate::optimization::{DockingResult, OptimizationError, Optimizer};

/// Human body temperature, in the units of the energy scale
pub const BODY_TEMPERATURE: f64 = 310.15;

/// Parameters for Metropolis minimization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetropolisParams {
    /// Total number of perturbation steps
    pub iterations: usize,

    /// Whether each step also applies a random rotation
    pub rotate: bool,

    /// Temperature parameter for Metropolis criterion
    pub temperature: f64,

    /// Number of independent chains the iteration budget is split across
    pub workers: usize,

    pub perturbation: PerturbationParams,
}

impl Default for MetropolisParams {
    fn default() -> Self {
        Self {
            iterations: 3000,
            rotate: true,
            temperature: BODY_TEMPERATURE,
            workers: 1,
            perturbation: PerturbationParams::default(),
        }
    }
}

impl MetropolisParams {
    pub fn validate(&self) -> Result<(), OptimizationError> {
        if !(self.temperature > 0.0 && self.temperature.is_finite()) {
            return Err(OptimizationError::InvalidParameter {
                name: "temperature",
                reason: format!("must be positive and finite, got {}", self.temperature),
            });
        }
        if self.workers == 0 {
            return Err(OptimizationError::InvalidParameter {
                name: "workers",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.perturbation.max_attempts == Some(0) {
            return Err(OptimizationError::InvalidParameter {
                name: "max_attempts",
                reason: "must be at least 1 when set".to_string(),
            });
        }
        if self.perturbation.min_distance < 0.0 {
            return Err(OptimizationError::InvalidParameter {
                name: "min_distance",
                reason: format!("must not be negative, got {}", self.perturbation.min_distance),
            });
        }
        Ok(())
    }
}

/// Decide whether to move from `current_energy` to `new_energy`.
///
/// Downhill moves are always accepted; uphill moves with probability
/// `exp(-(new - current) / temperature)`.
pub fn accept_move<R: Rng + ?Sized>(
    current_energy: f64,
    new_energy: f64,
    temperature: f64,
    rng: &mut R,
) -> bool {
    if new_energy < current_energy {
        return true;
    }
    let probability = (-(new_energy - current_energy) / temperature).exp();
    rng.gen::<f64>() < probability
}

/// Fold per-worker outcomes into one pose.
///
/// Starting from `start`, each outcome is put through [`accept_move`] against
/// the pose accepted so far, in worker order. The result is not necessarily the
/// lowest-energy outcome.
pub fn fuse_outcomes<R: Rng + ?Sized>(
    start: DockingResult,
    outcomes: Vec<DockingResult>,
    temperature: f64,
    rng: &mut R,
) -> DockingResult {
    let mut current = start;
    for (worker, outcome) in outcomes.into_iter().enumerate() {
        if accept_move(current.energy, outcome.energy, temperature, rng) {
            debug!(
                "Worker {} accepted: {:.6e} -> {:.6e}",
                worker, current.energy, outcome.energy
            );
            current = outcome;
        } else {
            debug!("Worker {} rejected at {:.6e}", worker, outcome.energy);
        }
    }
    current
}

/// Metropolis minimizer for a single ligand
#[derive(Debug, Clone, Default)]
pub struct Metropolis {
    pub params: MetropolisParams,
}

impl Metropolis {
    /// Create a new minimizer with default parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new minimizer with custom parameters
    pub fn with_params(params: MetropolisParams) -> Self {
        Self { params }
    }

    /// Run one chain over the full iteration budget
    pub fn minimize<R: Rng + ?Sized>(
        &self,
        protein: &Molecule,
        ligand: &Molecule,
        forcefield: &dyn ForceField,
        rng: &mut R,
    ) -> Result<DockingResult, OptimizationError> {
        self.params.validate()?;
        self.run_chain(protein, ligand, forcefield, self.params.iterations, rng)
    }

    /// Split the budget over `workers` chains and fuse their outcomes.
    ///
    /// Each worker gets `iterations / workers` steps and its own RNG seeded from
    /// `rng` before the fork, so the result is reproducible for a fixed seed and
    /// worker count.
    pub fn minimize_parallel<R: Rng + ?Sized>(
        &self,
        protein: &Molecule,
        ligand: &Molecule,
        forcefield: &dyn ForceField,
        rng: &mut R,
    ) -> Result<DockingResult, OptimizationError> {
        self.params.validate()?;

        let workers = self.params.workers;
        let chunk = self.params.iterations / workers;
        let seeds: Vec<u64> = (0..workers).map(|_| rng.gen()).collect();

        let outcomes = seeds
            .into_par_iter()
            .map(|seed| {
                let mut worker_rng = StdRng::seed_from_u64(seed);
                self.run_chain(protein, ligand, forcefield, chunk, &mut worker_rng)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let start = DockingResult {
            energy: forcefield.interaction_energy(protein, ligand),
            molecule: ligand.clone(),
        };

        Ok(fuse_outcomes(start, outcomes, self.params.temperature, rng))
    }

    fn run_chain<R: Rng + ?Sized>(
        &self,
        protein: &Molecule,
        ligand: &Molecule,
        forcefield: &dyn ForceField,
        iterations: usize,
        rng: &mut R,
    ) -> Result<DockingResult, OptimizationError> {
        let perturber = Perturber::with_params(self.params.perturbation.clone());

        let mut current_molecule = ligand.clone();
        let mut current_energy = forcefield.interaction_energy(protein, &current_molecule);
        let mut accepted = 0usize;

        for _ in 0..iterations {
            // The candidate is a fresh copy, so a rejection leaves the current pose as it was
            let candidate = perturber.perturb(&current_molecule, self.params.rotate, rng)?;
            let candidate_energy = forcefield.interaction_energy(protein, &candidate);

            if accept_move(current_energy, candidate_energy, self.params.temperature, rng) {
                current_molecule = candidate;
                current_energy = candidate_energy;
                accepted += 1;
            }
        }

        trace!(
            "Chain finished: {}/{} moves accepted, energy {:.6e}",
            accepted,
            iterations,
            current_energy
        );

        Ok(DockingResult {
            energy: current_energy,
            molecule: current_molecule,
        })
    }
}

impl Optimizer for Metropolis {
    fn optimize(
        &self,
        protein: &Molecule,
        ligand: &Molecule,
        forcefield: &dyn ForceField,
        rng: &mut dyn RngCore,
    ) -> Result<DockingResult, OptimizationError> {
        self.minimize_parallel(protein, ligand, forcefield, rng)
    }
}
