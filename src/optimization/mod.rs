//! Optimization algorithms for molecular docking

pub mod batch;
pub mod metropolis;
pub mod perturbation;

use crate::forcefield::ForceField;
use crate::molecule::{Molecule, MoleculeError};
use rand::RngCore;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during optimization
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimizationError {
    #[error("No collision-free perturbation found after {attempts} attempts")]
    PerturbationExhausted { attempts: usize },

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Molecule error: {0}")]
    Molecule(#[from] MoleculeError),
}

/// Represents a docking result
#[derive(Debug, Clone, Serialize)]
pub struct DockingResult {
    /// Final energy
    pub energy: f64,

    /// Docked ligand conformation
    pub molecule: Molecule,
}

/// Trait for optimization algorithms
pub trait Optimizer {
    /// Minimize the protein-ligand interaction energy of a ligand pose
    fn optimize(
        &self,
        protein: &Molecule,
        ligand: &Molecule,
        forcefield: &dyn ForceField,
        rng: &mut dyn RngCore,
    ) -> Result<DockingResult, OptimizationError>;
}
