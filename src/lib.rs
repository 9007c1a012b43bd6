//! metropolis-dock: Metropolis Monte Carlo docking of ligands against a protein
//!
//! Ligand poses are perturbed with random jitter and rotation, scored with a
//! pairwise Coulomb energy, and accepted or rejected with the Metropolis
//! criterion. Chains and ligand batches are spread over rayon workers.

pub mod atom;
pub mod config;
pub mod forcefield;
pub mod io;
pub mod math;
pub mod molecule;
pub mod optimization;
pub mod report;
pub mod validation;

// Re-export commonly used types and functions
pub use atom::Atom;
pub use config::SimulationConfig;
pub use forcefield::{CoulombForceField, ForceField};
pub use molecule::Molecule;
pub use optimization::batch::{dock_batch, BatchResult};
pub use optimization::metropolis::{Metropolis, MetropolisParams};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
