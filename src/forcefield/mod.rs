//! Forcefield implementations for protein-ligand interactions

pub mod coulomb;

use crate::atom::Atom;
use crate::molecule::Molecule;
use thiserror::Error;

pub use coulomb::{CoulombForceField, CoulombParams};

/// Errors that can occur in forcefields
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForceFieldError {
    #[error("Invalid forcefield parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

/// Trait representing a forcefield that can calculate interaction energies
/// The Send + Sync bounds enable parallel docking with rayon
pub trait ForceField: Send + Sync {
    /// Get the name of the forcefield
    fn name(&self) -> &'static str;

    /// Calculate the interaction energy between two atoms at the given distance
    fn pair_energy(&self, atom1: &Atom, atom2: &Atom, distance: f64) -> f64;

    /// Total interaction energy between every protein atom and every ligand atom.
    ///
    /// Dense O(|protein| x |ligand|) evaluation with no cutoff.
    fn interaction_energy(&self, protein: &Molecule, ligand: &Molecule) -> f64 {
        let mut energy = 0.0;
        for protein_atom in &protein.atoms {
            for ligand_atom in &ligand.atoms {
                let distance = protein_atom.distance(ligand_atom);
                energy += self.pair_energy(protein_atom, ligand_atom, distance);
            }
        }
        energy
    }
}
