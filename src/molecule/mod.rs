//! Molecule representation and related functionality

use crate::atom::Atom;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when working with molecules
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MoleculeError {
    #[error("Atom count mismatch: {left} vs {right}")]
    AtomCountMismatch { left: usize, right: usize },

    #[error("No atoms in molecule")]
    EmptyMolecule,
}

/// Closest inter-molecular atom pair found by [`Molecule::closest_atom_pair`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestPair {
    pub distance: f64,
    /// Index into the molecule the search was called on
    pub own_idx: usize,
    /// Index into the other molecule
    pub other_idx: usize,
}

/// Represents a molecule (ligand or protein).
///
/// Atom order is significant: RMSD and coordinate write-back both pair atoms
/// by index. `Clone` produces a fully independent copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Molecule {
    /// Name of the molecule
    pub name: String,

    /// List of atoms in the molecule
    pub atoms: Vec<Atom>,
}

impl Molecule {
    /// Create a new empty molecule
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            atoms: Vec::new(),
        }
    }

    /// Create a molecule from a list of atoms
    pub fn from_atoms(name: &str, atoms: Vec<Atom>) -> Self {
        Self {
            name: name.to_string(),
            atoms,
        }
    }

    /// Add an atom to the molecule
    pub fn add_atom(&mut self, atom: Atom) -> usize {
        let idx = self.atoms.len();
        self.atoms.push(atom);
        idx
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Rigidly translate every atom by the same displacement
    pub fn translate(&mut self, displacement: &Vector3<f64>) {
        for atom in &mut self.atoms {
            atom.coordinates += displacement;
        }
    }

    /// True iff every unordered atom pair is at least `min_distance` apart
    pub fn is_collision_free(&self, min_distance: f64) -> bool {
        for (i, a) in self.atoms.iter().enumerate() {
            for b in &self.atoms[i + 1..] {
                if a.distance(b) < min_distance {
                    return false;
                }
            }
        }
        true
    }

    /// Root-mean-square deviation between index-corresponding atoms.
    ///
    /// No superposition is performed; this is a direct, order-dependent comparison.
    pub fn rmsd(&self, other: &Molecule) -> Result<f64, MoleculeError> {
        if self.atoms.len() != other.atoms.len() {
            return Err(MoleculeError::AtomCountMismatch {
                left: self.atoms.len(),
                right: other.atoms.len(),
            });
        }
        if self.atoms.is_empty() {
            return Err(MoleculeError::EmptyMolecule);
        }

        let sum_sq: f64 = self
            .atoms
            .iter()
            .zip(&other.atoms)
            .map(|(a, b)| (a.coordinates - b.coordinates).norm_squared())
            .sum();

        Ok((sum_sq / self.atoms.len() as f64).sqrt())
    }

    /// Find the closest atom pair between this molecule and `other` (full scan).
    ///
    /// Returns `None` if either molecule has no atoms. Ties keep the first pair found.
    pub fn closest_atom_pair(&self, other: &Molecule) -> Option<ClosestPair> {
        let mut closest: Option<ClosestPair> = None;

        for (own_idx, own) in self.atoms.iter().enumerate() {
            for (other_idx, theirs) in other.atoms.iter().enumerate() {
                let distance = own.distance(theirs);
                if closest.map_or(true, |c| distance < c.distance) {
                    closest = Some(ClosestPair {
                        distance,
                        own_idx,
                        other_idx,
                    });
                }
            }
        }

        closest
    }
}
