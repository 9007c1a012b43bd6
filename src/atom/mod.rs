//! Atom representation and related functionality

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a charged point in 3D space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// 3D coordinates (in Angstroms)
    pub coordinates: Vector3<f64>,

    /// Partial charge
    pub charge: f64,
}

impl Atom {
    /// Create a new atom
    pub fn new(coordinates: Vector3<f64>, charge: f64) -> Self {
        Self { coordinates, charge }
    }

    /// Calculate distance to another atom
    pub fn distance(&self, other: &Atom) -> f64 {
        (self.coordinates - other.coordinates).norm()
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}) [{}]",
            self.coordinates.x, self.coordinates.y, self.coordinates.z, self.charge
        )
    }
}
