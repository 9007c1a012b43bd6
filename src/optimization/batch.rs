//! Docking a batch of ligands against one protein
//!
//! The batch is cut into `workers` contiguous slices. Each slice is handled by
//! its own task, which minimizes its ligands one after another with
//! [`Metropolis::minimize_parallel`], so there are two levels of fan-out.

use std::ops::Range;

use log::{debug, info};
use rand::prelude::*;
use rayon::prelude::*;
use serde::Serialize;

use crate::forcefield::ForceField;
use crate::molecule::Molecule;
use crate::optimization::metropolis::Metropolis;
use crate::optimization::OptimizationError;
use crate::validation::shift_closer;

/// Minimized poses and energies, index-aligned with the input batch
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchResult {
    pub ligands: Vec<Molecule>,
    pub energies: Vec<f64>,
}

impl BatchResult {
    pub fn len(&self) -> usize {
        self.ligands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ligands.is_empty()
    }

    /// Index of the lowest-energy ligand; the first one wins ties
    pub fn best(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, &energy) in self.energies.iter().enumerate() {
            if best.map_or(true, |b| energy < self.energies[b]) {
                best = Some(i);
            }
        }
        best
    }

    fn extend(&mut self, other: BatchResult) {
        self.ligands.extend(other.ligands);
        self.energies.extend(other.energies);
    }
}

/// Split `len` items into `parts` contiguous ranges; the last absorbs the remainder
pub fn partition(len: usize, parts: usize) -> Vec<Range<usize>> {
    if parts == 0 {
        return Vec::new();
    }
    let width = len / parts;
    (0..parts)
        .map(|i| {
            let start = i * width;
            let end = if i == parts - 1 { len } else { start + width };
            start..end
        })
        .collect()
}

/// Minimize every ligand in `ligands` against `protein`.
///
/// When `shift_threshold` is set, each ligand is first pulled toward the
/// protein with [`shift_closer`]. Output order matches input order.
pub fn dock_batch<R: Rng + ?Sized>(
    protein: &Molecule,
    ligands: &[Molecule],
    forcefield: &dyn ForceField,
    optimizer: &Metropolis,
    shift_threshold: Option<f64>,
    rng: &mut R,
) -> Result<BatchResult, OptimizationError> {
    optimizer.params.validate()?;

    let starts: Vec<Molecule> = match shift_threshold {
        Some(threshold) => ligands
            .iter()
            .map(|ligand| shift_closer(ligand, protein, threshold))
            .collect(),
        None => ligands.to_vec(),
    };

    let slices = partition(starts.len(), optimizer.params.workers);
    let tasks: Vec<(Range<usize>, u64)> = slices.into_iter().map(|r| (r, rng.gen())).collect();

    let parts = tasks
        .into_par_iter()
        .enumerate()
        .map(|(worker, (range, seed))| {
            let mut slice_rng = StdRng::seed_from_u64(seed);
            let mut part = BatchResult::default();
            for (offset, ligand) in starts[range.clone()].iter().enumerate() {
                let result = optimizer.minimize_parallel(protein, ligand, forcefield, &mut slice_rng)?;
                debug!(
                    "Worker {} minimized ligand {} ({}): {:.6e}",
                    worker,
                    range.start + offset,
                    ligand.name,
                    result.energy
                );
                part.ligands.push(result.molecule);
                part.energies.push(result.energy);
            }
            Ok::<_, OptimizationError>(part)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut batch = BatchResult::default();
    for part in parts {
        batch.extend(part);
    }

    if let Some(best) = batch.best() {
        info!(
            "Docked {} ligands; best is #{} ({}) at {:.6e}",
            batch.len(),
            best,
            batch.ligands[best].name,
            batch.energies[best]
        );
    }

    Ok(batch)
}
