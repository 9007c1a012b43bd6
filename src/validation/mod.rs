//! Pose repositioning and RMSD self-consistency checks

use log::debug;
use rand::Rng;
use std::f64::consts::PI;

use crate::forcefield::ForceField;
use crate::math::normalize;
use crate::molecule::Molecule;
use crate::optimization::metropolis::Metropolis;
use crate::optimization::perturbation::{jitter, rotate_randomly};
use crate::optimization::OptimizationError;

/// Width of the per-atom displacement used by [`randomize_pose`] (±5 Å)
const RANDOMIZE_SPREAD: f64 = 10.0;

/// Default closest-approach threshold for [`shift_closer`] (in Angstroms)
pub const DEFAULT_SHIFT_THRESHOLD: f64 = 5.0;

/// Move a distant ligand rigidly toward the protein.
///
/// If the closest protein-ligand atom pair is farther apart than `threshold`,
/// the whole ligand is translated along the direction from its closest atom to
/// the matching protein atom so that the pair ends up exactly `threshold`
/// apart. New clashes are not checked.
pub fn shift_closer(ligand: &Molecule, protein: &Molecule, threshold: f64) -> Molecule {
    let mut shifted = ligand.clone();

    let Some(pair) = ligand.closest_atom_pair(protein) else {
        return shifted;
    };
    if pair.distance <= threshold {
        return shifted;
    }

    let direction = normalize(
        &(protein.atoms[pair.other_idx].coordinates - ligand.atoms[pair.own_idx].coordinates),
    );
    let displacement = direction * (pair.distance - threshold);
    debug!(
        "Shifting {} by {:.3} Å toward the protein",
        ligand.name,
        pair.distance - threshold
    );
    shifted.translate(&displacement);
    shifted
}

/// Scramble a pose: ±5 Å independent per-atom translation, then one
/// whole-body rotation about the origin by up to π
pub fn randomize_pose<R: Rng + ?Sized>(ligand: &Molecule, rng: &mut R) -> Molecule {
    let mut scrambled = ligand.clone();
    jitter(&mut scrambled, RANDOMIZE_SPREAD, rng);
    rotate_randomly(&scrambled, PI, rng)
}

/// Randomize `ligand`, minimize it against `protein` and report the RMSD to
/// the original pose
pub fn compare_rmsd<R: Rng + ?Sized>(
    protein: &Molecule,
    ligand: &Molecule,
    optimizer: &Metropolis,
    forcefield: &dyn ForceField,
    rng: &mut R,
) -> Result<f64, OptimizationError> {
    let reference = ligand.clone();
    let start = randomize_pose(ligand, rng);
    let simulated = optimizer.minimize_parallel(protein, &start, forcefield, rng)?;
    Ok(simulated.molecule.rmsd(&reference)?)
}

/// Arithmetic mean, `0.0` for an empty slice
pub fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Atom;
    use crate::forcefield::CoulombForceField;
    use crate::optimization::metropolis::MetropolisParams;
    use assert_approx_eq::assert_approx_eq;
    use nalgebra::Vector3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn protein() -> Molecule {
        Molecule::from_atoms(
            "prot",
            vec![
                Atom::new(Vector3::new(0.0, 0.0, 0.0), 1.0),
                Atom::new(Vector3::new(-1.0, 0.0, 0.0), -1.0),
            ],
        )
    }

    fn far_ligand() -> Molecule {
        Molecule::from_atoms(
            "lig",
            vec![
                Atom::new(Vector3::new(10.0, 0.0, 0.0), 1.0),
                Atom::new(Vector3::new(11.5, 0.0, 0.0), -1.0),
            ],
        )
    }

    #[test]
    fn test_shift_closes_gap_to_threshold() {
        let protein = protein();
        let ligand = far_ligand();
        assert_approx_eq!(ligand.closest_atom_pair(&protein).unwrap().distance, 10.0);

        let shifted = shift_closer(&ligand, &protein, 5.0);
        let pair = shifted.closest_atom_pair(&protein).unwrap();
        assert_approx_eq!(pair.distance, 5.0, 1e-9);

        // Rigid translation keeps internal geometry
        assert_approx_eq!(
            shifted.atoms[0].distance(&shifted.atoms[1]),
            ligand.atoms[0].distance(&ligand.atoms[1]),
            1e-12
        );
        assert_eq!(ligand, far_ligand());
    }

    #[test]
    fn test_shift_leaves_close_ligand_alone() {
        let shifted = shift_closer(&far_ligand(), &protein(), 12.0);
        assert_eq!(shifted, far_ligand());

        let shifted = shift_closer(&far_ligand(), &Molecule::new("empty"), 1.0);
        assert_eq!(shifted, far_ligand());
    }

    #[test]
    fn test_shift_diagonal_gap() {
        let protein = Molecule::from_atoms(
            "prot",
            vec![Atom::new(Vector3::new(1.0, 1.0, 1.0), 1.0)],
        );
        let ligand = Molecule::from_atoms(
            "lig",
            vec![Atom::new(Vector3::new(1.0 + 6.0, 1.0 + 8.0, 1.0), -1.0)],
        );

        let shifted = shift_closer(&ligand, &protein, 5.0);
        assert_approx_eq!(shifted.atoms[0].coordinates.x, 4.0, 1e-9);
        assert_approx_eq!(shifted.atoms[0].coordinates.y, 5.0, 1e-9);
        assert_approx_eq!(shifted.atoms[0].coordinates.z, 1.0, 1e-9);
    }

    #[test]
    fn test_randomize_pose_moves_atoms() {
        let mut rng = StdRng::seed_from_u64(21);
        let ligand = far_ligand();
        let scrambled = randomize_pose(&ligand, &mut rng);

        assert_eq!(scrambled.atoms.len(), ligand.atoms.len());
        assert!(scrambled.rmsd(&ligand).unwrap() > 0.0);
        for (a, b) in ligand.atoms.iter().zip(&scrambled.atoms) {
            assert_eq!(a.charge, b.charge);
        }
    }

    #[test]
    fn test_compare_rmsd_is_finite() {
        let mut rng = StdRng::seed_from_u64(4);
        let optimizer = Metropolis::with_params(MetropolisParams {
            iterations: 200,
            workers: 2,
            ..MetropolisParams::default()
        });
        let rmsd = compare_rmsd(
            &protein(),
            &far_ligand(),
            &optimizer,
            &CoulombForceField::new(),
            &mut rng,
        )
        .unwrap();
        assert!(rmsd.is_finite());
        assert!(rmsd > 0.0);
    }

    #[test]
    fn test_average() {
        assert_eq!(average(&[]), 0.0);
        assert_approx_eq!(average(&[1.0, 2.0, 6.0]), 3.0);
    }
}
