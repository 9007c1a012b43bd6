use criterion::{black_box, criterion_group, criterion_main, Criterion};
use metropolis_dock::forcefield::CoulombForceField;
use metropolis_dock::io::parse_mol2;
use metropolis_dock::optimization::metropolis::{Metropolis, MetropolisParams};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

fn test_data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("test_data")
}

fn bench_metropolis(c: &mut Criterion) {
    let protein = parse_mol2(test_data_dir().join("1abc_protein.mol2")).unwrap();
    let ligand = parse_mol2(test_data_dir().join("1abc_ligand.mol2")).unwrap();
    let forcefield = CoulombForceField::new();

    let single = Metropolis::with_params(MetropolisParams {
        iterations: 200,
        workers: 1,
        ..MetropolisParams::default()
    });
    let parallel = Metropolis::with_params(MetropolisParams {
        iterations: 200,
        workers: 4,
        ..MetropolisParams::default()
    });

    c.bench_function("metropolis_chain", |b| {
        let mut rng = StdRng::seed_from_u64(42);
        b.iter(|| {
            let result = single.minimize(&protein, &ligand, &forcefield, &mut rng);
            let _ = black_box(result);
        })
    });

    c.bench_function("metropolis_parallel", |b| {
        let mut rng = StdRng::seed_from_u64(42);
        b.iter(|| {
            let result = parallel.minimize_parallel(&protein, &ligand, &forcefield, &mut rng);
            let _ = black_box(result);
        })
    });
}

criterion_group!(optimization_benches, bench_metropolis);
criterion_main!(optimization_benches);
