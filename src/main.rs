//! Main executable for metropolis-dock

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::{Path, PathBuf};

use metropolis_dock::forcefield::{CoulombForceField, ForceField};
use metropolis_dock::io::{
    extract_file_label, find_files_with_substring, parse_mol2, parse_pdb, update_mol2_coordinates,
};
use metropolis_dock::molecule::Molecule;
use metropolis_dock::optimization::batch::dock_batch;
use metropolis_dock::optimization::metropolis::Metropolis;
use metropolis_dock::report::{
    write_label_mapping, write_summary_json, write_values_csv, LigandSummary, RunSummary,
};
use metropolis_dock::validation::{average, compare_rmsd};
use metropolis_dock::SimulationConfig;

/// Command-line arguments for the application
#[derive(Parser, Debug)]
#[clap(
    name = "mcdock",
    version = metropolis_dock::VERSION,
    about = "Metropolis Monte Carlo docking of ligands against a protein"
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

/// Simulation settings shared by the subcommands that run a minimization
#[derive(Args, Debug)]
struct SimulationArgs {
    /// JSON configuration file
    #[clap(long, short, value_parser)]
    config: Option<PathBuf>,

    /// Number of Metropolis iterations per ligand
    #[clap(long)]
    iterations: Option<usize>,

    /// Number of parallel workers (defaults to the number of threads)
    #[clap(long)]
    workers: Option<usize>,

    /// Temperature for the Metropolis criterion
    #[clap(long)]
    temperature: Option<f64>,

    /// Disable random rotations; only jitter atom positions
    #[clap(long)]
    no_rotate: bool,

    /// Seed for reproducible runs
    #[clap(long)]
    seed: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Dock one or more ligands to a protein and rank them by energy
    Dock {
        /// MOL2 or PDB file containing the protein
        #[clap(long, value_parser)]
        protein: PathBuf,

        /// MOL2 or PDB files containing the ligands to dock
        #[clap(long, value_parser, required = true)]
        ligand: Vec<PathBuf>,

        /// Output directory for reports and the best pose
        #[clap(long, short, value_parser, default_value = "output")]
        out: PathBuf,

        #[clap(flatten)]
        sim: SimulationArgs,
    },

    /// Score an existing pose
    Score {
        /// MOL2 or PDB file containing the protein
        #[clap(long, value_parser)]
        protein: PathBuf,

        /// MOL2 or PDB file containing the ligand pose to score
        #[clap(long, value_parser)]
        ligand: PathBuf,

        /// JSON configuration file
        #[clap(long, short, value_parser)]
        config: Option<PathBuf>,
    },

    /// Randomize known poses, re-minimize them and report RMSD to the originals
    Rmsd {
        /// Directory with <label>_protein.mol2 / <label>_ligand.mol2 pairs
        #[clap(long, value_parser)]
        dir: PathBuf,

        /// Only use the first N proteins
        #[clap(long)]
        limit: Option<usize>,

        /// Output directory for the RMSD table
        #[clap(long, short, value_parser, default_value = "output")]
        out: PathBuf,

        #[clap(flatten)]
        sim: SimulationArgs,
    },
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::init();

    // Parse command-line arguments
    let cli = Cli::parse();

    match cli.command {
        Commands::Dock {
            protein,
            ligand,
            out,
            sim,
        } => run_dock(&protein, &ligand, &out, &sim),
        Commands::Score {
            protein,
            ligand,
            config,
        } => run_score(&protein, &ligand, config.as_deref()),
        Commands::Rmsd {
            dir,
            limit,
            out,
            sim,
        } => run_rmsd(&dir, limit, &out, &sim),
    }
}

fn run_dock(protein_path: &Path, ligand_paths: &[PathBuf], out: &Path, sim: &SimulationArgs) -> Result<()> {
    let config = load_config(sim)?;
    let forcefield = CoulombForceField::with_params(config.coulomb_params())?;
    let optimizer = Metropolis::with_params(config.metropolis_params());
    let mut rng = make_rng(config.seed);

    info!("Loading protein: {}", protein_path.display());
    let protein = load_molecule(protein_path)?;

    let ligands = ligand_paths
        .iter()
        .map(|path| {
            info!("Loading ligand: {}", path.display());
            load_molecule(path)
        })
        .collect::<Result<Vec<_>>>()?;

    info!(
        "Docking {} ligands with {} iterations on {} workers",
        ligands.len(),
        optimizer.params.iterations,
        optimizer.params.workers
    );
    let start = std::time::Instant::now();
    let batch = dock_batch(
        &protein,
        &ligands,
        &forcefield,
        &optimizer,
        config.shift_threshold,
        &mut rng,
    )?;
    info!("Simulation took {:.2?}", start.elapsed());

    fs::create_dir_all(out)
        .with_context(|| format!("Failed to create output directory: {}", out.display()))?;

    let labels: Vec<String> = ligand_paths.iter().map(extract_file_label).collect();
    write_values_csv(&labels, &batch.energies, "BindingEnergy", out.join("energies.csv"))?;
    write_label_mapping(&labels, out.join("labels.csv"))?;

    let best = batch.best();
    let summary = RunSummary {
        protein: protein.name.clone(),
        forcefield: forcefield.name().to_string(),
        iterations: optimizer.params.iterations,
        workers: optimizer.params.workers,
        temperature: optimizer.params.temperature,
        ligands: labels
            .iter()
            .zip(&batch.energies)
            .map(|(label, &energy)| LigandSummary {
                label: label.clone(),
                energy,
            })
            .collect(),
        best: best.map(|i| LigandSummary {
            label: labels[i].clone(),
            energy: batch.energies[i],
        }),
    };
    write_summary_json(&summary, out.join("summary.json"))?;

    for (label, energy) in labels.iter().zip(&batch.energies) {
        println!("{}\t{:.6e}", label, energy);
    }

    if let Some(i) = best {
        let source = &ligand_paths[i];
        if is_mol2(source) {
            let file_name = source
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("ligand.mol2");
            let target = out.join(format!("minLigand_{}", file_name));
            update_mol2_coordinates(source, &target, &batch.ligands[i]).with_context(|| {
                format!("Failed to write best pose to {}", target.display())
            })?;
            info!("Best ligand {} written to {}", labels[i], target.display());
        } else {
            warn!(
                "Best ligand {} is not a MOL2 file; skipping pose export",
                source.display()
            );
        }
    }

    Ok(())
}

fn run_score(protein_path: &Path, ligand_path: &Path, config: Option<&Path>) -> Result<()> {
    let config = match config {
        Some(path) => SimulationConfig::from_file(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    let forcefield = CoulombForceField::with_params(config.coulomb_params())?;

    let protein = load_molecule(protein_path)?;
    let ligand = load_molecule(ligand_path)?;

    let energy = forcefield.interaction_energy(&protein, &ligand);
    info!("Using {} scoring function", forcefield.name());
    println!("{:.6e}", energy);

    Ok(())
}

fn run_rmsd(dir: &Path, limit: Option<usize>, out: &Path, sim: &SimulationArgs) -> Result<()> {
    let config = load_config(sim)?;
    let forcefield = CoulombForceField::with_params(config.coulomb_params())?;
    let optimizer = Metropolis::with_params(config.metropolis_params());
    let mut rng = make_rng(config.seed);

    let mut protein_files = find_files_with_substring(dir, "protein")
        .with_context(|| format!("Failed to scan directory: {}", dir.display()))?;
    if let Some(limit) = limit {
        protein_files.truncate(limit);
    }

    let mut labels = Vec::with_capacity(protein_files.len());
    let mut rmsds = Vec::with_capacity(protein_files.len());

    for protein_path in &protein_files {
        let label = extract_file_label(protein_path);
        let ligand_path = protein_path.with_file_name(format!("{}_ligand.mol2", label));

        let protein = load_molecule(protein_path)?;
        let ligand = load_molecule(&ligand_path)?;

        let rmsd = compare_rmsd(&protein, &ligand, &optimizer, &forcefield, &mut rng)
            .with_context(|| format!("RMSD benchmark failed for {}", label))?;
        info!("{}: RMSD {:.3} Å", label, rmsd);

        labels.push(label);
        rmsds.push(rmsd);
    }

    info!("Average RMSD over {} proteins: {:.3} Å", rmsds.len(), average(&rmsds));

    fs::create_dir_all(out)
        .with_context(|| format!("Failed to create output directory: {}", out.display()))?;
    write_values_csv(&labels, &rmsds, "RMSD", out.join("rmsd.csv"))?;
    write_label_mapping(&labels, out.join("rmsd_labels.csv"))?;

    Ok(())
}

/// Build the run configuration: file (if any), then command-line overrides
fn load_config(sim: &SimulationArgs) -> Result<SimulationConfig> {
    let mut config = match &sim.config {
        Some(path) => SimulationConfig::from_file(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?,
        None => SimulationConfig::default(),
    };

    if let Some(iterations) = sim.iterations {
        config.iterations = iterations;
    }
    if let Some(workers) = sim.workers {
        config.workers = Some(workers);
    }
    if let Some(temperature) = sim.temperature {
        config.temperature = temperature;
    }
    if sim.no_rotate {
        config.rotate = false;
    }
    if let Some(seed) = sim.seed {
        config.seed = Some(seed);
    }

    Ok(config)
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn is_mol2(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case("mol2"))
}

fn load_molecule(path: &Path) -> Result<Molecule> {
    let molecule = if is_mol2(path) {
        parse_mol2(path)
    } else {
        parse_pdb(path)
    }
    .with_context(|| format!("Failed to parse structure file: {}", path.display()))?;

    if molecule.is_empty() {
        warn!("No atoms found in {}", path.display());
    }
    Ok(molecule)
}
