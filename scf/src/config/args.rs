//! Command-line argument parsing for SCF calculations

use clap::Parser;

/// Run a series of electronic structure methods from a YAML configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    pub config_file: String,

    /// Override output file: (default stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Methods to run, overriding the configuration (repeatable)
    #[arg(short, long)]
    pub method: Vec<String>,

    /// Worker threads for the method series (0: one per core)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Override maximum SCF iterations
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Override DIIS subspace size (0 disables DIIS)
    #[arg(long)]
    pub diis_subspace_size: Option<usize>,

    /// Override energy convergence threshold
    #[arg(long)]
    pub energy_tolerance: Option<f64>,

    /// Molecular charge (default: 0 for neutral)
    #[arg(long)]
    pub charge: Option<i32>,

    /// Spin multiplicity (2S+1, default: 1 for singlet)
    #[arg(long)]
    pub multiplicity: Option<usize>,

    /// Report the dipole moment of every resulting wavefunction
    #[arg(long)]
    pub dipole: bool,

    /// Also log debug output (integral counts, DIIS errors, energy parts)
    #[arg(short, long)]
    pub verbose: bool,
}
