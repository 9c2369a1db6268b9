//! The `scf` command-line application: read a configuration, run the
//! configured method series and report the results.

mod basis;
mod geometry;
mod report;

pub use self::basis::{build_basis, select_library};
pub use geometry::build_atoms;

use self::report::{report_dipole, report_orbitals, report_series};
use crate::config::{Args, Config, ModuleOptions};
use crate::io::{setup_output, write_series_table, SeriesEntry};
use crate::property::dipole_moment;
use crate::registry::{ModuleContext, ModuleRegistry};
use crate::series::{run_series_of_methods, weighted_sum};
use crate::wavefunction::Wavefunction;
use ::basis::System;
use clap::Parser;
use color_eyre::eyre::{eyre, Result, WrapErr};
use std::fs;
use std::sync::Arc;
use tracing::info;

pub struct ScfApplication {
    args: Args,
    config: Config,
}

impl ScfApplication {
    pub fn from_cli() -> Result<Self> {
        let args = Args::parse();
        let config = load_config(&args)?;
        Ok(Self { args, config })
    }

    pub fn run(self) -> Result<()> {
        setup_output(self.args.output.as_ref(), self.args.verbose)?;
        info!("Configuration read from: {}", self.args.config_file);

        let options = self.module_options();
        let system = self.build_system(&options)?;
        info!(
            "System: {} atoms, {} electrons, multiplicity {}",
            system.n_atoms(),
            system.n_electrons(),
            system.multiplicity()
        );

        let ctx = ModuleContext::new(Arc::new(ModuleRegistry::with_defaults()), options);
        let (keys, coefficients) = self.method_series();
        for key in &keys {
            if !ctx.registry().has_method(key) {
                return Err(eyre!(
                    "Unknown method '{}', available: {}",
                    key,
                    ctx.registry().method_keys().join(", ")
                ));
            }
        }

        let threads = self.args.threads.or(self.config.threads).unwrap_or(0);
        let wfns = [Wavefunction::from_system(system)];
        let results = run_series_of_methods(&ctx, &keys, &wfns, &coefficients, 0, threads)
            .wrap_err("Method series failed")?;
        let total = weighted_sum(&results, &coefficients)?
            .first()
            .copied()
            .unwrap_or(0.0);

        let mut entries = Vec::with_capacity(results.len());
        for ((key, c), result) in keys.iter().zip(&coefficients).zip(&results) {
            report_orbitals(key, &result.wavefunction);
            entries.push(SeriesEntry {
                key: key.clone(),
                coefficient: *c,
                energy: result.values.first().copied().unwrap_or(0.0),
            });
        }
        report_series(&entries, total);

        let dipole = self.args.dipole || self.config.properties.dipole.unwrap_or(false);
        if dipole {
            for (key, result) in keys.iter().zip(&results) {
                let mu = dipole_moment(&ctx, &result.wavefunction)
                    .wrap_err_with(|| format!("Dipole moment of '{}' failed", key))?;
                report_dipole(key, &mu);
            }
        }

        // logs went to the file, keep the summary on the terminal
        if self.args.output.is_some() {
            write_series_table(&mut std::io::stdout(), &entries, total)?;
        }
        Ok(())
    }

    /// Options from the configuration with command-line overrides applied.
    fn module_options(&self) -> ModuleOptions {
        let mut options = self.config.module_options();
        if let Some(n) = self.args.max_iterations {
            info!("Overriding max_iterations with: {}", n);
            options.max_iterations = n;
        }
        if let Some(n) = self.args.diis_subspace_size {
            info!("Overriding diis_subspace_size with: {}", n);
            options.diis_subspace_size = n;
        }
        if let Some(tol) = self.args.energy_tolerance {
            info!("Overriding energy_tolerance with: {:e}", tol);
            options.energy_tolerance = tol;
        }
        options
    }

    fn build_system(&self, options: &ModuleOptions) -> Result<System> {
        let atoms = build_atoms(&self.config)?;
        let basis = build_basis(&self.config, &atoms)?;
        let charge = self.args.charge.or(self.config.charge).unwrap_or(0);
        let multiplicity = self.args.multiplicity.or(self.config.multiplicity).unwrap_or(1);
        Ok(System::new(atoms)
            .with_charge(charge as f64)
            .with_multiplicity(multiplicity)
            .with_basis_set(&options.basis_set, basis))
    }

    /// Method keys and coefficients; methods named on the command line
    /// replace the configured series with unit weights.
    fn method_series(&self) -> (Vec<String>, Vec<f64>) {
        if !self.args.method.is_empty() {
            let keys = self.args.method.clone();
            let coefficients = vec![1.0; keys.len()];
            return (keys, coefficients);
        }
        self.config
            .methods
            .iter()
            .map(|m| (m.key.clone(), m.coefficient))
            .unzip()
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let config_content = fs::read_to_string(&args.config_file)
        .wrap_err_with(|| format!("Unable to read configuration file: {}", args.config_file))?;

    let config = serde_yml::from_str::<Config>(&config_content)
        .wrap_err("Failed to parse configuration file")?
        .with_defaults();

    Ok(config)
}
