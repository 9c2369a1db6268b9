//! Configuration management for SCF calculations
//!
//! This module handles the YAML input structures, their defaults, and the
//! resolved options handed to every module created from the registry.

mod args;

pub use args::Args;

use basis::ShellTemplate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Main configuration structure read from YAML
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub geometry: Vec<Atom>,
    #[serde(default)]
    pub units: Units,
    pub charge: Option<i32>,
    pub multiplicity: Option<usize>,
    /// Name of a built-in basis set library
    pub basis_set: Option<String>,
    /// Per-element shells, used instead of the named library when present
    pub custom_basis: Option<HashMap<String, Vec<ShellTemplate>>>,
    #[serde(default)]
    pub methods: Vec<MethodEntry>,
    #[serde(default)]
    pub scf_params: ScfParams,
    #[serde(default)]
    pub modules: ModuleKeys,
    pub threads: Option<usize>,
    #[serde(default)]
    pub properties: PropertyParams,
}

/// Atomic position configuration
#[derive(Debug, Deserialize, Serialize)]
pub struct Atom {
    pub element: String,
    pub coords: [f64; 3],
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Bohr,
    Angstrom,
}

pub const ANGSTROM_TO_BOHR: f64 = 1.8897261254578281;

impl Units {
    pub fn to_bohr(self) -> f64 {
        match self {
            Units::Bohr => 1.0,
            Units::Angstrom => ANGSTROM_TO_BOHR,
        }
    }
}

/// One entry of the method series: a registry key and its weight in the
/// combined result.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MethodEntry {
    pub key: String,
    #[serde(default = "unit_coefficient")]
    pub coefficient: f64,
}

fn unit_coefficient() -> f64 {
    1.0
}

/// SCF-specific parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScfParams {
    pub max_iterations: Option<usize>,
    pub energy_tolerance: Option<f64>,
    pub density_tolerance: Option<f64>,
    pub diis_subspace_size: Option<usize>,
}

impl Default for ScfParams {
    fn default() -> Self {
        ScfParams {
            max_iterations: Some(100),
            energy_tolerance: Some(1e-8),
            density_tolerance: Some(1e-6),
            diis_subspace_size: Some(8),
        }
    }
}

impl ScfParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.max_iterations.is_none() {
            self.max_iterations = defaults.max_iterations;
        }
        if self.energy_tolerance.is_none() {
            self.energy_tolerance = defaults.energy_tolerance;
        }
        if self.density_tolerance.is_none() {
            self.density_tolerance = defaults.density_tolerance;
        }
        if self.diis_subspace_size.is_none() {
            self.diis_subspace_size = defaults.diis_subspace_size;
        }
        self
    }
}

/// Registry keys of the modules a method creates internally
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModuleKeys {
    pub key_ao_overlap: Option<String>,
    pub key_ao_corebuild: Option<String>,
    pub key_ao_eri: Option<String>,
    pub key_nuc_repulsion: Option<String>,
    pub key_nuc_dipole: Option<String>,
    pub key_initial_guess: Option<String>,
    pub key_fock_build: Option<String>,
}

impl Default for ModuleKeys {
    fn default() -> Self {
        ModuleKeys {
            key_ao_overlap: Some("OSOverlap".to_string()),
            key_ao_corebuild: Some("CoreHamiltonian".to_string()),
            key_ao_eri: Some("ReferenceERI".to_string()),
            key_nuc_repulsion: Some("NuclearRepulsion".to_string()),
            key_nuc_dipole: Some("NuclearDipole".to_string()),
            key_initial_guess: Some("CoreGuess".to_string()),
            key_fock_build: Some("BasicFockBuild".to_string()),
        }
    }
}

impl ModuleKeys {
    /// Apply default values to any missing keys
    pub fn with_defaults(self) -> Self {
        let defaults = Self::default();
        ModuleKeys {
            key_ao_overlap: self.key_ao_overlap.or(defaults.key_ao_overlap),
            key_ao_corebuild: self.key_ao_corebuild.or(defaults.key_ao_corebuild),
            key_ao_eri: self.key_ao_eri.or(defaults.key_ao_eri),
            key_nuc_repulsion: self.key_nuc_repulsion.or(defaults.key_nuc_repulsion),
            key_nuc_dipole: self.key_nuc_dipole.or(defaults.key_nuc_dipole),
            key_initial_guess: self.key_initial_guess.or(defaults.key_initial_guess),
            key_fock_build: self.key_fock_build.or(defaults.key_fock_build),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PropertyParams {
    pub dipole: Option<bool>,
}

impl Config {
    /// Apply default values to every optional section
    pub fn with_defaults(mut self) -> Self {
        self.scf_params = self.scf_params.with_defaults();
        self.modules = self.modules.with_defaults();
        if self.methods.is_empty() {
            self.methods.push(MethodEntry {
                key: "SCF".to_string(),
                coefficient: 1.0,
            });
        }
        self
    }

    pub fn module_options(&self) -> ModuleOptions {
        let scf = self.scf_params.clone().with_defaults();
        let keys = self.modules.clone().with_defaults();
        let defaults = ModuleOptions::default();
        ModuleOptions {
            basis_set: defaults.basis_set,
            key_ao_overlap: keys.key_ao_overlap.unwrap_or(defaults.key_ao_overlap),
            key_ao_corebuild: keys.key_ao_corebuild.unwrap_or(defaults.key_ao_corebuild),
            key_ao_eri: keys.key_ao_eri.unwrap_or(defaults.key_ao_eri),
            key_nuc_repulsion: keys.key_nuc_repulsion.unwrap_or(defaults.key_nuc_repulsion),
            key_nuc_dipole: keys.key_nuc_dipole.unwrap_or(defaults.key_nuc_dipole),
            key_initial_guess: keys.key_initial_guess.unwrap_or(defaults.key_initial_guess),
            key_fock_build: keys.key_fock_build.unwrap_or(defaults.key_fock_build),
            max_iterations: scf.max_iterations.unwrap_or(defaults.max_iterations),
            energy_tolerance: scf.energy_tolerance.unwrap_or(defaults.energy_tolerance),
            density_tolerance: scf.density_tolerance.unwrap_or(defaults.density_tolerance),
            diis_subspace_size: scf.diis_subspace_size.unwrap_or(defaults.diis_subspace_size),
        }
    }
}

/// Fully resolved options shared by the modules of one calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleOptions {
    /// Tag of the basis set on the system that methods work in
    pub basis_set: String,
    pub key_ao_overlap: String,
    pub key_ao_corebuild: String,
    pub key_ao_eri: String,
    pub key_nuc_repulsion: String,
    pub key_nuc_dipole: String,
    pub key_initial_guess: String,
    pub key_fock_build: String,
    pub max_iterations: usize,
    pub energy_tolerance: f64,
    pub density_tolerance: f64,
    pub diis_subspace_size: usize,
}

impl Default for ModuleOptions {
    fn default() -> Self {
        ModuleOptions {
            basis_set: "primary".to_string(),
            key_ao_overlap: "OSOverlap".to_string(),
            key_ao_corebuild: "CoreHamiltonian".to_string(),
            key_ao_eri: "ReferenceERI".to_string(),
            key_nuc_repulsion: "NuclearRepulsion".to_string(),
            key_nuc_dipole: "NuclearDipole".to_string(),
            key_initial_guess: "CoreGuess".to_string(),
            key_fock_build: "BasicFockBuild".to_string(),
            max_iterations: 100,
            energy_tolerance: 1e-8,
            density_tolerance: 1e-6,
            diis_subspace_size: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let yaml = r#"
geometry:
  - element: H
    coords: [0.0, 0.0, 0.0]
  - element: H
    coords: [0.0, 0.0, 0.74]
units: angstrom
basis_set: sto-3g
scf_params:
  max_iterations: 20
modules:
  key_initial_guess: CoreGuess
"#;
        let config = serde_yml::from_str::<Config>(yaml).unwrap().with_defaults();
        assert_eq!(config.geometry.len(), 2);
        assert_eq!(config.units, Units::Angstrom);
        assert_eq!(config.methods.len(), 1);
        assert_eq!(config.methods[0].key, "SCF");

        let options = config.module_options();
        assert_eq!(options.max_iterations, 20);
        assert_eq!(options.diis_subspace_size, 8);
        assert_eq!(options.key_ao_eri, "ReferenceERI");
    }

    #[test]
    fn test_parse_methods_and_custom_basis() {
        let yaml = r#"
geometry:
  - element: He
    coords: [0.0, 0.0, 0.0]
custom_basis:
  He:
    - am: 0
      exponents: [1.0]
      coefficients: [[1.0]]
methods:
  - key: CoreGuess
  - key: SCF
    coefficient: -1.0
"#;
        let config = serde_yml::from_str::<Config>(yaml).unwrap().with_defaults();
        assert_eq!(config.methods[0].coefficient, 1.0);
        assert_eq!(config.methods[1].coefficient, -1.0);
        let custom = config.custom_basis.unwrap();
        assert_eq!(custom["He"][0].am, 0);
    }
}
