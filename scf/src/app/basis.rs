use crate::config::Config;
use ::basis::{Atom, BasisLibrary, BasisSet};
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;

const DEFAULT_BASIS: &str = "sto-3g";

/// The library the configuration asks for: custom shells when given,
/// otherwise a built-in library by name.
pub fn select_library(config: &Config) -> Result<BasisLibrary> {
    if let Some(custom) = &config.custom_basis {
        info!("Using custom basis for {} element(s)", custom.len());
        let mut library = BasisLibrary::new("custom");
        for (symbol, shells) in custom {
            library.insert(symbol, shells.clone());
        }
        return Ok(library);
    }
    let name = config.basis_set.as_deref().unwrap_or(DEFAULT_BASIS);
    info!("Using basis set {}", name);
    BasisLibrary::by_name(name).wrap_err("Failed to select basis set")
}

pub fn build_basis(config: &Config, atoms: &[Atom]) -> Result<BasisSet> {
    let library = select_library(config)?;
    let basis = library
        .build(atoms)
        .wrap_err_with(|| format!("Failed to build the '{}' basis", library.name))?;
    info!(
        "Basis: {} shells, {} functions",
        basis.n_shell(),
        basis.n_functions()
    );
    Ok(basis)
}
