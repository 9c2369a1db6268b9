use crate::config::Config;
use ::basis::Atom;
use color_eyre::eyre::{eyre, Result};
use nalgebra::Vector3;
use periodic_table_on_an_enum::Element;
use tracing::info;

/// Build the atoms defined in the YAML configuration, converting the
/// coordinates to bohr.
pub fn build_atoms(config: &Config) -> Result<Vec<Atom>> {
    info!("Preparing geometry ({:?} input)", config.units);
    let scale = config.units.to_bohr();

    let mut atoms = Vec::with_capacity(config.geometry.len());
    for atom in &config.geometry {
        let element = Element::from_symbol(&atom.element)
            .ok_or_else(|| eyre!("Invalid element symbol: {}", atom.element))?;
        let coords = Vector3::new(atom.coords[0], atom.coords[1], atom.coords[2]) * scale;
        info!(
            "  {:>2} {:12.6} {:12.6} {:12.6}",
            element.get_symbol(),
            coords.x,
            coords.y,
            coords.z
        );
        atoms.push(Atom::new(
            element.get_symbol(),
            element.get_atomic_number() as f64,
            coords,
        ));
    }
    if atoms.is_empty() {
        return Err(eyre!("The geometry section contains no atoms"));
    }
    Ok(atoms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ANGSTROM_TO_BOHR;

    #[test]
    fn test_build_atoms_in_angstrom() {
        let yaml = r#"
geometry:
  - element: O
    coords: [0.0, 0.0, 0.0]
  - element: H
    coords: [0.0, 0.0, 1.0]
units: angstrom
"#;
        let config: Config = serde_yml::from_str(yaml).unwrap();
        let atoms = build_atoms(&config).unwrap();
        assert_eq!(atoms[0].z, 8.0);
        assert_eq!(atoms[1].symbol, "H");
        assert!((atoms[1].coords.z - ANGSTROM_TO_BOHR).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_symbol() {
        let yaml = r#"
geometry:
  - element: Xx
    coords: [0.0, 0.0, 0.0]
"#;
        let config: Config = serde_yml::from_str(yaml).unwrap();
        assert!(build_atoms(&config).is_err());
    }
}
