use crate::basis::BasisSet;
use crate::error::{IntegralError, Result};
use nalgebra::Vector3;
use periodic_table_on_an_enum::Element;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// A nucleus: symbol, charge and position in bohr.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub symbol: String,
    pub z: f64,
    pub coords: Vector3<f64>,
}

impl Atom {
    pub fn new(symbol: &str, z: f64, coords: Vector3<f64>) -> Self {
        Self {
            symbol: symbol.to_string(),
            z,
            coords,
        }
    }

    /// Nuclear charge taken from the periodic table.
    pub fn from_symbol(symbol: &str, coords: Vector3<f64>) -> Result<Self> {
        let element = Element::from_symbol(symbol)
            .ok_or_else(|| IntegralError::UnknownElement(symbol.to_string()))?;
        Ok(Self {
            symbol: element.get_symbol().to_string(),
            z: element.get_atomic_number() as f64,
            coords,
        })
    }

    pub fn distance(&self, other: &Atom) -> f64 {
        (self.coords - other.coords).norm()
    }
}

/// A molecular system: nuclei, total charge, multiplicity and the basis sets
/// attached to it under string tags (e.g. "primary").
#[derive(Debug, Clone, Default)]
pub struct System {
    atoms: Vec<Atom>,
    charge: f64,
    multiplicity: usize,
    basis_sets: HashMap<String, Arc<BasisSet>>,
}

impl System {
    pub fn new(atoms: Vec<Atom>) -> Self {
        Self {
            atoms,
            charge: 0.0,
            multiplicity: 1,
            basis_sets: HashMap::new(),
        }
    }

    pub fn with_charge(mut self, charge: f64) -> Self {
        self.charge = charge;
        self
    }

    pub fn with_multiplicity(mut self, multiplicity: usize) -> Self {
        self.multiplicity = multiplicity;
        self
    }

    pub fn with_basis_set(mut self, tag: &str, basis: BasisSet) -> Self {
        self.basis_sets.insert(tag.to_string(), Arc::new(basis));
        self
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn n_atoms(&self) -> usize {
        self.atoms.len()
    }

    pub fn charge(&self) -> f64 {
        self.charge
    }

    pub fn multiplicity(&self) -> usize {
        self.multiplicity
    }

    /// Sum of nuclear charges minus the total charge. May be fractional when
    /// atoms carry non-integer charges.
    pub fn n_electrons(&self) -> f64 {
        self.atoms.iter().map(|a| a.z).sum::<f64>() - self.charge
    }

    pub fn basis_set(&self, tag: &str) -> Result<Arc<BasisSet>> {
        self.basis_sets
            .get(tag)
            .cloned()
            .ok_or_else(|| IntegralError::UnknownBasisSet(tag.to_string()))
    }

    pub fn basis_set_tags(&self) -> impl Iterator<Item = &str> {
        self.basis_sets.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atom_from_symbol() {
        let o = Atom::from_symbol("O", Vector3::zeros()).unwrap();
        assert_eq!(o.z, 8.0);
        assert_eq!(o.symbol, "O");
        assert!(Atom::from_symbol("Xx", Vector3::zeros()).is_err());
    }

    #[test]
    fn test_electron_count() {
        let atoms = vec![
            Atom::new("H", 1.0, Vector3::zeros()),
            Atom::new("H", 1.0, Vector3::new(0.0, 0.0, 1.4)),
        ];
        let system = System::new(atoms).with_charge(1.0).with_multiplicity(2);
        assert_eq!(system.n_electrons(), 1.0);
        assert_eq!(system.multiplicity(), 2);
        assert!(system.basis_set("primary").is_err());
    }
}
