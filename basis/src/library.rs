//! Named basis set definitions keyed by element.
//!
//! A library stores shell templates without centers; `build` places them on the
//! atoms of a geometry to produce a `BasisSet`.

use crate::basis::BasisSet;
use crate::error::{IntegralError, Result};
use crate::shell::{Shell, ShellType};
use crate::system::Atom;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellTemplate {
    pub am: i32,
    #[serde(default)]
    pub shell_type: ShellType,
    pub exponents: Vec<f64>,
    pub coefficients: Vec<Vec<f64>>,
}

impl ShellTemplate {
    pub fn place(&self, atom: &Atom) -> Result<Shell> {
        Shell::new(
            self.am,
            self.shell_type,
            atom.coords,
            self.exponents.clone(),
            self.coefficients.clone(),
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BasisLibrary {
    pub name: String,
    pub elements: HashMap<String, Vec<ShellTemplate>>,
}

const STO3G_CONTRACTION_S: [f64; 3] = [0.15432897, 0.53532814, 0.44463454];
const STO3G_CONTRACTION_2S: [f64; 3] = [-0.09996723, 0.39951283, 0.70011547];
const STO3G_CONTRACTION_2P: [f64; 3] = [0.15591627, 0.60768372, 0.39195739];

fn sto3g_s(exponents: [f64; 3]) -> ShellTemplate {
    ShellTemplate {
        am: 0,
        shell_type: ShellType::Cartesian,
        exponents: exponents.to_vec(),
        coefficients: vec![STO3G_CONTRACTION_S.to_vec()],
    }
}

fn sto3g_sp(exponents: [f64; 3]) -> ShellTemplate {
    ShellTemplate {
        am: -1,
        shell_type: ShellType::Cartesian,
        exponents: exponents.to_vec(),
        coefficients: vec![STO3G_CONTRACTION_2S.to_vec(), STO3G_CONTRACTION_2P.to_vec()],
    }
}

impl BasisLibrary {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            elements: HashMap::new(),
        }
    }

    pub fn insert(&mut self, symbol: &str, shells: Vec<ShellTemplate>) {
        self.elements.insert(symbol.to_string(), shells);
    }

    pub fn sto3g() -> Self {
        let mut lib = Self::new("sto-3g");
        lib.insert("H", vec![sto3g_s([3.42525091, 0.62391373, 0.16885540])]);
        lib.insert("He", vec![sto3g_s([6.36242139, 1.15892300, 0.31364979])]);
        lib.insert(
            "C",
            vec![
                sto3g_s([71.6168370, 13.0450960, 3.5305122]),
                sto3g_sp([2.9412494, 0.6834831, 0.2222899]),
            ],
        );
        lib.insert(
            "N",
            vec![
                sto3g_s([99.1061690, 18.0523120, 4.8856602]),
                sto3g_sp([3.7804559, 0.8784966, 0.2857144]),
            ],
        );
        lib.insert(
            "O",
            vec![
                sto3g_s([130.7093200, 23.8088610, 6.4436083]),
                sto3g_sp([5.0331513, 1.1695961, 0.3803890]),
            ],
        );
        lib
    }

    /// Look up one of the built-in libraries by name (case insensitive).
    pub fn by_name(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "sto-3g" | "sto3g" => Ok(Self::sto3g()),
            _ => Err(IntegralError::UnknownBasisSet(name.to_string())),
        }
    }

    pub fn build(&self, atoms: &[Atom]) -> Result<BasisSet> {
        let mut shells = Vec::new();
        for atom in atoms {
            let templates =
                self.elements
                    .get(&atom.symbol)
                    .ok_or_else(|| IntegralError::MissingElement {
                        basis: self.name.clone(),
                        element: atom.symbol.clone(),
                    })?;
            for template in templates {
                shells.push(template.place(atom)?);
            }
        }
        let basis = BasisSet::new(shells);
        debug!(
            "Built basis '{}': {} shells, {} functions",
            self.name,
            basis.n_shell(),
            basis.n_functions()
        );
        Ok(basis)
    }
}
