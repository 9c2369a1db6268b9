use crate::error::{Result, ScfError};
use crate::wavefunction::Wavefunction;

/// Result of an energy method: the wavefunction it produced and the energy
/// derivative of the requested order, flattened row-major over
/// (atom, component) indices. Order 0 holds the energy alone.
#[derive(Debug, Clone)]
pub struct DerivReturn {
    pub wavefunction: Wavefunction,
    pub values: Vec<f64>,
}

impl DerivReturn {
    pub fn energy(wavefunction: Wavefunction, energy: f64) -> Self {
        Self {
            wavefunction,
            values: vec![energy],
        }
    }
}

/// A method that computes the energy, or one of its derivatives, of the
/// system held by a wavefunction.
pub trait EnergyMethod: Send {
    fn deriv(&mut self, order: usize, wfn: &Wavefunction) -> Result<DerivReturn>;

    fn energy(&mut self, wfn: &Wavefunction) -> Result<f64> {
        let result = self.deriv(0, wfn)?;
        result.values.first().copied().ok_or(ScfError::InconsistentResult {
            calculated: 0,
            expected: 1,
        })
    }
}
