use super::{check_deriv, NuclearAttraction, OneElectronIntegral, OsKineticEnergy};
use crate::basis::BasisSet;
use crate::error::Result;
use crate::system::System;
use std::sync::Arc;

/// Kinetic energy plus nuclear attraction.
#[derive(Debug, Clone, Default)]
pub struct CoreHamiltonian {
    kinetic: OsKineticEnergy,
    nuclear: NuclearAttraction,
    scratch: Vec<f64>,
}

impl CoreHamiltonian {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OneElectronIntegral for CoreHamiltonian {
    fn initialize(
        &mut self,
        deriv: u32,
        system: &System,
        bs1: Arc<BasisSet>,
        bs2: Arc<BasisSet>,
    ) -> Result<()> {
        check_deriv(deriv, "CoreHamiltonian")?;
        self.scratch = vec![0.0; bs1.max_n_functions() * bs2.max_n_functions()];
        self.kinetic.initialize(deriv, system, bs1.clone(), bs2.clone())?;
        self.nuclear.initialize(deriv, system, bs1, bs2)
    }

    fn calculate(&mut self, shell1: usize, shell2: usize, out: &mut [f64]) -> Result<usize> {
        let n = self.kinetic.calculate(shell1, shell2, out)?;
        self.nuclear.calculate(shell1, shell2, &mut self.scratch)?;
        for (o, v) in out[..n].iter_mut().zip(&self.scratch) {
            *o += v;
        }
        Ok(n)
    }
}
