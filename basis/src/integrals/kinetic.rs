use super::os::{OsState, Recurrence};
use super::{check_deriv, OneElectronIntegral};
use crate::basis::BasisSet;
use crate::error::{IntegralError, Result};
use crate::system::System;
use std::sync::Arc;

const NAME: &str = "OSKineticEnergy";

/// Kinetic energy integrals -1/2 <a|nabla^2|b> by the Obara-Saika scheme.
#[derive(Debug, Clone, Default)]
pub struct OsKineticEnergy {
    state: Option<OsState>,
}

impl OsKineticEnergy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OneElectronIntegral for OsKineticEnergy {
    fn initialize(
        &mut self,
        deriv: u32,
        _system: &System,
        bs1: Arc<BasisSet>,
        bs2: Arc<BasisSet>,
    ) -> Result<()> {
        check_deriv(deriv, NAME)?;
        self.state = Some(OsState::new(&bs1, &bs2, 0));
        Ok(())
    }

    fn calculate(&mut self, shell1: usize, shell2: usize, out: &mut [f64]) -> Result<usize> {
        let state = self
            .state
            .as_mut()
            .ok_or(IntegralError::Uninitialized(NAME))?;
        state.calculate(shell1, shell2, out, Recurrence::Kinetic, |tb, i, j| {
            let x = tb.idx(i[0], j[0]);
            let y = tb.idx(i[1], j[1]);
            let z = tb.idx(i[2], j[2]);
            tb.t[0][x] * tb.s[1][y] * tb.s[2][z]
                + tb.s[0][x] * tb.t[1][y] * tb.s[2][z]
                + tb.s[0][x] * tb.s[1][y] * tb.t[2][z]
        })
    }
}
