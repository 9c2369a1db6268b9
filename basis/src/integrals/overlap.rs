use super::os::{OsState, Recurrence};
use super::{check_deriv, OneElectronIntegral};
use crate::basis::BasisSet;
use crate::error::{IntegralError, Result};
use crate::system::System;
use std::sync::Arc;

const NAME: &str = "OSOverlap";

#[derive(Debug, Clone, Default)]
pub struct OsOverlap {
    state: Option<OsState>,
}

impl OsOverlap {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OneElectronIntegral for OsOverlap {
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
        state.calculate(shell1, shell2, out, Recurrence::Overlap, |tb, i, j| {
            tb.s[0][tb.idx(i[0], j[0])] * tb.s[1][tb.idx(i[1], j[1])] * tb.s[2][tb.idx(i[2], j[2])]
        })
    }
}
