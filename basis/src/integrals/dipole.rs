use super::os::{OsState, Recurrence};
use super::{check_deriv, OneElectronIntegral};
use crate::basis::BasisSet;
use crate::error::{IntegralError, Result};
use crate::system::System;
use std::sync::Arc;

const NAME: &str = "Dipole";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DipoleComponent {
    X,
    Y,
    Z,
}

impl DipoleComponent {
    pub fn index(self) -> usize {
        match self {
            DipoleComponent::X => 0,
            DipoleComponent::Y => 1,
            DipoleComponent::Z => 2,
        }
    }
}

/// One cartesian component of the position operator, <a|r_c|b>, with the
/// origin at the coordinate origin.
///
/// Uses x = (x - A_x) + A_x, so the bra side needs one more row of the overlap
/// table than its angular momentum.
#[derive(Debug, Clone)]
pub struct OsDipole {
    component: DipoleComponent,
    state: Option<OsState>,
}

impl OsDipole {
    pub fn new(component: DipoleComponent) -> Self {
        Self {
            component,
            state: None,
        }
    }
}

impl OneElectronIntegral for OsDipole {
    fn initialize(
        &mut self,
        deriv: u32,
        _system: &System,
        bs1: Arc<BasisSet>,
        bs2: Arc<BasisSet>,
    ) -> Result<()> {
        check_deriv(deriv, NAME)?;
        self.state = Some(OsState::new(&bs1, &bs2, 1));
        Ok(())
    }

    fn calculate(&mut self, shell1: usize, shell2: usize, out: &mut [f64]) -> Result<usize> {
        let state = self
            .state
            .as_mut()
            .ok_or(IntegralError::Uninitialized(NAME))?;
        let c = self.component.index();
        let origin_shift = state.bases.bs1.shell(shell1)?.center()[c];
        state.calculate(shell1, shell2, out, Recurrence::Overlap, move |tb, i, j| {
            let mut value = 1.0;
            for d in 0..3 {
                let sij = tb.s[d][tb.idx(i[d], j[d])];
                value *= if d == c {
                    tb.s[d][tb.idx(i[d] + 1, j[d])] + origin_shift * sij
                } else {
                    sij
                };
            }
            value
        })
    }
}
