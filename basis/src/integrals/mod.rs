//! Integral evaluators.
//!
//! Every evaluator follows the same lifecycle: construct it, `initialize` it
//! once with a derivative order, the system and the basis sets (which are
//! normalized on the way in), then call `calculate` per shell pair or quartet.
//! Results are written row-major over the shells' functions into a
//! caller-provided buffer and the number of values written is returned.

mod core_hamiltonian;
mod dipole;
mod eri;
mod hermite;
mod kinetic;
mod nuclear;
mod os;
mod overlap;
mod system;


pub use core_hamiltonian::CoreHamiltonian;
pub use dipole::{DipoleComponent, OsDipole};
pub use eri::ReferenceEri;
pub use kinetic::OsKineticEnergy;
pub use nuclear::NuclearAttraction;
pub use overlap::OsOverlap;
pub use system::{NuclearDipole, NuclearRepulsion};

use crate::basis::BasisSet;
use crate::error::{IntegralError, Result};
use crate::shell::Shell;
use crate::system::System;
use std::sync::Arc;

pub trait OneElectronIntegral: Send {
    fn initialize(
        &mut self,
        deriv: u32,
        system: &System,
        bs1: Arc<BasisSet>,
        bs2: Arc<BasisSet>,
    ) -> Result<()>;

    fn calculate(&mut self, shell1: usize, shell2: usize, out: &mut [f64]) -> Result<usize>;
}

pub trait TwoElectronIntegral: Send {
    fn initialize(&mut self, deriv: u32, system: &System, bases: [Arc<BasisSet>; 4]) -> Result<()>;

    fn calculate(&mut self, shells: [usize; 4], out: &mut [f64]) -> Result<usize>;
}

/// Integrals that depend only on the nuclei.
pub trait SystemIntegral: Send {
    fn initialize(&mut self, deriv: u32, system: &System) -> Result<()>;

    fn calculate(&mut self, out: &mut [f64]) -> Result<usize>;
}

pub(crate) fn check_deriv(deriv: u32, name: &str) -> Result<()> {
    if deriv != 0 {
        return Err(IntegralError::NotImplemented(format!(
            "{} integral with deriv != 0",
            name
        )));
    }
    Ok(())
}

pub(crate) fn check_buffer(required: usize, provided: usize) -> Result<()> {
    if provided < required {
        return Err(IntegralError::InsufficientBuffer { required, provided });
    }
    Ok(())
}

/// The two normalized basis sets of a one-electron evaluator.
#[derive(Debug, Clone)]
pub(crate) struct BasisPair {
    pub bs1: Arc<BasisSet>,
    pub bs2: Arc<BasisSet>,
}

impl BasisPair {
    pub fn new(bs1: &BasisSet, bs2: &BasisSet) -> Self {
        Self {
            bs1: Arc::new(bs1.normalized()),
            bs2: Arc::new(bs2.normalized()),
        }
    }

    pub fn shells(&self, shell1: usize, shell2: usize) -> Result<(&Shell, &Shell)> {
        Ok((self.bs1.shell(shell1)?, self.bs2.shell(shell2)?))
    }

    pub fn max_n_cartesian(&self) -> usize {
        self.bs1.max_n_cartesian() * self.bs2.max_n_cartesian()
    }
}
