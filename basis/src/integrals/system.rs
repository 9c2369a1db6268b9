use super::{check_buffer, check_deriv, SystemIntegral};
use crate::error::{IntegralError, Result};
use crate::system::{Atom, System};
use tracing::debug;

/// Nuclear repulsion energy sum_{i<j} Z_i Z_j / r_ij.
#[derive(Debug, Clone, Default)]
pub struct NuclearRepulsion {
    atoms: Option<Vec<Atom>>,
}

impl NuclearRepulsion {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SystemIntegral for NuclearRepulsion {
    fn initialize(&mut self, deriv: u32, system: &System) -> Result<()> {
        check_deriv(deriv, "NuclearRepulsion")?;
        self.atoms = Some(system.atoms().to_vec());
        Ok(())
    }

    fn calculate(&mut self, out: &mut [f64]) -> Result<usize> {
        let atoms = self
            .atoms
            .as_ref()
            .ok_or(IntegralError::Uninitialized("NuclearRepulsion"))?;
        check_buffer(1, out.len())?;
        let mut energy = 0.0;
        for (i, ai) in atoms.iter().enumerate() {
            for aj in &atoms[..i] {
                energy += ai.z * aj.z / ai.distance(aj);
            }
        }
        debug!("Nuclear repulsion energy: {:.10}", energy);
        out[0] = energy;
        Ok(1)
    }
}

/// Nuclear contribution to the dipole moment, sum_i Z_i R_i.
#[derive(Debug, Clone, Default)]
pub struct NuclearDipole {
    atoms: Option<Vec<Atom>>,
}

impl NuclearDipole {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SystemIntegral for NuclearDipole {
    fn initialize(&mut self, deriv: u32, system: &System) -> Result<()> {
        check_deriv(deriv, "NuclearDipole")?;
        self.atoms = Some(system.atoms().to_vec());
        Ok(())
    }

    fn calculate(&mut self, out: &mut [f64]) -> Result<usize> {
        let atoms = self
            .atoms
            .as_ref()
            .ok_or(IntegralError::Uninitialized("NuclearDipole"))?;
        check_buffer(3, out.len())?;
        out[..3].fill(0.0);
        for atom in atoms {
            for d in 0..3 {
                out[d] += atom.z * atom.coords[d];
            }
        }
        Ok(3)
    }
}
