use crate::error::{Result, ScfError};
use crate::fill::ao_one_electron;
use crate::registry::ModuleContext;
use crate::wavefunction::Wavefunction;
use nalgebra::Vector3;
use tracing::debug;

/// Expectation value sum_spin sum_ij D(i,j) O(i,j) of the one-electron
/// operator registered under `key`.
pub fn one_electron_property(ctx: &ModuleContext, wfn: &Wavefunction, key: &str) -> Result<f64> {
    let system = wfn
        .system()
        .ok_or_else(|| ScfError::InvalidState("wavefunction has no system".to_string()))?;
    let opdm = wfn
        .opdm()
        .ok_or_else(|| ScfError::InvalidState("wavefunction has no density".to_string()))?;
    let operator = ao_one_electron(ctx, key, system)?;

    let mut value = 0.0;
    for (irrep, spin, d) in opdm.iter() {
        if d.shape() != operator.shape() {
            return Err(ScfError::StructureMismatch(format!(
                "density block ({:?}, {}) does not match operator '{}'",
                irrep, spin, key
            )));
        }
        value += d.dot(&operator);
    }
    debug!("<{}> = {:.10}", key, value);
    Ok(value)
}

/// Total dipole moment about the origin: nuclear minus electronic
/// contribution.
pub fn dipole_moment(ctx: &ModuleContext, wfn: &Wavefunction) -> Result<Vector3<f64>> {
    let system = wfn
        .system()
        .ok_or_else(|| ScfError::InvalidState("wavefunction has no system".to_string()))?;
    let mut nuclear = ctx.system_integral(&ctx.options().key_nuc_dipole)?;
    nuclear.initialize(0, system)?;
    let mut out = [0.0; 3];
    let count = nuclear.calculate(&mut out)?;
    if count != 3 {
        return Err(ScfError::InconsistentResult {
            calculated: count,
            expected: 3,
        });
    }

    let mut dipole = Vector3::from(out);
    for (d, key) in ["Dipole_x", "Dipole_y", "Dipole_z"].iter().enumerate() {
        dipole[d] -= one_electron_property(ctx, wfn, key)?;
    }
    Ok(dipole)
}
