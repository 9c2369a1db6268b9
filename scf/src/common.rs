//! Pieces shared by the SCF methods: occupations, densities, energies and
//! convergence measures.

use crate::blocked::{Irrep, IrrepSpinMatrix, IrrepSpinVector, SPIN_ALPHA, SPIN_BETA, SPIN_RESTRICTED};
use crate::error::{Result, ScfError};
use crate::linalg::{inverse_sqrt, symmetric_eigen};
use crate::registry::ModuleContext;
use basis::System;
use nalgebra::{DMatrix, DVector};
use tracing::debug;

/// Aufbau occupations for `nelec` electrons: doubly occupied restricted
/// orbitals when even, one more alpha than beta electron when odd.
pub fn find_occupations(nelec: usize) -> IrrepSpinVector {
    let mut occ = IrrepSpinVector::new();
    let blocks = if nelec % 2 == 0 {
        vec![(SPIN_RESTRICTED, DVector::from_element(nelec / 2, 2.0))]
    } else {
        vec![
            (SPIN_ALPHA, DVector::from_element(nelec / 2 + 1, 1.0)),
            (SPIN_BETA, DVector::from_element(nelec / 2, 1.0)),
        ]
    };
    for (spin, block) in blocks {
        // both layouts are valid spin sets
        let _ = occ.insert(Irrep::A, spin, block);
    }
    occ
}

fn integer_electrons(n_electrons: f64) -> Result<usize> {
    if n_electrons < 0.0 || n_electrons.fract().abs() > 1e-12 {
        return Err(ScfError::NonIntegerOccupation(n_electrons));
    }
    Ok(n_electrons.round() as usize)
}

pub fn occupations_for(n_electrons: f64) -> Result<IrrepSpinVector> {
    Ok(find_occupations(integer_electrons(n_electrons)?))
}

/// Occupations honouring the multiplicity of the system. High-spin
/// configurations are always unrestricted.
pub fn occupations_for_system(system: &System) -> Result<IrrepSpinVector> {
    let nelec = integer_electrons(system.n_electrons())?;
    let mult = system.multiplicity();
    if mult <= 1 {
        return Ok(find_occupations(nelec));
    }
    let unpaired = mult - 1;
    if unpaired > nelec || (nelec - unpaired) % 2 != 0 {
        return Err(ScfError::InvalidState(format!(
            "multiplicity {} is impossible with {} electrons",
            mult, nelec
        )));
    }
    let n_alpha = (nelec + unpaired) / 2;
    let mut occ = IrrepSpinVector::new();
    occ.insert(Irrep::A, SPIN_ALPHA, DVector::from_element(n_alpha, 1.0))?;
    occ.insert(Irrep::A, SPIN_BETA, DVector::from_element(nelec - n_alpha, 1.0))?;
    Ok(occ)
}

/// D(i,j) = sum_m occ(m) C(i,m) C(j,m) over the occupied columns.
pub fn form_density_block(cmat: &DMatrix<f64>, occ: &DVector<f64>) -> Result<DMatrix<f64>> {
    if occ.len() > cmat.ncols() {
        return Err(ScfError::StructureMismatch(format!(
            "{} occupied orbitals but only {} in the coefficient matrix",
            occ.len(),
            cmat.ncols()
        )));
    }
    let c_occ = cmat.columns(0, occ.len());
    Ok(&c_occ * DMatrix::from_diagonal(occ) * c_occ.transpose())
}

pub fn form_density(cmat: &IrrepSpinMatrix, occ: &IrrepSpinVector) -> Result<IrrepSpinMatrix> {
    if !cmat.same_keys(occ) {
        return Err(ScfError::StructureMismatch(
            "orbitals and occupations have different irrep/spin blocks".to_string(),
        ));
    }
    let mut density = IrrepSpinMatrix::new();
    for ((irrep, spin, c), (_, _, n)) in cmat.iter().zip(occ.iter()) {
        density.insert(irrep, spin, form_density_block(c, n)?)?;
    }
    Ok(density)
}

/// Root of the summed squared difference over every block of `m1` and `m2`.
pub fn calculate_rms_dens(m1: &IrrepSpinMatrix, m2: &IrrepSpinMatrix) -> Result<f64> {
    if !m1.same_structure(m2) {
        return Err(ScfError::StructureMismatch(
            "density matrices have different blocks".to_string(),
        ));
    }
    let sum: f64 = m1
        .iter()
        .zip(m2.iter())
        .map(|((_, _, a), (_, _, b))| (a - b).norm_squared())
        .sum();
    Ok(sum.sqrt())
}

/// S^-1/2, the symmetric orthogonalizer.
pub fn form_s12(overlap: &DMatrix<f64>) -> DMatrix<f64> {
    inverse_sqrt(overlap)
}

/// Solves F C = S C e through the orthogonalizer: diagonalizes
/// S12^T F S12 and back-transforms the eigenvectors with S12.
pub fn diagonalize_fock(fock: &DMatrix<f64>, s12: &DMatrix<f64>) -> (DVector<f64>, DMatrix<f64>) {
    let f_prime = s12.transpose() * fock * s12;
    let (epsilon, c_prime) = symmetric_eigen(&f_prime);
    (epsilon, s12 * c_prime)
}

/// Orbitals and orbital energies for every block of `fock`.
pub fn orbitals(fock: &IrrepSpinMatrix, s12: &DMatrix<f64>) -> Result<(IrrepSpinMatrix, IrrepSpinVector)> {
    let mut cmat = IrrepSpinMatrix::new();
    let mut epsilon = IrrepSpinVector::new();
    for (irrep, spin, f) in fock.iter() {
        if f.shape() != s12.shape() {
            return Err(ScfError::StructureMismatch(format!(
                "Fock block is {}x{}, orthogonalizer is {}x{}",
                f.nrows(),
                f.ncols(),
                s12.nrows(),
                s12.ncols()
            )));
        }
        let (e, c) = diagonalize_fock(f, s12);
        cmat.insert(irrep, spin, c)?;
        epsilon.insert(irrep, spin, e)?;
    }
    Ok((cmat, epsilon))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyComponents {
    pub one_electron: f64,
    pub two_electron: f64,
    pub electronic: f64,
    pub nuclear_repulsion: f64,
    pub total: f64,
}

/// HF energy of `opdm` with the Fock matrices built from it. Restricted
/// densities carry occupation 2, so the same expression covers both cases.
pub fn calculate_energy(
    hcore: &DMatrix<f64>,
    nuclear_repulsion: f64,
    opdm: &IrrepSpinMatrix,
    fock: &IrrepSpinMatrix,
) -> Result<EnergyComponents> {
    if !opdm.same_structure(fock) {
        return Err(ScfError::StructureMismatch(
            "density and Fock matrices have different blocks".to_string(),
        ));
    }
    let mut one_electron = 0.0;
    let mut two_electron = 0.0;
    for ((_, _, d), (_, _, f)) in opdm.iter().zip(fock.iter()) {
        one_electron += d.dot(hcore);
        two_electron += 0.5 * d.dot(&(f - hcore));
    }
    let electronic = one_electron + two_electron;
    let energy = EnergyComponents {
        one_electron,
        two_electron,
        electronic,
        nuclear_repulsion,
        total: electronic + nuclear_repulsion,
    };
    debug!("    One-electron energy:     {:16.10}", energy.one_electron);
    debug!("    Two-electron energy:     {:16.10}", energy.two_electron);
    debug!("    Electronic energy:       {:16.10}", energy.electronic);
    debug!("    Nuclear repulsion:       {:16.10}", energy.nuclear_repulsion);
    debug!("    Total energy:            {:16.10}", energy.total);
    Ok(energy)
}

/// Nuclear repulsion energy of `system` from the module named by
/// `key_nuc_repulsion`.
pub fn nuclear_repulsion(ctx: &ModuleContext, system: &System) -> Result<f64> {
    let mut module = ctx.system_integral(&ctx.options().key_nuc_repulsion)?;
    module.initialize(0, system)?;
    let mut out = [0.0];
    let count = module.calculate(&mut out)?;
    if count != 1 {
        return Err(ScfError::InconsistentResult {
            calculated: count,
            expected: 1,
        });
    }
    Ok(out[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use basis::Atom;
    use nalgebra::Vector3;

    #[test]
    fn test_even_occupations() {
        let occ = find_occupations(10);
        assert!(occ.is_restricted());
        let block = occ.get(Irrep::A, SPIN_RESTRICTED).unwrap();
        assert_eq!(block.len(), 5);
        assert!(block.iter().all(|&n| n == 2.0));
    }

    #[test]
    fn test_odd_occupations() {
        let occ = find_occupations(7);
        let alpha = occ.get(Irrep::A, SPIN_ALPHA).unwrap();
        let beta = occ.get(Irrep::A, SPIN_BETA).unwrap();
        assert_eq!(alpha.len(), 4);
        assert_eq!(beta.len(), 3);
        assert_eq!(alpha.sum() + beta.sum(), 7.0);
    }

    #[test]
    fn test_non_integer_electrons() {
        assert!(matches!(occupations_for(2.5), Err(ScfError::NonIntegerOccupation(_))));
        assert!(occupations_for(2.0).is_ok());
    }

    #[test]
    fn test_triplet_occupations() {
        let atoms = vec![Atom::new("O", 8.0, Vector3::zeros())];
        let triplet = System::new(atoms.clone()).with_multiplicity(3);
        let occ = occupations_for_system(&triplet).unwrap();
        assert_eq!(occ.get(Irrep::A, SPIN_ALPHA).unwrap().len(), 5);
        assert_eq!(occ.get(Irrep::A, SPIN_BETA).unwrap().len(), 3);

        let doublet = System::new(atoms).with_multiplicity(2);
        assert!(matches!(occupations_for_system(&doublet), Err(ScfError::InvalidState(_))));
    }

    #[test]
    fn test_form_density() {
        let c = DMatrix::from_row_slice(2, 2, &[0.6, 0.8, 0.8, -0.6]);
        let d = form_density_block(&c, &DVector::from_element(1, 2.0)).unwrap();
        assert!((d[(0, 0)] - 0.72).abs() < 1e-14);
        assert!((d[(0, 1)] - 0.96).abs() < 1e-14);
        assert!((d[(1, 1)] - 1.28).abs() < 1e-14);
        assert!(form_density_block(&c, &DVector::from_element(3, 1.0)).is_err());
    }

    #[test]
    fn test_rms_density() {
        let mut a = IrrepSpinMatrix::new();
        a.insert(Irrep::A, SPIN_RESTRICTED, DMatrix::from_element(2, 2, 1.0)).unwrap();
        assert_eq!(calculate_rms_dens(&a, &a).unwrap(), 0.0);

        let mut b = IrrepSpinMatrix::new();
        b.insert(Irrep::A, SPIN_RESTRICTED, DMatrix::from_element(2, 2, 2.0)).unwrap();
        assert!((calculate_rms_dens(&a, &b).unwrap() - 2.0).abs() < 1e-14);

        let mut c = IrrepSpinMatrix::new();
        c.insert(Irrep::A, SPIN_RESTRICTED, DMatrix::zeros(3, 3)).unwrap();
        assert!(matches!(calculate_rms_dens(&a, &c), Err(ScfError::StructureMismatch(_))));
    }

    #[test]
    fn test_energy_without_two_electron_part() {
        let h = DMatrix::from_row_slice(2, 2, &[-1.0, -0.5, -0.5, -0.8]);
        let mut d = IrrepSpinMatrix::new();
        d.insert(Irrep::A, SPIN_RESTRICTED, DMatrix::identity(2, 2)).unwrap();
        let mut f = IrrepSpinMatrix::new();
        f.insert(Irrep::A, SPIN_RESTRICTED, h.clone()).unwrap();
        let energy = calculate_energy(&h, 0.5, &d, &f).unwrap();
        assert!((energy.one_electron + 1.8).abs() < 1e-14);
        assert_eq!(energy.two_electron, 0.0);
        assert!((energy.total + 1.3).abs() < 1e-14);
    }
}
