//! Self-consistent field iterations with DIIS acceleration.

use crate::blocked::{Irrep, IrrepSpinMatrix};
use crate::common::{calculate_energy, calculate_rms_dens, form_density, nuclear_repulsion, orbitals};
use crate::error::{Result, ScfError};
use crate::method::{DerivReturn, EnergyMethod};
use crate::registry::ModuleContext;
use crate::wavefunction::Wavefunction;
use nalgebra::{DMatrix, DVector};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// DIIS (Direct Inversion in the Iterative Subspace) convergence accelerator
/// for one Fock block.
///
/// The error of a Fock matrix is the commutator FDS - SDF. The extrapolated
/// Fock matrix is sum_i c_i F_i with the c_i minimizing |sum_i c_i E_i|^2
/// subject to sum_i c_i = 1.
#[derive(Debug, Clone)]
pub struct Diis {
    error_matrices: Vec<DMatrix<f64>>,
    fock_matrices: Vec<DMatrix<f64>>,
    max_subspace_size: usize,
}

impl Diis {
    pub fn new(max_subspace_size: usize) -> Self {
        Diis {
            error_matrices: Vec::new(),
            fock_matrices: Vec::new(),
            max_subspace_size,
        }
    }

    pub fn error_matrix(
        fock: &DMatrix<f64>,
        density: &DMatrix<f64>,
        overlap: &DMatrix<f64>,
    ) -> DMatrix<f64> {
        fock * density * overlap - overlap * density * fock
    }

    /// Adds a Fock matrix and its error, dropping the oldest pair when the
    /// subspace is full.
    pub fn update(&mut self, fock: DMatrix<f64>, density: &DMatrix<f64>, overlap: &DMatrix<f64>) {
        let error = Self::error_matrix(&fock, density, overlap);
        if self.error_matrices.len() >= self.max_subspace_size {
            self.error_matrices.remove(0);
            self.fock_matrices.remove(0);
        }
        self.error_matrices.push(error);
        self.fock_matrices.push(fock);
    }

    /// None when the subspace is empty or the B matrix is singular.
    pub fn extrapolate(&self) -> Option<DMatrix<f64>> {
        let n = self.error_matrices.len();
        if n == 0 {
            return None;
        }

        let mut b = DMatrix::zeros(n + 1, n + 1);
        for i in 0..n {
            for j in 0..=i {
                let bij = self.error_matrices[i].dot(&self.error_matrices[j]);
                b[(i, j)] = bij;
                b[(j, i)] = bij;
            }
            b[(i, n)] = -1.0;
            b[(n, i)] = -1.0;
        }
        let mut rhs = DVector::zeros(n + 1);
        rhs[n] = -1.0;

        let Some(coeffs) = b.lu().solve(&rhs) else {
            debug!("DIIS extrapolation failed: singular B matrix");
            return None;
        };
        let mut fock = DMatrix::zeros(self.fock_matrices[0].nrows(), self.fock_matrices[0].ncols());
        for (f, c) in self.fock_matrices.iter().zip(coeffs.iter()) {
            fock += f * *c;
        }
        Some(fock)
    }

    pub fn reset(&mut self) {
        self.error_matrices.clear();
        self.fock_matrices.clear();
    }

    pub fn size(&self) -> usize {
        self.error_matrices.len()
    }

    /// Largest absolute element of the newest error matrix.
    pub fn max_error(&self) -> f64 {
        self.error_matrices.last().map_or(0.0, |e| e.amax())
    }
}

/// Restricted or unrestricted Hartree-Fock, chosen by the spin blocks of the
/// initial guess.
pub struct ScfIterate {
    ctx: ModuleContext,
}

impl ScfIterate {
    pub fn new(ctx: ModuleContext) -> Self {
        Self { ctx }
    }
}

impl EnergyMethod for ScfIterate {
    fn deriv(&mut self, order: usize, wfn: &Wavefunction) -> Result<DerivReturn> {
        if order != 0 {
            return Err(ScfError::NotImplemented(format!("SCF derivative of order {}", order)));
        }
        let options = self.ctx.options().clone();
        let system = wfn
            .system()
            .ok_or_else(|| ScfError::InvalidState("wavefunction has no system".to_string()))?
            .clone();

        let guess = self.ctx.method(&options.key_initial_guess)?.deriv(0, wfn)?;
        let mut current = guess.wavefunction;
        let occupations = current
            .occupations()
            .cloned()
            .ok_or_else(|| ScfError::InvalidState("initial guess has no occupations".to_string()))?;

        let mut builder = self.ctx.fock_builder(&options.key_fock_build)?;
        let ing = builder.ingredients(&current)?;
        let enuc = nuclear_repulsion(&self.ctx, &system)?;

        let mut diis: BTreeMap<(Irrep, i32), Diis> = BTreeMap::new();
        let mut last_energy = guess.values.first().copied().unwrap_or(0.0);
        let mut converged = false;

        info!("Starting SCF iterations");
        for iteration in 1..=options.max_iterations {
            let opdm = current
                .opdm()
                .cloned()
                .ok_or_else(|| ScfError::InvalidState("wavefunction has no density".to_string()))?;
            let fock = builder.build(&current)?;
            let energy = calculate_energy(&ing.hcore, enuc, &opdm, &fock)?.total;

            let fock = if options.diis_subspace_size > 0 {
                let mut extrapolated = IrrepSpinMatrix::new();
                for ((irrep, spin, f), (_, _, d)) in fock.iter().zip(opdm.iter()) {
                    let acc = diis
                        .entry((irrep, spin))
                        .or_insert_with(|| Diis::new(options.diis_subspace_size));
                    acc.update(f.clone(), d, &ing.overlap);
                    debug!(
                        "DIIS ({:?}, {}): {} vectors, max error {:.3e}",
                        irrep,
                        spin,
                        acc.size(),
                        acc.max_error()
                    );
                    extrapolated.insert(irrep, spin, acc.extrapolate().unwrap_or_else(|| f.clone()))?;
                }
                extrapolated
            } else {
                fock
            };

            let (cmat, epsilon) = orbitals(&fock, &ing.s12)?;
            let new_opdm = form_density(&cmat, &occupations)?;
            let rms = calculate_rms_dens(&new_opdm, &opdm)?;
            let delta = energy - last_energy;
            info!(
                "Iteration {:3}: E = {:18.10}  dE = {:12.4e}  rms(D) = {:12.4e}",
                iteration, energy, delta, rms
            );

            current = current.with_cmat(cmat).with_opdm(new_opdm).with_epsilon(epsilon);
            last_energy = energy;
            if delta.abs() < options.energy_tolerance && rms < options.density_tolerance {
                converged = true;
                info!("SCF converged in {} iterations", iteration);
                break;
            }
        }
        if !converged {
            warn!(
                "SCF not converged after {} iterations, returning the last state",
                options.max_iterations
            );
        }

        let fock = builder.build(&current)?;
        let opdm = current
            .opdm()
            .ok_or_else(|| ScfError::InvalidState("wavefunction has no density".to_string()))?;
        let energy = calculate_energy(&ing.hcore, enuc, opdm, &fock)?;
        info!("One-electron energy: {:18.10}", energy.one_electron);
        info!("Two-electron energy: {:18.10}", energy.two_electron);
        info!("Nuclear repulsion:   {:18.10}", energy.nuclear_repulsion);
        info!("Total SCF energy:    {:18.10}", energy.total);
        Ok(DerivReturn::energy(current, energy.total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diis_window() {
        let s = DMatrix::identity(2, 2);
        let d = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 0.0]);
        let mut diis = Diis::new(2);
        assert!(diis.extrapolate().is_none());
        for k in 0..3 {
            let f = DMatrix::from_row_slice(2, 2, &[1.0, 0.1 * k as f64, 0.1 * k as f64, 2.0]);
            diis.update(f, &d, &s);
        }
        assert_eq!(diis.size(), 2);
        diis.reset();
        assert_eq!(diis.size(), 0);
    }

    #[test]
    fn test_diis_single_vector_is_identity() {
        let s = DMatrix::identity(2, 2);
        let d = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 0.0]);
        let f = DMatrix::from_row_slice(2, 2, &[1.0, 0.3, 0.3, 2.0]);
        let mut diis = Diis::new(4);
        diis.update(f.clone(), &d, &s);
        assert!((diis.max_error() - 0.3).abs() < 1e-14);
        let extrapolated = diis.extrapolate().unwrap();
        assert!((extrapolated - f).abs().max() < 1e-12);
    }

    #[test]
    fn test_diis_removes_linear_error() {
        // errors +e and -e: the optimal combination is the average
        let s = DMatrix::identity(2, 2);
        let d = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 0.0]);
        let f1 = DMatrix::from_row_slice(2, 2, &[1.0, 0.2, 0.2, 2.0]);
        let f2 = DMatrix::from_row_slice(2, 2, &[1.0, -0.2, -0.2, 2.0]);
        let mut diis = Diis::new(4);
        diis.update(f1, &d, &s);
        diis.update(f2, &d, &s);
        let f = diis.extrapolate().unwrap();
        assert!(f[(0, 1)].abs() < 1e-12);
        assert!((f[(1, 1)] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_scf_rejects_derivatives() {
        let mut scf = ScfIterate::new(ModuleContext::default());
        assert!(matches!(
            scf.deriv(1, &Wavefunction::new()),
            Err(ScfError::NotImplemented(_))
        ));
        assert!(matches!(
            scf.deriv(0, &Wavefunction::new()),
            Err(ScfError::InvalidState(_))
        ));
    }
}
