//! Fock matrix construction from AO integrals.

use crate::blocked::{IrrepSpinMatrix, SPIN_ALPHA, SPIN_BETA, SPIN_RESTRICTED};
use crate::common::form_s12;
use crate::error::{Result, ScfError};
use crate::fill::{ao_eri, ao_one_electron};
use crate::registry::ModuleContext;
use crate::wavefunction::Wavefunction;
use basis::index::index4;
use basis::System;
use nalgebra::DMatrix;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::info;

/// AO quantities a Fock builder needs, computed once per system.
#[derive(Debug, Clone)]
pub struct FockIngredients {
    pub overlap: DMatrix<f64>,
    pub hcore: DMatrix<f64>,
    pub s12: DMatrix<f64>,
    pub eri: Arc<Vec<f64>>,
}

impl FockIngredients {
    pub fn compute(ctx: &ModuleContext, system: &System) -> Result<Self> {
        let options = ctx.options();
        info!("Computing AO integrals");
        let overlap = ao_one_electron(ctx, &options.key_ao_overlap, system)?;
        let hcore = ao_one_electron(ctx, &options.key_ao_corebuild, system)?;
        let s12 = form_s12(&overlap);
        let eri = Arc::new(ao_eri(ctx, &options.key_ao_eri, system)?);
        Ok(Self {
            overlap,
            hcore,
            s12,
            eri,
        })
    }

    pub fn n_basis(&self) -> usize {
        self.hcore.nrows()
    }
}

pub trait FockBuilder: Send {
    /// AO ingredients for the system of `wfn`, computed on first use.
    fn ingredients(&mut self, wfn: &Wavefunction) -> Result<Arc<FockIngredients>>;

    /// Fock matrices with the same irrep/spin blocks as the density of `wfn`.
    fn build(&mut self, wfn: &Wavefunction) -> Result<IrrepSpinMatrix>;
}

/// Conventional Hartree-Fock Fock build over the stored unique ERIs.
pub struct BasicFockBuild {
    ctx: ModuleContext,
    cache: Option<Arc<FockIngredients>>,
}

impl BasicFockBuild {
    pub fn new(ctx: ModuleContext) -> Self {
        Self { ctx, cache: None }
    }
}

impl FockBuilder for BasicFockBuild {
    fn ingredients(&mut self, wfn: &Wavefunction) -> Result<Arc<FockIngredients>> {
        if let Some(cache) = &self.cache {
            return Ok(cache.clone());
        }
        let system = wfn
            .system()
            .ok_or_else(|| ScfError::InvalidState("wavefunction has no system".to_string()))?;
        let ingredients = Arc::new(FockIngredients::compute(&self.ctx, system)?);
        self.cache = Some(ingredients.clone());
        Ok(ingredients)
    }

    fn build(&mut self, wfn: &Wavefunction) -> Result<IrrepSpinMatrix> {
        let ing = self.ingredients(wfn)?;
        let opdm = wfn
            .opdm()
            .ok_or_else(|| ScfError::InvalidState("wavefunction has no density".to_string()))?;
        let n = ing.n_basis();

        let mut fock = IrrepSpinMatrix::new();
        for irrep in opdm.irreps() {
            let block = |spin| {
                opdm.get(irrep, spin)
                    .filter(|d| d.shape() == (n, n))
                    .ok_or_else(|| {
                        ScfError::StructureMismatch(format!(
                            "density block ({:?}, {}) missing or not {}x{}",
                            irrep, spin, n, n
                        ))
                    })
            };
            if opdm.spins(irrep) == [SPIN_RESTRICTED] {
                let d = block(SPIN_RESTRICTED)?;
                let j = coulomb(&ing.eri, d);
                let k = exchange(&ing.eri, d);
                fock.insert(irrep, SPIN_RESTRICTED, &ing.hcore + j - k * 0.5)?;
            } else {
                let (da, db) = (block(SPIN_ALPHA)?, block(SPIN_BETA)?);
                let j = coulomb(&ing.eri, &(da + db));
                let ka = exchange(&ing.eri, da);
                let kb = exchange(&ing.eri, db);
                fock.insert(irrep, SPIN_ALPHA, &ing.hcore + &j - ka)?;
                fock.insert(irrep, SPIN_BETA, &ing.hcore + &j - kb)?;
            }
        }
        Ok(fock)
    }
}

/// J(mu,nu) = sum_{lambda,sigma} (mu nu|lambda sigma) D(lambda,sigma)
pub fn coulomb(eri: &[f64], density: &DMatrix<f64>) -> DMatrix<f64> {
    contract(density, |mu, nu, lam, sig| eri[index4(mu, nu, lam, sig)])
}

/// K(mu,nu) = sum_{lambda,sigma} (mu lambda|nu sigma) D(lambda,sigma)
pub fn exchange(eri: &[f64], density: &DMatrix<f64>) -> DMatrix<f64> {
    contract(density, |mu, nu, lam, sig| eri[index4(mu, lam, nu, sig)])
}

/// Symmetric contraction of `density` with a four-index quantity, one
/// parallel task per row.
fn contract<F>(density: &DMatrix<f64>, integral: F) -> DMatrix<f64>
where
    F: Fn(usize, usize, usize, usize) -> f64 + Sync,
{
    let n = density.nrows();
    let rows: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|mu| {
            (0..=mu)
                .map(|nu| {
                    let mut sum = 0.0;
                    for lam in 0..n {
                        for sig in 0..n {
                            sum += density[(lam, sig)] * integral(mu, nu, lam, sig);
                        }
                    }
                    sum
                })
                .collect()
        })
        .collect();

    let mut result = DMatrix::zeros(n, n);
    for (mu, row) in rows.iter().enumerate() {
        for (nu, &value) in row.iter().enumerate() {
            result[(mu, nu)] = value;
            result[(nu, mu)] = value;
        }
    }
    result
}
