//! Drivers that loop over shell pairs and quartets and scatter the blocks
//! an evaluator returns into dense AO arrays.

use crate::error::{Result, ScfError};
use crate::registry::ModuleContext;
use basis::index::{index2, index4, n_unique_eri};
use basis::integrals::{OneElectronIntegral, TwoElectronIntegral};
use basis::{BasisSet, System};
use nalgebra::DMatrix;
use tracing::debug;

fn check_count(calculated: usize, expected: usize) -> Result<()> {
    if calculated != expected {
        return Err(ScfError::InconsistentResult {
            calculated,
            expected,
        });
    }
    Ok(())
}

/// Dense `n1 x n2` matrix of an initialized one-electron evaluator.
pub fn fill_one_electron_matrix(
    module: &mut dyn OneElectronIntegral,
    bs1: &BasisSet,
    bs2: &BasisSet,
) -> Result<DMatrix<f64>> {
    let mut matrix = DMatrix::zeros(bs1.n_functions(), bs2.n_functions());
    let mut buffer = vec![0.0; bs1.max_n_functions() * bs2.max_n_functions()];

    for i in 0..bs1.n_shell() {
        let (n1, start1) = (bs1.shell(i)?.n_functions(), bs1.shell_start(i));
        for j in 0..bs2.n_shell() {
            let (n2, start2) = (bs2.shell(j)?.n_functions(), bs2.shell_start(j));
            let count = module.calculate(i, j, &mut buffer)?;
            check_count(count, n1 * n2)?;
            for a in 0..n1 {
                for b in 0..n2 {
                    matrix[(start1 + a, start2 + b)] = buffer[a * n2 + b];
                }
            }
        }
    }
    Ok(matrix)
}

/// Unique ERIs of an initialized two-electron evaluator, stored at
/// `index4` of the function indices.
pub fn fill_two_electron_vector(
    module: &mut dyn TwoElectronIntegral,
    bs: &BasisSet,
) -> Result<Vec<f64>> {
    let nshell = bs.n_shell();
    let mut eri = vec![0.0; n_unique_eri(bs.n_functions())];
    let mut buffer = vec![0.0; bs.max_n_functions().pow(4)];
    let mut n_quartets = 0usize;

    for i in 0..nshell {
        for j in 0..=i {
            let ij = index2(i, j);
            for k in 0..=i {
                for l in 0..=k {
                    if index2(k, l) > ij {
                        break;
                    }
                    let shells = [i, j, k, l];
                    let mut nfunc = [0; 4];
                    let mut start = [0; 4];
                    for (n, &s) in shells.iter().enumerate() {
                        nfunc[n] = bs.shell(s)?.n_functions();
                        start[n] = bs.shell_start(s);
                    }
                    let count = module.calculate(shells, &mut buffer)?;
                    check_count(count, nfunc.iter().product())?;
                    n_quartets += 1;

                    let mut idx = 0;
                    for a in start[0]..start[0] + nfunc[0] {
                        for b in start[1]..start[1] + nfunc[1] {
                            for c in start[2]..start[2] + nfunc[2] {
                                for d in start[3]..start[3] + nfunc[3] {
                                    eri[index4(a, b, c, d)] = buffer[idx];
                                    idx += 1;
                                }
                            }
                        }
                    }
                }
            }
        }
    }
    debug!("Computed {} unique shell quartets, {} integrals", n_quartets, eri.len());
    Ok(eri)
}

/// Creates the one-electron evaluator `key`, initializes it with the
/// working basis set of `system` on both sides and fills the AO matrix.
pub fn ao_one_electron(ctx: &ModuleContext, key: &str, system: &System) -> Result<DMatrix<f64>> {
    let bs = system.basis_set(&ctx.options().basis_set)?;
    let mut module = ctx.one_electron(key)?;
    module.initialize(0, system, bs.clone(), bs.clone())?;
    fill_one_electron_matrix(module.as_mut(), &bs, &bs)
}

pub fn ao_eri(ctx: &ModuleContext, key: &str, system: &System) -> Result<Vec<f64>> {
    let bs = system.basis_set(&ctx.options().basis_set)?;
    let mut module = ctx.two_electron(key)?;
    module.initialize(0, system, [bs.clone(), bs.clone(), bs.clone(), bs.clone()])?;
    fill_two_electron_vector(module.as_mut(), &bs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use basis::error::Result as IntegralResult;
    use basis::{Atom, BasisLibrary};
    use nalgebra::Vector3;
    use std::sync::Arc;

    /// Writes `shell1 * 10 + shell2` into every slot and can be told to
    /// under-report its count.
    struct Stamp {
        bs: Option<Arc<BasisSet>>,
        short: bool,
    }

    impl OneElectronIntegral for Stamp {
        fn initialize(
            &mut self,
            _deriv: u32,
            _system: &System,
            bs1: Arc<BasisSet>,
            _bs2: Arc<BasisSet>,
        ) -> IntegralResult<()> {
            self.bs = Some(bs1);
            Ok(())
        }

        fn calculate(&mut self, shell1: usize, shell2: usize, out: &mut [f64]) -> IntegralResult<usize> {
            let bs = self.bs.as_ref().unwrap();
            let n = bs.shell(shell1)?.n_functions() * bs.shell(shell2)?.n_functions();
            out[..n].fill((shell1 * 10 + shell2) as f64);
            Ok(if self.short { n - 1 } else { n })
        }
    }

    fn water() -> System {
        let atoms = vec![
            Atom::new("O", 8.0, Vector3::zeros()),
            Atom::new("H", 1.0, Vector3::new(0.0, 1.43, 1.1)),
            Atom::new("H", 1.0, Vector3::new(0.0, -1.43, 1.1)),
        ];
        let bs = BasisLibrary::sto3g().build(&atoms).unwrap();
        System::new(atoms).with_basis_set("primary", bs)
    }

    #[test]
    fn test_scatter_by_shell_start() {
        let system = water();
        let bs = system.basis_set("primary").unwrap();
        let mut stamp = Stamp { bs: None, short: false };
        stamp.initialize(0, &system, bs.clone(), bs.clone()).unwrap();
        let m = fill_one_electron_matrix(&mut stamp, &bs, &bs).unwrap();
        assert_eq!(m.shape(), (7, 7));
        assert_eq!(m[(0, 0)], 0.0);
        // shells: O 1s, O 2sp, H, H
        assert_eq!(m[(2, 6)], 13.0);
        assert_eq!(m[(5, 1)], 21.0);
    }

    #[test]
    fn test_bad_count() {
        let system = water();
        let bs = system.basis_set("primary").unwrap();
        let mut stamp = Stamp { bs: None, short: true };
        stamp.initialize(0, &system, bs.clone(), bs.clone()).unwrap();
        assert!(matches!(
            fill_one_electron_matrix(&mut stamp, &bs, &bs),
            Err(ScfError::InconsistentResult { calculated: 0, expected: 1 })
        ));
    }

    #[test]
    fn test_eri_vector_symmetry() {
        let system = water();
        let ctx = ModuleContext::default();
        let eri = ao_eri(&ctx, "ReferenceERI", &system).unwrap();
        let n = 7;
        assert_eq!(eri.len(), n_unique_eri(n));
        assert!(eri.iter().all(|v| v.is_finite()));
        // every diagonal (ii|ii) is a positive self repulsion
        for i in 0..n {
            assert!(eri[index4(i, i, i, i)] > 0.0);
        }

        let mut full = ctx.two_electron("ReferenceERI").unwrap();
        let bs = system.basis_set("primary").unwrap();
        full.initialize(0, &system, [bs.clone(), bs.clone(), bs.clone(), bs.clone()]).unwrap();
        let mut buf = vec![0.0; bs.max_n_functions().pow(4)];
        // (H1 H2 | O O) is stored although its shell pair order is not canonical
        let (h1, h2, o) = (bs.n_shell() - 2, bs.n_shell() - 1, 0);
        full.calculate([h1, h2, o, o], &mut buf).unwrap();
        let (mu, nu) = (bs.shell_start(h1), bs.shell_start(h2));
        assert!((eri[index4(mu, nu, 0, 0)] - buf[0]).abs() < 1e-12);
        assert!((eri[index4(0, 0, nu, mu)] - buf[0]).abs() < 1e-12);
    }
}
