use super::hermite::{HermiteE, HermiteR};
use super::os::accumulate_pair;
use super::{check_buffer, check_deriv, BasisPair, OneElectronIntegral};
use crate::basis::BasisSet;
use crate::error::{IntegralError, Result};
use crate::system::System;
use crate::transform::SphericalTransform;
use nalgebra::Vector3;
use std::f64::consts::PI;
use std::sync::Arc;

const NAME: &str = "NuclearAttraction";

#[derive(Debug, Clone)]
struct NuclearState {
    bases: BasisPair,
    nuclei: Vec<(f64, Vector3<f64>)>,
    e: [HermiteE; 3],
    r: HermiteR,
    source: Vec<f64>,
    transform: SphericalTransform,
}

/// Electron-nuclear attraction -sum_C Z_C <a|1/r_C|b> over all nuclei of the
/// system, in the Hermite (McMurchie-Davidson) expansion.
#[derive(Debug, Clone, Default)]
pub struct NuclearAttraction {
    state: Option<NuclearState>,
}

impl NuclearAttraction {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OneElectronIntegral for NuclearAttraction {
    fn initialize(
        &mut self,
        deriv: u32,
        system: &System,
        bs1: Arc<BasisSet>,
        bs2: Arc<BasisSet>,
    ) -> Result<()> {
        check_deriv(deriv, NAME)?;
        let bases = BasisPair::new(&bs1, &bs2);
        let n = bases.max_n_cartesian();
        self.state = Some(NuclearState {
            nuclei: system.atoms().iter().map(|a| (a.z, a.coords)).collect(),
            e: Default::default(),
            r: HermiteR::default(),
            source: Vec::with_capacity(n),
            transform: SphericalTransform::with_capacity(n),
            bases,
        });
        Ok(())
    }

    fn calculate(&mut self, shell1: usize, shell2: usize, out: &mut [f64]) -> Result<usize> {
        let st = self
            .state
            .as_mut()
            .ok_or(IntegralError::Uninitialized(NAME))?;
        let (sh1, sh2) = st.bases.shells(shell1, shell2)?;
        let nfunc = sh1.n_functions() * sh2.n_functions();
        check_buffer(nfunc, out.len())?;

        let (la, lb) = (sh1.max_am() as usize, sh2.max_am() as usize);
        st.source.clear();
        st.source.resize(sh1.n_cartesian() * sh2.n_cartesian(), 0.0);
        let (ca, cb) = (sh1.center(), sh2.center());

        for a in 0..sh1.n_primitives() {
            for b in 0..sh2.n_primitives() {
                let (alpha, beta) = (sh1.alpha(a), sh2.alpha(b));
                let p = alpha + beta;
                let center_p = (ca * alpha + cb * beta) / p;
                for d in 0..3 {
                    st.e[d].build(la, lb, alpha, beta, ca[d] - cb[d]);
                }
                for &(z, ref c) in &st.nuclei {
                    let pc = center_p - c;
                    st.r.build(la + lb, p, [pc.x, pc.y, pc.z]);
                    let prefac = -z * 2.0 * PI / p;
                    let (e, r) = (&st.e, &st.r);
                    accumulate_pair(sh1, sh2, a, b, &mut st.source, |i, j| {
                        let mut sum = 0.0;
                        for t in 0..=(i[0] + j[0]) as usize {
                            let ex = e[0].get(i[0], j[0], t);
                            for u in 0..=(i[1] + j[1]) as usize {
                                let exy = ex * e[1].get(i[1], j[1], u);
                                for v in 0..=(i[2] + j[2]) as usize {
                                    sum += exy * e[2].get(i[2], j[2], v) * r.get(t, u, v);
                                }
                            }
                        }
                        prefac * sum
                    });
                }
            }
        }

        st.transform.transform_2(sh1, sh2, &st.source, out);
        Ok(nfunc)
    }
}
