use super::hermite::{HermiteE, HermiteR};
use super::{check_buffer, check_deriv, TwoElectronIntegral};
use crate::basis::BasisSet;
use crate::error::{IntegralError, Result};
use crate::shell::{cartesian_ordering, Shell};
use crate::system::System;
use crate::transform::SphericalTransform;
use itertools::iproduct;
use nalgebra::Vector3;
use std::f64::consts::PI;
use std::sync::Arc;

const NAME: &str = "ReferenceERI";

/// Hermite data of one primitive pair within a shell pair.
#[derive(Debug, Clone, Default)]
struct PairData {
    a: usize,
    b: usize,
    p: f64,
    center: Vector3<f64>,
    e: [HermiteE; 3],
}

fn build_pairs(sh1: &Shell, sh2: &Shell, pairs: &mut Vec<PairData>) {
    let (la, lb) = (sh1.max_am() as usize, sh2.max_am() as usize);
    let n = sh1.n_primitives() * sh2.n_primitives();
    pairs.resize_with(n, Default::default);
    let mut k = 0;
    for a in 0..sh1.n_primitives() {
        for b in 0..sh2.n_primitives() {
            let (alpha, beta) = (sh1.alpha(a), sh2.alpha(b));
            let pair = &mut pairs[k];
            pair.a = a;
            pair.b = b;
            pair.p = alpha + beta;
            pair.center = (sh1.center() * alpha + sh2.center() * beta) / pair.p;
            for d in 0..3 {
                pair.e[d].build(la, lb, alpha, beta, sh1.center()[d] - sh2.center()[d]);
            }
            k += 1;
        }
    }
}

/// One cartesian component of one general contraction, flattened over a shell.
#[derive(Debug, Clone, Copy)]
struct Component {
    g: usize,
    ijk: [u32; 3],
}

fn components(sh: &Shell, out: &mut Vec<Component>) {
    out.clear();
    for g in 0..sh.n_general_contractions() {
        for &ijk in cartesian_ordering(sh.general_am(g)) {
            out.push(Component { g, ijk });
        }
    }
}

#[derive(Debug, Clone)]
struct EriState {
    bases: [Arc<BasisSet>; 4],
    bra: Vec<PairData>,
    ket: Vec<PairData>,
    comps: [Vec<Component>; 4],
    r: HermiteR,
    source: Vec<f64>,
    transform: SphericalTransform,
}

/// Electron repulsion integrals (ab|cd) in chemists' notation, evaluated
/// directly from the Hermite expansion of both charge distributions.
/// Straightforward rather than fast, meant as a reference.
#[derive(Debug, Clone, Default)]
pub struct ReferenceEri {
    state: Option<EriState>,
}

impl ReferenceEri {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TwoElectronIntegral for ReferenceEri {
    fn initialize(&mut self, deriv: u32, _system: &System, bases: [Arc<BasisSet>; 4]) -> Result<()> {
        check_deriv(deriv, NAME)?;
        let bases = bases.map(|bs| Arc::new(bs.normalized()));
        let n: usize = bases.iter().map(|bs| bs.max_n_cartesian()).product();
        self.state = Some(EriState {
            bases,
            bra: Vec::new(),
            ket: Vec::new(),
            comps: Default::default(),
            r: HermiteR::default(),
            source: Vec::with_capacity(n),
            transform: SphericalTransform::with_capacity(n),
        });
        Ok(())
    }

    fn calculate(&mut self, shells: [usize; 4], out: &mut [f64]) -> Result<usize> {
        let st = self
            .state
            .as_mut()
            .ok_or(IntegralError::Uninitialized(NAME))?;
        let sh = [
            st.bases[0].shell(shells[0])?,
            st.bases[1].shell(shells[1])?,
            st.bases[2].shell(shells[2])?,
            st.bases[3].shell(shells[3])?,
        ];
        let nfunc: usize = sh.iter().map(|s| s.n_functions()).product();
        check_buffer(nfunc, out.len())?;

        let ncart = sh.map(Shell::n_cartesian);
        st.source.clear();
        st.source.resize(ncart.iter().product(), 0.0);
        for (k, s) in sh.iter().enumerate() {
            components(s, &mut st.comps[k]);
        }
        build_pairs(sh[0], sh[1], &mut st.bra);
        build_pairs(sh[2], sh[3], &mut st.ket);
        let lmax = sh.iter().map(|s| s.max_am() as usize).sum();

        for bra in &st.bra {
            for ket in &st.ket {
                let (p, q) = (bra.p, ket.p);
                let alpha = p * q / (p + q);
                let pq = bra.center - ket.center;
                st.r.build(lmax, alpha, [pq.x, pq.y, pq.z]);
                let prefac = 2.0 * PI.powf(2.5) / (p * q * (p + q).sqrt());

                let quartets = iproduct!(&st.comps[0], &st.comps[1], &st.comps[2], &st.comps[3]);
                for (out, (c1, c2, c3, c4)) in st.source.iter_mut().zip(quartets) {
                    let cab = sh[0].coef(c1.g, bra.a) * sh[1].coef(c2.g, bra.b);
                    let ccd = sh[2].coef(c3.g, ket.a) * sh[3].coef(c4.g, ket.b);
                    let value = hermite_sum(bra, ket, &st.r, [c1.ijk, c2.ijk], [c3.ijk, c4.ijk]);
                    *out += prefac * cab * ccd * value;
                }
            }
        }

        st.transform.transform_4(sh, &st.source, out);
        Ok(nfunc)
    }
}

fn hermite_sum(bra: &PairData, ket: &PairData, r: &HermiteR, ab: [[u32; 3]; 2], cd: [[u32; 3]; 2]) -> f64 {
    let [i1, j1] = ab;
    let [i2, j2] = cd;
    let mut sum = 0.0;
    for t in 0..=(i1[0] + j1[0]) as usize {
        let et = bra.e[0].get(i1[0], j1[0], t);
        for u in 0..=(i1[1] + j1[1]) as usize {
            let etu = et * bra.e[1].get(i1[1], j1[1], u);
            for v in 0..=(i1[2] + j1[2]) as usize {
                let etuv = etu * bra.e[2].get(i1[2], j1[2], v);
                if etuv == 0.0 {
                    continue;
                }
                let mut inner = 0.0;
                for tau in 0..=(i2[0] + j2[0]) as usize {
                    let ft = ket.e[0].get(i2[0], j2[0], tau);
                    for nu in 0..=(i2[1] + j2[1]) as usize {
                        let ftn = ft * ket.e[1].get(i2[1], j2[1], nu);
                        for phi in 0..=(i2[2] + j2[2]) as usize {
                            let sign = if (tau + nu + phi) % 2 == 0 { 1.0 } else { -1.0 };
                            inner += sign
                                * ftn
                                * ket.e[2].get(i2[2], j2[2], phi)
                                * r.get(t + tau, u + nu, v + phi);
                        }
                    }
                }
                sum += etuv * inner;
            }
        }
    }
    sum
}
