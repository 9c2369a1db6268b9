//! Obara-Saika recurrences for one-electron integrals over a shell pair.
//!
//! For each primitive pair the three cartesian directions get their own
//! (i, j) tables of overlap and, when requested, kinetic energy values.
//! Cartesian integrals are products of table entries, accumulated per general
//! contraction into a cartesian source block and finally transformed to
//! spherical functions where the shells ask for it.

use super::{check_buffer, BasisPair};
use crate::basis::BasisSet;
use crate::error::Result;
use crate::shell::{cartesian_ordering, Shell};
use crate::transform::SphericalTransform;
use nalgebra::Vector3;
use std::f64::consts::PI;

/// Gaussian product quantities for a primitive pair.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PrimitivePair {
    pub a1: f64,
    pub a2: f64,
    pub oop: f64,
    pub oo2p: f64,
    pub mu: f64,
    pub pa: [f64; 3],
    pub pb: [f64; 3],
    pub ab: [f64; 3],
}

impl PrimitivePair {
    pub fn new(a1: f64, xyz1: &Vector3<f64>, a2: f64, xyz2: &Vector3<f64>) -> Self {
        let p = a1 + a2;
        let oop = 1.0 / p;
        let mut pa = [0.0; 3];
        let mut pb = [0.0; 3];
        let mut ab = [0.0; 3];
        for d in 0..3 {
            let pd = (a1 * xyz1[d] + a2 * xyz2[d]) * oop;
            pa[d] = pd - xyz1[d];
            pb[d] = pd - xyz2[d];
            ab[d] = xyz1[d] - xyz2[d];
        }
        Self {
            a1,
            a2,
            oop,
            oo2p: 0.5 * oop,
            mu: a1 * a2 * oop,
            pa,
            pb,
            ab,
        }
    }
}

/// Which tables the recurrence fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Recurrence {
    Overlap,
    Kinetic,
}

/// Row-major (nam1 x nam2) tables for the three directions.
#[derive(Debug, Clone, Default)]
pub(crate) struct OsTables {
    nam2: usize,
    pub s: [Vec<f64>; 3],
    pub t: [Vec<f64>; 3],
}

impl OsTables {
    #[inline]
    pub fn idx(&self, i: u32, j: u32) -> usize {
        i as usize * self.nam2 + j as usize
    }

    fn reset(&mut self, nam1: usize, nam2: usize) {
        self.nam2 = nam2;
        for v in self.s.iter_mut().chain(self.t.iter_mut()) {
            v.clear();
            v.resize(nam1 * nam2, 0.0);
        }
    }

    fn fill(&mut self, nam1: usize, pair: &PrimitivePair, recurrence: Recurrence) {
        let nam2 = self.nam2;
        for d in 0..3 {
            overlap_1d(&mut self.s[d], nam1, nam2, pair, d);
            if recurrence == Recurrence::Kinetic {
                kinetic_1d(&self.s[d], &mut self.t[d], nam1, nam2, pair, d);
            }
        }
    }
}

pub(crate) fn overlap_1d(s: &mut [f64], nam1: usize, nam2: usize, pair: &PrimitivePair, d: usize) {
    let (pa, pb, oo2p) = (pair.pa[d], pair.pb[d], pair.oo2p);
    let at = |i: usize, j: usize| i * nam2 + j;

    s[0] = (PI * pair.oop).sqrt() * (-pair.mu * pair.ab[d] * pair.ab[d]).exp();

    for i in 1..nam1 {
        let mut v = pa * s[at(i - 1, 0)];
        if i > 1 {
            v += (i - 1) as f64 * oo2p * s[at(i - 2, 0)];
        }
        s[at(i, 0)] = v;
    }

    for j in 1..nam2 {
        let mut v = pb * s[at(0, j - 1)];
        if j > 1 {
            v += (j - 1) as f64 * oo2p * s[at(0, j - 2)];
        }
        s[at(0, j)] = v;
    }

    for i in 1..nam1 {
        for j in 1..nam2 {
            let mut v = pb * s[at(i, j - 1)] + oo2p * i as f64 * s[at(i - 1, j - 1)];
            if j > 1 {
                v += oo2p * (j - 1) as f64 * s[at(i, j - 2)];
            }
            s[at(i, j)] = v;
        }
    }
}

/// Kinetic energy table from a filled overlap table of the same shape.
pub(crate) fn kinetic_1d(
    s: &[f64],
    t: &mut [f64],
    nam1: usize,
    nam2: usize,
    pair: &PrimitivePair,
    d: usize,
) {
    let (pa, pb, oo2p, oop) = (pair.pa[d], pair.pb[d], pair.oo2p, pair.oop);
    let (a1, a2) = (pair.a1, pair.a2);
    let two_mu = 2.0 * pair.mu;
    let at = |i: usize, j: usize| i * nam2 + j;

    t[0] = s[0] * (a1 - 2.0 * a1 * a1 * (pa * pa + oo2p));

    for i in 1..nam1 {
        let mut v = pa * t[at(i - 1, 0)] + two_mu * s[at(i, 0)];
        if i > 1 {
            let f = (i - 1) as f64;
            v += f * oo2p * t[at(i - 2, 0)] - a2 * oop * f * s[at(i - 2, 0)];
        }
        t[at(i, 0)] = v;
    }

    for j in 1..nam2 {
        let mut v = pb * t[at(0, j - 1)] + two_mu * s[at(0, j)];
        if j > 1 {
            let f = (j - 1) as f64;
            v += f * oo2p * t[at(0, j - 2)] - a1 * oop * f * s[at(0, j - 2)];
        }
        t[at(0, j)] = v;
    }

    for i in 1..nam1 {
        for j in 1..nam2 {
            let mut v = pb * t[at(i, j - 1)]
                + oo2p * i as f64 * t[at(i - 1, j - 1)]
                + two_mu * s[at(i, j)];
            if j > 1 {
                let f = (j - 1) as f64;
                v += oo2p * f * t[at(i, j - 2)] - a1 * oop * f * s[at(i, j - 2)];
            }
            t[at(i, j)] = v;
        }
    }
}

/// Basis sets plus the reusable buffers of an Obara-Saika evaluator.
#[derive(Debug, Clone)]
pub(crate) struct OsState {
    pub bases: BasisPair,
    tables: OsTables,
    source: Vec<f64>,
    transform: SphericalTransform,
    extra_rows: usize,
}

impl OsState {
    /// `extra_rows` widens the first index of the tables, as needed by
    /// operators that raise the bra angular momentum.
    pub fn new(bs1: &BasisSet, bs2: &BasisSet, extra_rows: usize) -> Self {
        let bases = BasisPair::new(bs1, bs2);
        let nsource = bases.max_n_cartesian();
        let ntable = (bases.bs1.max_am() as usize + 1 + extra_rows) * (bases.bs2.max_am() as usize + 1);
        let mut tables = OsTables::default();
        for v in tables.s.iter_mut().chain(tables.t.iter_mut()) {
            v.reserve(ntable);
        }
        Self {
            bases,
            tables,
            source: Vec::with_capacity(nsource),
            transform: SphericalTransform::with_capacity(nsource),
            extra_rows,
        }
    }

    /// Evaluate one shell pair. `value` turns the tables of the current
    /// primitive pair into the cartesian integral between two components.
    pub fn calculate<F>(
        &mut self,
        shell1: usize,
        shell2: usize,
        out: &mut [f64],
        recurrence: Recurrence,
        value: F,
    ) -> Result<usize>
    where
        F: Fn(&OsTables, &[u32; 3], &[u32; 3]) -> f64,
    {
        let (sh1, sh2) = self.bases.shells(shell1, shell2)?;
        let nfunc = sh1.n_functions() * sh2.n_functions();
        check_buffer(nfunc, out.len())?;

        let nam1 = sh1.max_am() as usize + 1 + self.extra_rows;
        let nam2 = sh2.max_am() as usize + 1;
        let ncart = sh1.n_cartesian() * sh2.n_cartesian();
        self.tables.reset(nam1, nam2);
        self.source.clear();
        self.source.resize(ncart, 0.0);

        for a in 0..sh1.n_primitives() {
            for b in 0..sh2.n_primitives() {
                let pair = PrimitivePair::new(sh1.alpha(a), sh1.center(), sh2.alpha(b), sh2.center());
                self.tables.fill(nam1, &pair, recurrence);
                let tables = &self.tables;
                accumulate_pair(sh1, sh2, a, b, &mut self.source, |ijk1, ijk2| {
                    value(tables, ijk1, ijk2)
                });
            }
        }

        self.transform.transform_2(sh1, sh2, &self.source, out);
        Ok(nfunc)
    }
}

/// Add the contribution of primitive pair (a, b) to the cartesian block,
/// general contraction by general contraction.
pub(crate) fn accumulate_pair<F>(sh1: &Shell, sh2: &Shell, a: usize, b: usize, source: &mut [f64], value: F)
where
    F: Fn(&[u32; 3], &[u32; 3]) -> f64,
{
    let ncart2 = sh2.n_cartesian();
    let mut row = 0;
    for g1 in 0..sh1.n_general_contractions() {
        let ord1 = cartesian_ordering(sh1.general_am(g1));
        let mut col = 0;
        for g2 in 0..sh2.n_general_contractions() {
            let ord2 = cartesian_ordering(sh2.general_am(g2));
            let prefac = sh1.coef(g1, a) * sh2.coef(g2, b);
            for (i1, ijk1) in ord1.iter().enumerate() {
                let base = (row + i1) * ncart2 + col;
                for (i2, ijk2) in ord2.iter().enumerate() {
                    source[base + i2] += prefac * value(ijk1, ijk2);
                }
            }
            col += ord2.len();
        }
        row += ord1.len();
    }
}
