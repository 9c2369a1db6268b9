//! Cartesian to real solid harmonic transformation.
//!
//! Spherical functions of angular momentum l are ordered m = -l .. l. The
//! coefficients act on cartesian functions normalized like x^l, which is the
//! convention `Shell::normalized` produces.

use crate::helper::{binomial, double_factorial, factorial};
use crate::shell::{cartesian_ordering, n_cartesian, n_spherical, Shell, MAX_AM};
use std::f64::consts::SQRT_2;
use std::sync::OnceLock;

fn parity(i: i32) -> f64 {
    if i % 2 != 0 {
        -1.0
    } else {
        1.0
    }
}

fn bc(n: i32, k: i32) -> f64 {
    if n < 0 || k < 0 {
        return 0.0;
    }
    binomial(n as u32, k as u32)
}

fn fac(n: i32) -> f64 {
    factorial(n as u32)
}

/// Coefficient of the cartesian component x^lx y^ly z^lz in the real solid
/// harmonic (l, m).
pub fn solid_harmonic_coefficient(l: u32, m: i32, lx: u32, ly: u32, lz: u32) -> f64 {
    let (l, lx, ly, lz) = (l as i32, lx as i32, ly as i32, lz as i32);
    let abs_m = m.abs();
    if (lx + ly - abs_m) % 2 != 0 {
        return 0.0;
    }
    let j = (lx + ly - abs_m) / 2;
    if j < 0 {
        return 0.0;
    }
    let comp = if m >= 0 { 1.0 } else { -1.0 };
    let i = abs_m - lx;
    if comp != parity(i.abs()) {
        return 0.0;
    }

    let mut pfac = (fac(2 * lx) * fac(2 * ly) * fac(2 * lz) * fac(l) * fac(l - abs_m)
        / (fac(2 * l) * fac(lx) * fac(ly) * fac(lz) * fac(l + abs_m)))
        .sqrt();
    pfac /= 2.0_f64.powi(l) * fac(l);
    pfac *= if m < 0 {
        parity((i - 1) / 2)
    } else {
        parity(i / 2)
    };

    let mut sum = 0.0;
    for i in j..=(l - abs_m) / 2 {
        let pfac1 = bc(l, i) * bc(i, j) * parity(i) * fac(2 * (l - i)) / fac(l - abs_m - 2 * i);
        let k_min = ((lx - abs_m) / 2).max(0);
        let k_max = j.min(lx / 2);
        let mut sum1 = 0.0;
        for k in k_min..=k_max {
            if lx - 2 * k <= abs_m {
                sum1 += bc(j, k) * bc(abs_m, lx - 2 * k) * parity(k);
            }
        }
        sum += pfac1 * sum1;
    }
    sum *= (double_factorial(2 * l - 1)
        / (double_factorial(2 * lx - 1) * double_factorial(2 * ly - 1) * double_factorial(2 * lz - 1)))
    .sqrt();

    if m == 0 {
        pfac * sum
    } else {
        SQRT_2 * pfac * sum
    }
}

/// Row-major (2l+1) x n_cartesian(l) coefficient matrix.
pub fn spherical_matrix(l: u32) -> &'static [f64] {
    static TABLE: OnceLock<Vec<Vec<f64>>> = OnceLock::new();
    let table = TABLE.get_or_init(|| {
        (0..=MAX_AM)
            .map(|l| {
                let mut coefs = Vec::with_capacity(n_spherical(l) * n_cartesian(l));
                for m in -(l as i32)..=(l as i32) {
                    for &[lx, ly, lz] in cartesian_ordering(l) {
                        coefs.push(solid_harmonic_coefficient(l, m, lx, ly, lz));
                    }
                }
                coefs
            })
            .collect()
    });
    &table[l as usize]
}

/// Transforms row-major blocks of integrals from cartesian to spherical
/// functions, one index at a time, reusing two scratch buffers.
#[derive(Debug, Clone, Default)]
pub struct SphericalTransform {
    current: Vec<f64>,
    next: Vec<f64>,
}

impl SphericalTransform {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            current: Vec::with_capacity(n),
            next: Vec::with_capacity(n),
        }
    }

    /// One-electron block, rows over `sh1`.
    pub fn transform_2(&mut self, sh1: &Shell, sh2: &Shell, src: &[f64], dst: &mut [f64]) {
        self.apply([sh1, sh2], src, dst);
    }

    pub fn transform_4(&mut self, shells: [&Shell; 4], src: &[f64], dst: &mut [f64]) {
        self.apply(shells, src, dst);
    }

    /// `src` holds the cartesian block indexed like `shells`, `dst` receives the
    /// block over the shells' final functions. Cartesian shells are copied through.
    fn apply<const N: usize>(&mut self, shells: [&Shell; N], src: &[f64], dst: &mut [f64]) {
        let mut dims = shells.map(Shell::n_cartesian);
        let total: usize = dims.iter().product();
        if !shells.iter().any(|sh| sh.is_spherical()) {
            dst[..total].copy_from_slice(&src[..total]);
            return;
        }

        self.current.clear();
        self.current.extend_from_slice(&src[..total]);
        for (axis, sh) in shells.iter().enumerate() {
            if !sh.is_spherical() {
                continue;
            }
            let outer: usize = dims[..axis].iter().product();
            let inner: usize = dims[axis + 1..].iter().product();
            let nfunc = sh.n_functions();
            self.next.clear();
            self.next.resize(outer * nfunc * inner, 0.0);
            transform_axis(sh, &self.current, &mut self.next, outer, dims[axis], inner);
            dims[axis] = nfunc;
            std::mem::swap(&mut self.current, &mut self.next);
        }
        let n: usize = dims.iter().product();
        dst[..n].copy_from_slice(&self.current[..n]);
    }
}

fn transform_axis(sh: &Shell, src: &[f64], dst: &mut [f64], outer: usize, ncart: usize, inner: usize) {
    let nfunc = sh.n_functions();
    let mut cart_offset = 0;
    let mut sph_offset = 0;
    for g in 0..sh.n_general_contractions() {
        let l = sh.general_am(g);
        let (nc, ns) = (n_cartesian(l), n_spherical(l));
        let coefs = spherical_matrix(l);
        for o in 0..outer {
            for s in 0..ns {
                let dst_row = (o * nfunc + sph_offset + s) * inner;
                for c in 0..nc {
                    let w = coefs[s * nc + c];
                    if w == 0.0 {
                        continue;
                    }
                    let src_row = (o * ncart + cart_offset + c) * inner;
                    for i in 0..inner {
                        dst[dst_row + i] += w * src[src_row + i];
                    }
                }
            }
        }
        cart_offset += nc;
        sph_offset += ns;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::ShellType;
    use nalgebra::Vector3;

    #[test]
    fn test_d_coefficients() {
        assert!((solid_harmonic_coefficient(2, -2, 1, 1, 0) - 3.0_f64.sqrt()).abs() < 1e-12);
        assert!((solid_harmonic_coefficient(2, 0, 0, 0, 2) - 1.0).abs() < 1e-12);
        assert!((solid_harmonic_coefficient(2, 0, 2, 0, 0) + 0.5).abs() < 1e-12);
        assert!((solid_harmonic_coefficient(2, 0, 0, 2, 0) + 0.5).abs() < 1e-12);
        assert!((solid_harmonic_coefficient(2, 2, 2, 0, 0) - 0.5 * 3.0_f64.sqrt()).abs() < 1e-12);
        assert!((solid_harmonic_coefficient(2, 2, 0, 2, 0) + 0.5 * 3.0_f64.sqrt()).abs() < 1e-12);
        assert_eq!(solid_harmonic_coefficient(2, 1, 1, 1, 0), 0.0);
    }

    #[test]
    fn test_p_is_a_permutation() {
        // m = -1, 0, 1 are y, z, x
        let p = spherical_matrix(1);
        assert_eq!(p.len(), 9);
        let expected = [0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0];
        for (a, b) in p.iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_transform_sp_block() {
        let sp = Shell::new(
            -1,
            ShellType::Spherical,
            Vector3::zeros(),
            vec![1.0],
            vec![vec![1.0], vec![1.0]],
        )
        .unwrap();
        let s = Shell::new(0, ShellType::Cartesian, Vector3::zeros(), vec![1.0], vec![vec![1.0]])
            .unwrap();
        let src = [1.0, 2.0, 3.0, 4.0];
        let mut dst = [0.0; 4];
        let mut tr = SphericalTransform::with_capacity(4);
        tr.transform_2(&sp, &s, &src, &mut dst);
        assert_eq!(dst, [1.0, 3.0, 4.0, 2.0]);
        tr.transform_2(&s, &sp, &src, &mut dst);
        assert_eq!(dst, [1.0, 3.0, 4.0, 2.0]);
    }
}
