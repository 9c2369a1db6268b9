//! McMurchie-Davidson Hermite expansion tables.

use crate::helper::boys_values;

/// Hermite expansion coefficients E^{ij}_t of one cartesian direction for a
/// primitive pair, for i <= la, j <= lb and t <= i + j.
#[derive(Debug, Clone, Default)]
pub(crate) struct HermiteE {
    lb1: usize,
    nt: usize,
    data: Vec<f64>,
}

impl HermiteE {
    #[inline]
    fn at(&self, i: usize, j: usize, t: usize) -> usize {
        (i * self.lb1 + j) * self.nt + t
    }

    #[inline]
    pub fn get(&self, i: u32, j: u32, t: usize) -> f64 {
        self.data[self.at(i as usize, j as usize, t)]
    }

    /// `xab` is A - B along this direction.
    pub fn build(&mut self, la: usize, lb: usize, a: f64, b: f64, xab: f64) {
        let p = a + b;
        let oo2p = 0.5 / p;
        let xpa = -b / p * xab;
        let xpb = a / p * xab;
        self.lb1 = lb + 1;
        self.nt = la + lb + 1;
        self.data.clear();
        self.data.resize((la + 1) * self.lb1 * self.nt, 0.0);

        let e00 = self.at(0, 0, 0);
        self.data[e00] = (-a * b / p * xab * xab).exp();

        for i in 1..=la {
            for t in 0..=i {
                let v = self.raise(i - 1, 0, t, oo2p, xpa);
                let idx = self.at(i, 0, t);
                self.data[idx] = v;
            }
        }
        for i in 0..=la {
            for j in 1..=lb {
                for t in 0..=i + j {
                    let v = self.raise(i, j - 1, t, oo2p, xpb);
                    let idx = self.at(i, j, t);
                    self.data[idx] = v;
                }
            }
        }
    }

    /// oo2p E_{t-1} + X E_t + (t + 1) E_{t+1} of the (i, j) entry.
    fn raise(&self, i: usize, j: usize, t: usize, oo2p: f64, x: f64) -> f64 {
        let tmax = i + j;
        let mut v = 0.0;
        if t > 0 && t - 1 <= tmax {
            v += oo2p * self.data[self.at(i, j, t - 1)];
        }
        if t <= tmax {
            v += x * self.data[self.at(i, j, t)];
        }
        if t + 1 <= tmax {
            v += (t + 1) as f64 * self.data[self.at(i, j, t + 1)];
        }
        v
    }
}

/// Hermite Coulomb integrals R^0_{tuv}(alpha, R_PC) for t + u + v <= lmax.
#[derive(Debug, Clone, Default)]
pub(crate) struct HermiteR {
    dim: usize,
    data: Vec<f64>,
    boys: Vec<f64>,
}

impl HermiteR {
    #[inline]
    fn at(&self, n: usize, t: usize, u: usize, v: usize) -> usize {
        ((n * self.dim + t) * self.dim + u) * self.dim + v
    }

    #[inline]
    pub fn get(&self, t: usize, u: usize, v: usize) -> f64 {
        self.data[self.at(0, t, u, v)]
    }

    pub fn build(&mut self, lmax: usize, alpha: f64, pc: [f64; 3]) {
        self.dim = lmax + 1;
        self.data.clear();
        self.data.resize(self.dim.pow(4), 0.0);
        self.boys.resize(lmax + 1, 0.0);

        let r2 = pc[0] * pc[0] + pc[1] * pc[1] + pc[2] * pc[2];
        boys_values(lmax, alpha * r2, &mut self.boys);
        let mut scale = 1.0;
        for n in 0..=lmax {
            let idx = self.at(n, 0, 0, 0);
            self.data[idx] = scale * self.boys[n];
            scale *= -2.0 * alpha;
        }

        for order in 1..=lmax {
            for n in 0..=lmax - order {
                for t in 0..=order {
                    for u in 0..=order - t {
                        let v = order - t - u;
                        let value = if t > 0 {
                            self.step(n, [t, u, v], 0, pc[0])
                        } else if u > 0 {
                            self.step(n, [t, u, v], 1, pc[1])
                        } else {
                            self.step(n, [t, u, v], 2, pc[2])
                        };
                        let idx = self.at(n, t, u, v);
                        self.data[idx] = value;
                    }
                }
            }
        }
    }

    /// Lower index `d` of `tuv` by one: (k - 1) R^{n+1}_{k-2} + X R^{n+1}_{k-1}.
    fn step(&self, n: usize, tuv: [usize; 3], d: usize, x: f64) -> f64 {
        let k = tuv[d];
        let mut lower = tuv;
        lower[d] = k - 1;
        let mut value = x * self.data[self.at(n + 1, lower[0], lower[1], lower[2])];
        if k > 1 {
            lower[d] = k - 2;
            value += (k - 1) as f64 * self.data[self.at(n + 1, lower[0], lower[1], lower[2])];
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_e_overlap_moments() {
        // E^{ij}_0 sqrt(pi/p) is the 1d overlap
        let (a, b, xab) = (0.9, 0.4, 0.7);
        let mut e = HermiteE::default();
        e.build(2, 2, a, b, xab);
        let p: f64 = a + b;
        let s00 = e.get(0, 0, 0) * (PI / p).sqrt();
        let expected = (PI / p).sqrt() * (-a * b / p * xab * xab).exp();
        assert!((s00 - expected).abs() < 1e-14);
        // E^{10}_1 = 1/(2p) E^{00}_0
        assert!((e.get(1, 0, 1) - e.get(0, 0, 0) / (2.0 * p)).abs() < 1e-14);
    }

    #[test]
    fn test_r_000_is_boys() {
        let mut r = HermiteR::default();
        r.build(3, 1.2, [0.3, -0.2, 0.5]);
        let x = 1.2 * (0.09 + 0.04 + 0.25);
        assert!((r.get(0, 0, 0) - crate::helper::boys_function(0, x)).abs() < 1e-14);
        // R_100 = X R^1_000 = -2 alpha X F_1
        let r100 = 0.3 * -2.0 * 1.2 * crate::helper::boys_function(1, x);
        assert!((r.get(1, 0, 0) - r100).abs() < 1e-13);
    }
}
