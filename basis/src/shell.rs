//! Contracted gaussian shells.
//!
//! A shell groups the functions sharing one center and one set of primitive
//! exponents. Each general contraction carries its own coefficients and angular
//! momentum. A negative shell angular momentum marks a combined shell: `-1` is
//! an sp shell, `-2` an spd shell, and so on.

use crate::error::{IntegralError, Result};
use crate::helper::{double_factorial, primitive_norm};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::sync::OnceLock;

/// Highest angular momentum the evaluators handle.
pub const MAX_AM: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShellType {
    #[default]
    Cartesian,
    Spherical,
}

pub fn n_cartesian(l: u32) -> usize {
    ((l + 1) * (l + 2) / 2) as usize
}

pub fn n_spherical(l: u32) -> usize {
    (2 * l + 1) as usize
}

/// Cartesian exponents (lx, ly, lz) of angular momentum `l`.
///
/// lx runs from l down to 0, and for each lx, ly runs from l - lx down to 0.
pub fn cartesian_ordering(l: u32) -> &'static [[u32; 3]] {
    static TABLE: OnceLock<Vec<Vec<[u32; 3]>>> = OnceLock::new();
    let table = TABLE.get_or_init(|| {
        (0..=MAX_AM)
            .map(|l| {
                let mut ordering = Vec::with_capacity(n_cartesian(l));
                for lx in (0..=l).rev() {
                    for ly in (0..=l - lx).rev() {
                        ordering.push([lx, ly, l - lx - ly]);
                    }
                }
                ordering
            })
            .collect()
    });
    &table[l as usize]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shell {
    center: Vector3<f64>,
    am: i32,
    shell_type: ShellType,
    exponents: Vec<f64>,
    coefs: Vec<Vec<f64>>,
    general_am: Vec<u32>,
    normalized: bool,
}

impl Shell {
    /// `coefs[g][i]` is the coefficient of primitive `i` in general contraction `g`.
    pub fn new(
        am: i32,
        shell_type: ShellType,
        center: Vector3<f64>,
        exponents: Vec<f64>,
        coefs: Vec<Vec<f64>>,
    ) -> Result<Self> {
        if am.unsigned_abs() > MAX_AM {
            return Err(IntegralError::InvalidShell(format!(
                "angular momentum {} exceeds the supported maximum {}",
                am, MAX_AM
            )));
        }
        if exponents.is_empty() {
            return Err(IntegralError::InvalidShell("shell has no primitives".into()));
        }
        if exponents.iter().any(|&a| !(a > 0.0)) {
            return Err(IntegralError::InvalidShell(
                "exponents must be positive".into(),
            ));
        }
        let general_am: Vec<u32> = if am < 0 {
            (0..=am.unsigned_abs()).collect()
        } else {
            vec![am as u32; coefs.len()]
        };
        if coefs.is_empty() || coefs.len() != general_am.len() {
            return Err(IntegralError::InvalidShell(format!(
                "shell with am {} has {} coefficient sets",
                am,
                coefs.len()
            )));
        }
        if coefs.iter().any(|c| c.len() != exponents.len()) {
            return Err(IntegralError::InvalidShell(
                "coefficient count does not match the number of primitives".into(),
            ));
        }
        Ok(Self {
            center,
            am,
            shell_type,
            exponents,
            coefs,
            general_am,
            normalized: false,
        })
    }

    pub fn center(&self) -> &Vector3<f64> {
        &self.center
    }

    pub fn with_center(&self, center: Vector3<f64>) -> Self {
        Self {
            center,
            ..self.clone()
        }
    }

    pub fn am(&self) -> i32 {
        self.am
    }

    /// Largest angular momentum among the general contractions.
    pub fn max_am(&self) -> u32 {
        self.am.unsigned_abs()
    }

    pub fn shell_type(&self) -> ShellType {
        self.shell_type
    }

    pub fn is_spherical(&self) -> bool {
        self.shell_type == ShellType::Spherical
    }

    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    pub fn n_primitives(&self) -> usize {
        self.exponents.len()
    }

    pub fn n_general_contractions(&self) -> usize {
        self.coefs.len()
    }

    pub fn alpha(&self, i: usize) -> f64 {
        self.exponents[i]
    }

    pub fn exponents(&self) -> &[f64] {
        &self.exponents
    }

    pub fn coef(&self, g: usize, i: usize) -> f64 {
        self.coefs[g][i]
    }

    pub fn general_am(&self, g: usize) -> u32 {
        self.general_am[g]
    }

    /// Functions produced by general contraction `g`.
    pub fn n_functions_for(&self, g: usize) -> usize {
        match self.shell_type {
            ShellType::Cartesian => n_cartesian(self.general_am[g]),
            ShellType::Spherical => n_spherical(self.general_am[g]),
        }
    }

    pub fn n_functions(&self) -> usize {
        (0..self.n_general_contractions())
            .map(|g| self.n_functions_for(g))
            .sum()
    }

    /// Functions before any spherical transformation.
    pub fn n_cartesian(&self) -> usize {
        self.general_am.iter().map(|&l| n_cartesian(l)).sum()
    }

    /// Rescale coefficients so that every function of the shell has unit norm,
    /// assuming the stored coefficients multiply normalized primitives.
    ///
    /// Normalizing an already normalized shell returns it unchanged.
    pub fn normalized(&self) -> Self {
        if self.normalized {
            return self.clone();
        }
        let mut coefs = self.coefs.clone();
        for (g, c) in coefs.iter_mut().enumerate() {
            let l = self.general_am[g];
            for (ci, &a) in c.iter_mut().zip(&self.exponents) {
                *ci *= primitive_norm(a, l);
            }
            let dfac = double_factorial(2 * l as i32 - 1);
            let mut norm = 0.0;
            for (i, &ai) in self.exponents.iter().enumerate() {
                for (j, &aj) in self.exponents.iter().enumerate() {
                    let p = ai + aj;
                    norm += c[i] * c[j] * (PI / p).powf(1.5) * dfac / (2.0 * p).powi(l as i32);
                }
            }
            let scale = 1.0 / norm.sqrt();
            c.iter_mut().for_each(|ci| *ci *= scale);
        }
        Self {
            coefs,
            normalized: true,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sp_shell() -> Shell {
        Shell::new(
            -1,
            ShellType::Cartesian,
            Vector3::zeros(),
            vec![5.0331513, 1.1695961, 0.3803890],
            vec![
                vec![-0.09996723, 0.39951283, 0.70011547],
                vec![0.15591627, 0.60768372, 0.39195739],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_cartesian_ordering() {
        assert_eq!(cartesian_ordering(0), &[[0, 0, 0]]);
        assert_eq!(cartesian_ordering(1), &[[1, 0, 0], [0, 1, 0], [0, 0, 1]]);
        assert_eq!(
            cartesian_ordering(2),
            &[[2, 0, 0], [1, 1, 0], [1, 0, 1], [0, 2, 0], [0, 1, 1], [0, 0, 2]]
        );
        for l in 0..=MAX_AM {
            assert_eq!(cartesian_ordering(l).len(), n_cartesian(l));
        }
    }

    #[test]
    fn test_combined_shell_counts() {
        let sh = sp_shell();
        assert_eq!(sh.n_general_contractions(), 2);
        assert_eq!(sh.general_am(0), 0);
        assert_eq!(sh.general_am(1), 1);
        assert_eq!(sh.n_functions(), 4);
        assert_eq!(sh.max_am(), 1);

        let d = Shell::new(2, ShellType::Spherical, Vector3::zeros(), vec![1.0], vec![vec![1.0]])
            .unwrap();
        assert_eq!(d.n_functions(), 5);
        assert_eq!(d.n_cartesian(), 6);
    }

    #[test]
    fn test_invalid_shells() {
        let center = Vector3::zeros();
        assert!(Shell::new(0, ShellType::Cartesian, center, vec![], vec![vec![]]).is_err());
        assert!(Shell::new(-1, ShellType::Cartesian, center, vec![1.0], vec![vec![1.0]]).is_err());
        assert!(Shell::new(1, ShellType::Cartesian, center, vec![1.0], vec![vec![1.0, 2.0]]).is_err());
        assert!(Shell::new(9, ShellType::Cartesian, center, vec![1.0], vec![vec![1.0]]).is_err());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = sp_shell().normalized();
        let twice = once.normalized();
        assert!(once.is_normalized());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_single_primitive_norm() {
        let alpha = 0.5;
        let sh = Shell::new(0, ShellType::Cartesian, Vector3::zeros(), vec![alpha], vec![vec![3.0]])
            .unwrap()
            .normalized();
        let expected = (2.0 * alpha / PI).powf(0.75);
        assert!((sh.coef(0, 0) - expected).abs() < 1e-12);
    }
}
