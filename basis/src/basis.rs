use crate::error::{IntegralError, Result};
use crate::shell::{n_cartesian, Shell};
use serde::{Deserialize, Serialize};

/// An ordered collection of shells. Function indices run over the shells in
/// order, so shell `i` owns functions `shell_start(i) .. shell_start(i) + n`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasisSet {
    shells: Vec<Shell>,
    starts: Vec<usize>,
    n_functions: usize,
}

impl BasisSet {
    pub fn new(shells: Vec<Shell>) -> Self {
        let mut starts = Vec::with_capacity(shells.len());
        let mut n_functions = 0;
        for sh in &shells {
            starts.push(n_functions);
            n_functions += sh.n_functions();
        }
        Self {
            shells,
            starts,
            n_functions,
        }
    }

    pub fn n_shell(&self) -> usize {
        self.shells.len()
    }

    pub fn shells(&self) -> &[Shell] {
        &self.shells
    }

    pub fn shell(&self, i: usize) -> Result<&Shell> {
        self.shells.get(i).ok_or(IntegralError::ShellOutOfRange {
            index: i,
            n_shell: self.shells.len(),
        })
    }

    pub fn shell_start(&self, i: usize) -> usize {
        self.starts[i]
    }

    pub fn n_functions(&self) -> usize {
        self.n_functions
    }

    pub fn max_n_functions(&self) -> usize {
        self.shells.iter().map(Shell::n_functions).max().unwrap_or(0)
    }

    pub fn max_n_cartesian(&self) -> usize {
        self.shells.iter().map(Shell::n_cartesian).max().unwrap_or(0)
    }

    pub fn max_am(&self) -> u32 {
        self.shells.iter().map(Shell::max_am).max().unwrap_or(0)
    }

    /// Largest single-contraction cartesian block.
    pub fn max_n_cartesian_block(&self) -> usize {
        n_cartesian(self.max_am())
    }

    pub fn max_n_primitives(&self) -> usize {
        self.shells.iter().map(Shell::n_primitives).max().unwrap_or(0)
    }

    pub fn normalized(&self) -> Self {
        Self::new(self.shells.iter().map(Shell::normalized).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::ShellType;
    use nalgebra::Vector3;

    #[test]
    fn test_shell_starts() {
        let s = Shell::new(0, ShellType::Cartesian, Vector3::zeros(), vec![1.0], vec![vec![1.0]])
            .unwrap();
        let sp = Shell::new(
            -1,
            ShellType::Cartesian,
            Vector3::zeros(),
            vec![1.0],
            vec![vec![1.0], vec![1.0]],
        )
        .unwrap();
        let d = Shell::new(2, ShellType::Spherical, Vector3::zeros(), vec![1.0], vec![vec![1.0]])
            .unwrap();
        let bs = BasisSet::new(vec![s, sp, d]);
        assert_eq!(bs.n_shell(), 3);
        assert_eq!(bs.shell_start(0), 0);
        assert_eq!(bs.shell_start(1), 1);
        assert_eq!(bs.shell_start(2), 5);
        assert_eq!(bs.n_functions(), 10);
        assert_eq!(bs.max_n_functions(), 5);
        assert_eq!(bs.max_n_cartesian(), 6);
        assert_eq!(bs.max_am(), 2);
        assert!(bs.shell(3).is_err());
    }
}
