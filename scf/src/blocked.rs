//! Data blocked by irreducible representation and spin.
//!
//! Spin 0 is a restricted (closed shell) block, +1 alpha and -1 beta. Within an
//! irrep the blocks are either a single restricted one or alpha/beta.

use crate::error::{Result, ScfError};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Irrep {
    A,
}

pub const SPIN_RESTRICTED: i32 = 0;
pub const SPIN_ALPHA: i32 = 1;
pub const SPIN_BETA: i32 = -1;

pub trait BlockShape {
    fn shape(&self) -> (usize, usize);
}

impl BlockShape for DMatrix<f64> {
    fn shape(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }
}

impl BlockShape for DVector<f64> {
    fn shape(&self) -> (usize, usize) {
        (self.len(), 1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IrrepSpinData<T> {
    blocks: BTreeMap<Irrep, BTreeMap<i32, T>>,
}

pub type IrrepSpinMatrix = IrrepSpinData<DMatrix<f64>>;
pub type IrrepSpinVector = IrrepSpinData<DVector<f64>>;

impl<T> Default for IrrepSpinData<T> {
    fn default() -> Self {
        Self {
            blocks: BTreeMap::new(),
        }
    }
}

impl<T> IrrepSpinData<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a block, replacing any previous one for the same (irrep, spin).
    pub fn insert(&mut self, irrep: Irrep, spin: i32, block: T) -> Result<()> {
        if !matches!(spin, SPIN_RESTRICTED | SPIN_ALPHA | SPIN_BETA) {
            return Err(ScfError::StructureMismatch(format!("invalid spin {}", spin)));
        }
        let spins = self.blocks.entry(irrep).or_default();
        let mixes = if spin == SPIN_RESTRICTED {
            spins.keys().any(|&s| s != SPIN_RESTRICTED)
        } else {
            spins.contains_key(&SPIN_RESTRICTED)
        };
        if mixes {
            return Err(ScfError::StructureMismatch(format!(
                "cannot mix restricted and unrestricted blocks in irrep {:?}",
                irrep
            )));
        }
        spins.insert(spin, block);
        Ok(())
    }

    pub fn get(&self, irrep: Irrep, spin: i32) -> Option<&T> {
        self.blocks.get(&irrep).and_then(|s| s.get(&spin))
    }

    pub fn irreps(&self) -> impl Iterator<Item = Irrep> + '_ {
        self.blocks.keys().copied()
    }

    /// Spins present for `irrep`, in ascending order.
    pub fn spins(&self, irrep: Irrep) -> Vec<i32> {
        self.blocks
            .get(&irrep)
            .map(|s| s.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn is_restricted(&self) -> bool {
        self.blocks
            .values()
            .all(|s| s.keys().all(|&spin| spin == SPIN_RESTRICTED))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Irrep, i32, &T)> {
        self.blocks
            .iter()
            .flat_map(|(&ir, spins)| spins.iter().map(move |(&s, b)| (ir, s, b)))
    }

    pub fn len(&self) -> usize {
        self.blocks.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Same (irrep, spin) keys, ignoring block contents.
    pub fn same_keys<U>(&self, other: &IrrepSpinData<U>) -> bool {
        self.iter()
            .map(|(ir, s, _)| (ir, s))
            .eq(other.iter().map(|(ir, s, _)| (ir, s)))
    }
}

impl<T: BlockShape> IrrepSpinData<T> {
    /// Same keys and same block shapes.
    pub fn same_structure<U: BlockShape>(&self, other: &IrrepSpinData<U>) -> bool {
        self.same_keys(other)
            && self
                .iter()
                .zip(other.iter())
                .all(|((_, _, a), (_, _, b))| a.shape() == b.shape())
    }
}
