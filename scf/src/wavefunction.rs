use crate::blocked::{IrrepSpinMatrix, IrrepSpinVector};
use basis::System;
use std::sync::Arc;

/// A snapshot of a calculation: the system plus any of orbital coefficients,
/// density, occupations and orbital energies.
///
/// Components are shared immutably, so cloning is cheap and methods build a
/// new wavefunction rather than modifying the one they were given.
#[derive(Debug, Clone, Default)]
pub struct Wavefunction {
    system: Option<Arc<System>>,
    cmat: Option<Arc<IrrepSpinMatrix>>,
    opdm: Option<Arc<IrrepSpinMatrix>>,
    occupations: Option<Arc<IrrepSpinVector>>,
    epsilon: Option<Arc<IrrepSpinVector>>,
}

impl Wavefunction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_system(system: System) -> Self {
        Self::default().with_system(Arc::new(system))
    }

    pub fn with_system(mut self, system: Arc<System>) -> Self {
        self.system = Some(system);
        self
    }

    pub fn with_cmat(mut self, cmat: IrrepSpinMatrix) -> Self {
        self.cmat = Some(Arc::new(cmat));
        self
    }

    pub fn with_opdm(mut self, opdm: IrrepSpinMatrix) -> Self {
        self.opdm = Some(Arc::new(opdm));
        self
    }

    pub fn with_occupations(mut self, occupations: IrrepSpinVector) -> Self {
        self.occupations = Some(Arc::new(occupations));
        self
    }

    pub fn with_epsilon(mut self, epsilon: IrrepSpinVector) -> Self {
        self.epsilon = Some(Arc::new(epsilon));
        self
    }

    pub fn system(&self) -> Option<&Arc<System>> {
        self.system.as_ref()
    }

    pub fn cmat(&self) -> Option<&IrrepSpinMatrix> {
        self.cmat.as_deref()
    }

    pub fn opdm(&self) -> Option<&IrrepSpinMatrix> {
        self.opdm.as_deref()
    }

    pub fn occupations(&self) -> Option<&IrrepSpinVector> {
        self.occupations.as_deref()
    }

    pub fn epsilon(&self) -> Option<&IrrepSpinVector> {
        self.epsilon.as_deref()
    }
}
