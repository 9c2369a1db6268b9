//! Hartree-Fock SCF machinery on top of the `basis` integral evaluators.
//!
//! Every pluggable piece (integral evaluators, Fock builders, energy
//! methods) is created by key from a [`registry::ModuleRegistry`].

pub mod app;
pub mod blocked;
pub mod common;
pub mod config;
pub mod error;
pub mod fill;
pub mod fock;
pub mod guess;
pub mod io;
pub mod iterate;
pub mod linalg;
pub mod method;
pub mod property;
pub mod registry;
pub mod series;
pub mod wavefunction;

pub use error::{Result, ScfError};
pub use method::{DerivReturn, EnergyMethod};
pub use registry::{ModuleContext, ModuleRegistry};
pub use wavefunction::Wavefunction;
