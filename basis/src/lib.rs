//! Gaussian basis sets and the integrals over them.

pub mod basis;
pub mod error;
pub mod helper;
pub mod index;
pub mod integrals;
pub mod library;
pub mod shell;
pub mod system;
pub mod transform;

pub use basis::BasisSet;
pub use error::IntegralError;
pub use library::{BasisLibrary, ShellTemplate};
pub use shell::{Shell, ShellType};
pub use system::{Atom, System};
