use basis::IntegralError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScfError {
    #[error("not implemented: {0}")]
    NotImplemented(String),

    #[error("inconsistent result: calculated {calculated} values, expected {expected}")]
    InconsistentResult { calculated: usize, expected: usize },

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("structure mismatch: {0}")]
    StructureMismatch(String),

    #[error("number of electrons {0} is not an integer")]
    NonIntegerOccupation(f64),

    #[error("argument count mismatch: {0}")]
    ArgumentCountMismatch(String),

    #[error("no {kind} module registered under key '{key}'")]
    UnknownModule { kind: &'static str, key: String },

    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),

    #[error(transparent)]
    Integral(#[from] IntegralError),
}

pub type Result<T> = std::result::Result<T, ScfError>;
