use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum IntegralError {
    #[error("not implemented: {0}")]
    NotImplemented(String),

    #[error("buffer is too small: size {provided}, required {required}")]
    InsufficientBuffer { required: usize, provided: usize },

    #[error("invalid shell: {0}")]
    InvalidShell(String),

    #[error("{0} used before initialize")]
    Uninitialized(&'static str),

    #[error("shell index {index} out of range for a basis set with {n_shell} shells")]
    ShellOutOfRange { index: usize, n_shell: usize },

    #[error("unknown element '{0}'")]
    UnknownElement(String),

    #[error("basis set '{0}' is not available")]
    UnknownBasisSet(String),

    #[error("no basis functions for element '{element}' in basis set '{basis}'")]
    MissingElement { basis: String, element: String },
}

pub type Result<T> = std::result::Result<T, IntegralError>;
