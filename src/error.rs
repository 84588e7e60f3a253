use thiserror::Error;

use crate::validation::Violation;

pub type KlineResult<T> = Result<T, KlineError>;

#[derive(Debug, Error)]
pub enum KlineError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("upstream payload is not valid json: {0}")]
    Parse(String),

    #[error("upstream payload matches no known shape (top-level keys: {keys:?})")]
    UnrecognizedShape { keys: Vec<String> },

    #[error("upstream payload failed validation with {} violation(s)", .0.len())]
    Validation(Vec<Violation>),
}

impl KlineError {
    /// Returns the violation list for validation failures.
    #[must_use]
    pub fn violations(&self) -> Option<&[Violation]> {
        match self {
            Self::Validation(violations) => Some(violations),
            _ => None,
        }
    }
}
