//! Error types for hydraulic solves.

use thiserror::Error;

/// Errors that can occur while solving the network hydraulics.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Problem setup error: {what}")]
    ProblemSetup { what: String },

    #[error("Convergence failed: {what}")]
    ConvergenceFailed { what: String },

    #[error("Numeric error: {what}")]
    Numeric { what: String },
}

pub type SolverResult<T> = Result<T, SolverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = SolverError::ConvergenceFailed {
            what: "residual 3e-2".into(),
        };
        assert!(err.to_string().contains("residual 3e-2"));
    }
}
