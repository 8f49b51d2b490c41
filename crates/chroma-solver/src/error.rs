//! Solver errors.

use crate::fabric::FabricError;
use chroma_core::GraphError;
use thiserror::Error;

/// Errors surfaced by [`Solver::solve`](crate::solver::Solver::solve).
#[derive(Debug, Error)]
pub enum SolveError {
    /// The message fabric rejected an operation.
    #[error("fabric error: {0}")]
    Fabric(#[from] FabricError),

    /// A received branch payload could not be decoded or replayed.
    #[error("malformed branch payload: {0}")]
    Codec(#[from] GraphError),

    /// A branch payload ended before the fixed-size header.
    #[error("branch payload truncated at {got} bytes")]
    TruncatedBranch { got: usize },

    /// A role thread panicked; the search result is unusable.
    #[error("{role} thread panicked")]
    RolePanic { role: &'static str },
}

pub type SolveResult<T> = Result<T, SolveError>;
