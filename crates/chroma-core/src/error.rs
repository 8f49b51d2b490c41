//! Error types for graph construction and history decoding.

use thiserror::Error;

/// Errors produced while parsing instances or decoding modification histories.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Malformed DIMACS input.
    #[error("dimacs parse error at line {line}: {message}")]
    Dimacs { line: usize, message: String },

    /// Instance larger than the solver's vertex-id width supports.
    #[error("instance has {vertices} vertices, maximum supported is {max}")]
    TooManyVertices { vertices: usize, max: usize },

    /// A history buffer ended before the declared number of operations.
    #[error("history truncated: needed {expected} bytes, got {got}")]
    HistoryTruncated { expected: usize, got: usize },

    /// A history buffer contained an operation tag that is neither merge nor add-edge.
    #[error("unknown history op tag {tag}")]
    HistoryBadTag { tag: u8 },

    /// A history operation names a vertex id the root graph does not have.
    #[error("history references vertex {vertex} outside graph of order {order}")]
    HistoryVertexOutOfRange { vertex: u32, order: usize },

    /// A history operation is not applicable to the graph it reached, e.g.
    /// it names a vertex already removed by an earlier merge.
    #[error("history op {index} names a dead or identical vertex pair ({u}, {v})")]
    HistoryInvalidOp { index: usize, u: u32, v: u32 },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type GraphResult<T> = Result<T, GraphError>;
