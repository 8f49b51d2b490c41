//! chroma-solver - distributed branch-and-bound for the chromatic number
//!
//! This crate provides:
//! - **Branch**: search-tree nodes with a compact history-based wire codec
//! - **Fabric**: the message-passing seam between ranks, with an in-process
//!   implementation for running a whole rank group inside one process
//! - **Role threads**: per-rank terminator / gatherer / employer / worker
//!   choreography with cooperative, cancellable polling throughout
//! - **Solver**: the public solve entry point, returning the chromatic
//!   number and recoloring the input graph with a witness on rank 0
//!
//! # Quick Start
//!
//! ```rust
//! use chroma_core::{DsaturColorStrategy, Graph, GreedyCliqueStrategy,
//!     NeighboursBranchingStrategy};
//! use chroma_solver::{run_group, SearchVariant, SolveParams, Solver};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! // A 5-cycle needs three colors. Solve it on a group of two ranks.
//! let root = Graph::from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)]);
//! let solver = Solver::new(
//!     Arc::new(NeighboursBranchingStrategy),
//!     Arc::new(GreedyCliqueStrategy),
//!     Arc::new(DsaturColorStrategy),
//!     SearchVariant::Standard,
//! );
//! let params = SolveParams {
//!     timeout: Duration::from_secs(10),
//!     gather_period: Duration::from_millis(100),
//!     expected_chi: Some(3),
//! };
//! let reports = run_group(2, |fabric| {
//!     let mut graph = root.clone();
//!     solver.solve(&fabric, &mut graph, &params).unwrap()
//! });
//! assert!(reports.iter().all(|r| r.chi == 3));
//! ```

pub mod branch;
pub mod error;
pub mod fabric;
pub mod queue;
pub mod solver;

mod employer;
mod gatherer;
mod shared;
mod steal;
mod terminator;
mod wire;
mod witness;
mod worker;

// Re-exports
pub use branch::Branch;
pub use error::{SolveError, SolveResult};
pub use fabric::{
    run_group, Envelope, Fabric, FabricError, LocalFabric, Message, Rank, Source, Tag,
    TAG_IDLE, TAG_SOLUTION_FOUND, TAG_TIMEOUT_SOLUTION, TAG_WORK_REQUEST, TAG_WORK_RESPONSE,
    TAG_WORK_STEALING,
};
pub use queue::BranchQueue;
pub use solver::{SearchVariant, SolveParams, SolveReport, Solver};
