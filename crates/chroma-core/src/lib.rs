//! chroma-core - graph model and bound oracles for chromatic-number search
//!
//! This crate provides:
//! - **Graph**: an undirected simple graph supporting the two search
//!   mutations, edge insertion and vertex contraction, with a replayable
//!   modification history
//! - **DIMACS parsing**: the standard coloring-benchmark input format
//! - **Bound oracles**: clique lower bounds, coloring upper bounds, and
//!   branching-pair selection, each behind a trait so the search engine can
//!   be configured with different strategies
//!
//! # Quick Start
//!
//! ```rust
//! use chroma_core::{CliqueBound, ColorStrategy, Graph};
//! use chroma_core::{DsaturColorStrategy, GreedyCliqueStrategy};
//!
//! // A 5-cycle: clique number 2, chromatic number 3.
//! let mut g = Graph::from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)]);
//! let lb = GreedyCliqueStrategy.find_clique(&g);
//! let ub = DsaturColorStrategy.color(&mut g);
//! assert!(lb as u16 <= ub);
//! assert!(g.is_proper_coloring());
//! ```

pub mod branching;
pub mod clique;
pub mod color;
pub mod dimacs;
pub mod error;
pub mod graph;
pub mod history;

// Re-exports
pub use branching::{BranchingStrategy, NeighboursBranchingStrategy};
pub use clique::{CliqueBound, GreedyCliqueStrategy};
pub use color::{ColorStrategy, DsaturColorStrategy, GreedyColorStrategy};
pub use error::{GraphError, GraphResult};
pub use graph::{ColorId, Graph, Vertex};
pub use history::{GraphHistory, GraphOp};
