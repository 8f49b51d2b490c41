//! Search-tree nodes.
//!
//! A [`Branch`] is one node of the branch-and-bound tree: a contracted graph
//! together with its bound window and its depth. Queue ordering is by depth,
//! deepest first, so workers finish partially explored branches before
//! opening new ones and queue memory stays bounded.
//!
//! # Wire format
//!
//! ```text
//! lb:    i32 (little-endian)
//! ub:    u16 (little-endian)
//! depth: i32 (little-endian)
//! history bytes (see chroma_core::history)
//! ```
//!
//! The graph itself never crosses the wire; the receiver replays the history
//! onto its own copy of the root instance.

use crate::error::{SolveError, SolveResult};
use chroma_core::{Graph, GraphHistory};
use std::cmp::Ordering;

/// Fixed-size prefix of an encoded branch: lb, ub, depth.
const HEADER_SIZE: usize = 4 + 2 + 4;

/// One node of the search tree.
#[derive(Debug, Clone)]
pub struct Branch {
    /// The contracted graph this node works on. Owned uniquely; clones are
    /// made only when constructing children or snapshotting an incumbent.
    pub graph: Graph,
    /// Best known lower bound on the chromatic number of `graph`.
    pub lb: i32,
    /// Best known upper bound on the chromatic number of `graph`.
    pub ub: u16,
    /// Distance from the root; the root branch has depth 1.
    pub depth: i32,
}

impl Branch {
    pub fn new(graph: Graph, lb: i32, ub: u16, depth: i32) -> Self {
        debug_assert!(lb <= ub as i32, "branch created with lb {lb} > ub {ub}");
        Branch {
            graph,
            lb,
            ub,
            depth,
        }
    }

    /// Encode bounds, depth, and the graph's modification history.
    pub fn encode(&self) -> Vec<u8> {
        let history = self.graph.history().to_bytes();
        let mut buf = Vec::with_capacity(HEADER_SIZE + history.len());
        buf.extend_from_slice(&self.lb.to_le_bytes());
        buf.extend_from_slice(&self.ub.to_le_bytes());
        buf.extend_from_slice(&self.depth.to_le_bytes());
        buf.extend_from_slice(&history);
        buf
    }

    /// Decode a branch and materialize its graph by replaying the history
    /// onto `root`. The replayed graph carries no coloring.
    pub fn decode(bytes: &[u8], root: &Graph) -> SolveResult<Branch> {
        if bytes.len() < HEADER_SIZE {
            return Err(SolveError::TruncatedBranch { got: bytes.len() });
        }
        let lb = i32::from_le_bytes(bytes[0..4].try_into().unwrap());
        let ub = u16::from_le_bytes(bytes[4..6].try_into().unwrap());
        let depth = i32::from_le_bytes(bytes[6..10].try_into().unwrap());
        let history = GraphHistory::from_bytes(&bytes[HEADER_SIZE..])?;
        let graph = history.replay(root)?;
        Ok(Branch {
            graph,
            lb,
            ub,
            depth,
        })
    }
}

// Queue ordering is by depth alone; bounds and graph identity do not
// participate.
impl PartialEq for Branch {
    fn eq(&self, other: &Self) -> bool {
        self.depth == other.depth
    }
}

impl Eq for Branch {}

impl PartialOrd for Branch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Branch {
    fn cmp(&self, other: &Self) -> Ordering {
        self.depth.cmp(&other.depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn five_cycle() -> Graph {
        Graph::from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)])
    }

    #[test]
    fn encode_decode_preserves_fields_and_structure() {
        let root = five_cycle();
        let mut g = root.clone();
        g.merge_vertices(0, 2);
        g.add_edge(1, 3);
        let b = Branch::new(g, 3, 4, 3);

        let decoded = Branch::decode(&b.encode(), &root).unwrap();
        assert_eq!(decoded.lb, 3);
        assert_eq!(decoded.ub, 4);
        assert_eq!(decoded.depth, 3);
        assert_eq!(decoded.graph.history(), b.graph.history());
        assert_eq!(decoded.graph.num_vertices(), b.graph.num_vertices());
    }

    #[test]
    fn truncated_payload_is_rejected() {
        let root = five_cycle();
        let b = Branch::new(root.clone(), 2, 3, 1);
        let bytes = b.encode();
        assert!(matches!(
            Branch::decode(&bytes[..6], &root),
            Err(SolveError::TruncatedBranch { got: 6 })
        ));
    }

    #[test]
    fn ordering_is_by_depth() {
        let root = five_cycle();
        let shallow = Branch::new(root.clone(), 2, 3, 1);
        let deep = Branch::new(root, 2, 3, 5);
        assert!(deep > shallow);
    }

    proptest! {
        /// Header fields survive the round trip for arbitrary bound windows.
        #[test]
        fn header_round_trip(lb in -10i32..100, ub in 0u16..u16::MAX, depth in 1i32..10_000) {
            let root = five_cycle();
            let b = Branch { graph: root.clone(), lb, ub, depth };
            let decoded = Branch::decode(&b.encode(), &root).unwrap();
            prop_assert_eq!(decoded.lb, lb);
            prop_assert_eq!(decoded.ub, ub);
            prop_assert_eq!(decoded.depth, depth);
        }
    }
}
