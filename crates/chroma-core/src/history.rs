//! Modification history of a graph relative to its root instance.
//!
//! Search-tree nodes are exchanged between processes as the ordered list of
//! merge / add-edge decisions taken on the path from the root, not as a full
//! adjacency structure. The receiver replays the list onto its own copy of
//! the root graph, which is always cheaper to transmit than the graph itself
//! and grows linearly with search depth.
//!
//! # Wire format
//!
//! ```text
//! op_count: u32 (little-endian)
//! op_count records of:
//!   kind: u8   - 0 = merge, 1 = add-edge
//!   u:    u32  (little-endian)
//!   v:    u32  (little-endian)
//! ```

use crate::error::{GraphError, GraphResult};
use crate::graph::{Graph, Vertex};

/// A single branching decision applied to the root graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphOp {
    /// Contract `v` into `u`: both vertices take the same color.
    Merge(Vertex, Vertex),
    /// Insert the edge `(u, v)`: the vertices must take distinct colors.
    AddEdge(Vertex, Vertex),
}

const OP_MERGE: u8 = 0;
const OP_ADD_EDGE: u8 = 1;

/// Size of one encoded operation: tag byte plus two vertex ids.
const OP_RECORD_SIZE: usize = 1 + 4 + 4;

/// Ordered sequence of [`GraphOp`]s recorded by the mutating graph
/// operations, sufficient to reconstruct the graph from the root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphHistory {
    ops: Vec<GraphOp>,
}

impl GraphHistory {
    pub fn new() -> Self {
        GraphHistory { ops: Vec::new() }
    }

    pub(crate) fn push(&mut self, op: GraphOp) {
        self.ops.push(op);
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[GraphOp] {
        &self.ops
    }

    /// Encode the history into the packed little-endian wire format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(4 + self.ops.len() * OP_RECORD_SIZE);
        buf.extend_from_slice(&(self.ops.len() as u32).to_le_bytes());
        for op in &self.ops {
            let (kind, u, v) = match *op {
                GraphOp::Merge(u, v) => (OP_MERGE, u, v),
                GraphOp::AddEdge(u, v) => (OP_ADD_EDGE, u, v),
            };
            buf.push(kind);
            buf.extend_from_slice(&u.to_le_bytes());
            buf.extend_from_slice(&v.to_le_bytes());
        }
        buf
    }

    /// Decode a history from the packed wire format.
    pub fn from_bytes(bytes: &[u8]) -> GraphResult<Self> {
        if bytes.len() < 4 {
            return Err(GraphError::HistoryTruncated {
                expected: 4,
                got: bytes.len(),
            });
        }
        let count = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        let expected = 4 + count * OP_RECORD_SIZE;
        if bytes.len() < expected {
            return Err(GraphError::HistoryTruncated {
                expected,
                got: bytes.len(),
            });
        }

        let mut ops = Vec::with_capacity(count);
        let mut at = 4;
        for _ in 0..count {
            let kind = bytes[at];
            let u = u32::from_le_bytes(bytes[at + 1..at + 5].try_into().unwrap());
            let v = u32::from_le_bytes(bytes[at + 5..at + 9].try_into().unwrap());
            at += OP_RECORD_SIZE;
            let op = match kind {
                OP_MERGE => GraphOp::Merge(u, v),
                OP_ADD_EDGE => GraphOp::AddEdge(u, v),
                tag => return Err(GraphError::HistoryBadTag { tag }),
            };
            ops.push(op);
        }
        Ok(GraphHistory { ops })
    }

    /// Replay this history onto a clone of `root`, producing the graph the
    /// history describes. The replayed graph records the same history.
    ///
    /// Histories arrive over the wire, so every op is validated against the
    /// graph it reaches instead of trusted.
    pub fn replay(&self, root: &Graph) -> GraphResult<Graph> {
        let order = root.order();
        let mut g = root.clone();
        for (index, op) in self.ops.iter().enumerate() {
            let (u, v) = match *op {
                GraphOp::Merge(u, v) | GraphOp::AddEdge(u, v) => (u, v),
            };
            if u as usize >= order || v as usize >= order {
                return Err(GraphError::HistoryVertexOutOfRange {
                    vertex: u.max(v),
                    order,
                });
            }
            if u == v || !g.is_alive(u) || !g.is_alive(v) {
                return Err(GraphError::HistoryInvalidOp { index, u, v });
            }
            match *op {
                GraphOp::Merge(u, v) => g.merge_vertices(u, v),
                GraphOp::AddEdge(u, v) => g.add_edge(u, v),
            }
        }
        Ok(g)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_history_round_trips() {
        let h = GraphHistory::new();
        let bytes = h.to_bytes();
        assert_eq!(bytes, vec![0, 0, 0, 0]);
        assert_eq!(GraphHistory::from_bytes(&bytes).unwrap(), h);
    }

    #[test]
    fn truncated_buffer_is_rejected() {
        let mut h = GraphHistory::new();
        h.push(GraphOp::Merge(0, 1));
        let mut bytes = h.to_bytes();
        bytes.pop();
        assert!(matches!(
            GraphHistory::from_bytes(&bytes),
            Err(GraphError::HistoryTruncated { .. })
        ));
    }

    #[test]
    fn bad_tag_is_rejected() {
        let mut h = GraphHistory::new();
        h.push(GraphOp::AddEdge(2, 3));
        let mut bytes = h.to_bytes();
        bytes[4] = 7;
        assert!(matches!(
            GraphHistory::from_bytes(&bytes),
            Err(GraphError::HistoryBadTag { tag: 7 })
        ));
    }

    #[test]
    fn replay_rejects_ops_on_dead_vertices() {
        let root = Graph::new(3);
        let mut h = GraphHistory::new();
        h.push(GraphOp::Merge(0, 1));
        h.push(GraphOp::AddEdge(1, 2));
        assert!(matches!(
            h.replay(&root),
            Err(GraphError::HistoryInvalidOp { index: 1, u: 1, v: 2 })
        ));
    }

    #[test]
    fn replay_rejects_out_of_range_vertices() {
        let root = Graph::new(3);
        let mut h = GraphHistory::new();
        h.push(GraphOp::AddEdge(0, 9));
        assert!(matches!(
            h.replay(&root),
            Err(GraphError::HistoryVertexOutOfRange { vertex: 9, order: 3 })
        ));
    }

    proptest! {
        /// Encoding then decoding yields the original operation list.
        #[test]
        fn round_trip(ops in proptest::collection::vec((any::<bool>(), 0u32..1000, 0u32..1000), 0..64)) {
            let mut h = GraphHistory::new();
            for (merge, u, v) in ops {
                h.push(if merge { GraphOp::Merge(u, v) } else { GraphOp::AddEdge(u, v) });
            }
            let decoded = GraphHistory::from_bytes(&h.to_bytes()).unwrap();
            prop_assert_eq!(decoded, h);
        }
    }
}
