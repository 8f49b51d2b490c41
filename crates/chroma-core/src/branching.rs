//! Branching-pair selection.
//!
//! Each search node splits on one non-adjacent vertex pair: either the pair
//! is contracted or the missing edge is inserted. The pair choice drives how
//! fast the two subproblems tighten, so strategies favor pairs whose
//! contraction constrains many common neighbors at once.

use crate::graph::{Graph, Vertex};

/// Branching oracle: pick a non-adjacent surviving pair, or `None` when the
/// graph is complete.
pub trait BranchingStrategy: Send + Sync {
    fn choose_vertices(&self, graph: &Graph) -> Option<(Vertex, Vertex)>;
}

/// Choose the non-adjacent pair with the largest common neighborhood.
///
/// Merging such a pair inherits constraints from both sides, and adding the
/// edge closes a dense region, so both children tend to tighten quickly.
/// Ties resolve to the smallest pair ids, keeping the choice deterministic.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeighboursBranchingStrategy;

impl BranchingStrategy for NeighboursBranchingStrategy {
    fn choose_vertices(&self, graph: &Graph) -> Option<(Vertex, Vertex)> {
        let vertices: Vec<Vertex> = graph.vertices().collect();
        let mut best: Option<(usize, (Vertex, Vertex))> = None;

        for (i, &u) in vertices.iter().enumerate() {
            for &v in &vertices[i + 1..] {
                if graph.has_edge(u, v) {
                    continue;
                }
                let common = graph
                    .neighbors(u)
                    .iter()
                    .filter(|w| graph.neighbors(v).contains(w))
                    .count();
                if best.map_or(true, |(score, _)| common > score) {
                    best = Some((common, (u, v)));
                }
            }
        }
        best.map(|(_, pair)| pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_graph_has_no_pair() {
        let g = Graph::from_edges(3, &[(0, 1), (0, 2), (1, 2)]);
        assert!(NeighboursBranchingStrategy.choose_vertices(&g).is_none());
    }

    #[test]
    fn chosen_pair_is_non_adjacent() {
        let g = Graph::from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)]);
        let (u, v) = NeighboursBranchingStrategy.choose_vertices(&g).unwrap();
        assert_ne!(u, v);
        assert!(!g.has_edge(u, v));
    }

    #[test]
    fn prefers_pair_with_common_neighbors() {
        // 0 and 2 share neighbor 1; 3 is isolated.
        let g = Graph::from_edges(4, &[(0, 1), (1, 2)]);
        let (u, v) = NeighboursBranchingStrategy.choose_vertices(&g).unwrap();
        assert_eq!((u, v), (0, 2));
    }

    #[test]
    fn single_vertex_graph_is_complete() {
        let g = Graph::new(1);
        assert!(NeighboursBranchingStrategy.choose_vertices(&g).is_none());
    }
}
