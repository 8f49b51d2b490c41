//! Clique lower bound on the chromatic number.
//!
//! Any clique of size k forces k colors, so a heuristic clique gives a sound
//! lower bound for pruning. An exact maximum clique is not required.

use crate::graph::Graph;

/// Lower-bound oracle: returns the size of some clique in `graph`.
pub trait CliqueBound: Send + Sync {
    fn find_clique(&self, graph: &Graph) -> i32;
}

/// Greedy clique growth from high-degree seeds.
///
/// Vertices are visited in descending degree order; each vertex adjacent to
/// the whole current clique is added. One pass, so the bound is cheap enough
/// to recompute at every search node.
#[derive(Debug, Default, Clone, Copy)]
pub struct GreedyCliqueStrategy;

impl CliqueBound for GreedyCliqueStrategy {
    fn find_clique(&self, graph: &Graph) -> i32 {
        let mut order: Vec<_> = graph.vertices().collect();
        order.sort_unstable_by_key(|&v| std::cmp::Reverse(graph.degree(v)));

        let mut clique = Vec::new();
        for v in order {
            if clique.iter().all(|&c| graph.has_edge(v, c)) {
                clique.push(v);
            }
        }
        clique.len() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_graph_is_its_own_clique() {
        let g = Graph::from_edges(4, &[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
        assert_eq!(GreedyCliqueStrategy.find_clique(&g), 4);
    }

    #[test]
    fn edgeless_graph_has_clique_one() {
        let g = Graph::new(7);
        assert_eq!(GreedyCliqueStrategy.find_clique(&g), 1);
    }

    #[test]
    fn triangle_with_pendant() {
        let g = Graph::from_edges(4, &[(0, 1), (1, 2), (2, 0), (2, 3)]);
        assert_eq!(GreedyCliqueStrategy.find_clique(&g), 3);
    }
}
