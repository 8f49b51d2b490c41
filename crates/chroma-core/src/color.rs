//! Coloring upper bounds.
//!
//! A strategy writes a full proper coloring into the graph (colors `1..=k`
//! on every surviving vertex) and returns `k`. Strategies are deterministic:
//! recoloring an identical graph reproduces the identical assignment, which
//! lets a received search node be recolored locally instead of shipping the
//! color vector over the wire.

use crate::graph::{ColorId, Graph, Vertex};

/// Upper-bound oracle: installs a proper coloring and returns its size.
pub trait ColorStrategy: Send + Sync {
    fn color(&self, graph: &mut Graph) -> u16;
}

fn smallest_feasible(graph: &Graph, v: Vertex) -> ColorId {
    let mut used: Vec<bool> = vec![false; graph.degree(v) + 2];
    for &w in graph.neighbors(v) {
        let c = graph.color_of(w) as usize;
        if c != 0 && c < used.len() {
            used[c] = true;
        }
    }
    // At most degree(v) colors can be blocked, so a free one exists in range.
    (1..used.len()).find(|&c| !used[c]).unwrap_or(1) as ColorId
}

/// First-fit in ascending vertex-id order.
#[derive(Debug, Default, Clone, Copy)]
pub struct GreedyColorStrategy;

impl ColorStrategy for GreedyColorStrategy {
    fn color(&self, graph: &mut Graph) -> u16 {
        graph.clear_colors();
        let vertices: Vec<_> = graph.vertices().collect();
        let mut max = 0;
        for v in vertices {
            let c = smallest_feasible(graph, v);
            graph.set_color(v, c);
            max = max.max(c);
        }
        max
    }
}

/// DSATUR: always color the vertex with the most distinctly-colored
/// neighbors next, breaking ties by degree then by id.
#[derive(Debug, Default, Clone, Copy)]
pub struct DsaturColorStrategy;

impl ColorStrategy for DsaturColorStrategy {
    fn color(&self, graph: &mut Graph) -> u16 {
        graph.clear_colors();
        let mut pending: Vec<Vertex> = graph.vertices().collect();
        let mut max = 0;

        while !pending.is_empty() {
            let Some((idx, _)) = pending
                .iter()
                .enumerate()
                .map(|(i, &v)| {
                    let mut seen: Vec<ColorId> = graph
                        .neighbors(v)
                        .iter()
                        .map(|&w| graph.color_of(w))
                        .filter(|&c| c != 0)
                        .collect();
                    seen.sort_unstable();
                    seen.dedup();
                    (i, (seen.len(), graph.degree(v), std::cmp::Reverse(v)))
                })
                .max_by_key(|&(_, key)| key)
            else {
                break;
            };
            let v = pending.swap_remove(idx);
            let c = smallest_feasible(graph, v);
            graph.set_color(v, c);
            max = max.max(c);
        }
        max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn five_cycle() -> Graph {
        Graph::from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)])
    }

    #[test]
    fn greedy_colors_odd_cycle_with_three() {
        let mut g = five_cycle();
        let k = GreedyColorStrategy.color(&mut g);
        assert_eq!(k, 3);
        assert!(g.is_proper_coloring());
    }

    #[test]
    fn dsatur_colors_bipartite_with_two() {
        // K_{3,3}
        let mut g = Graph::from_edges(
            6,
            &[
                (0, 3),
                (0, 4),
                (0, 5),
                (1, 3),
                (1, 4),
                (1, 5),
                (2, 3),
                (2, 4),
                (2, 5),
            ],
        );
        let k = DsaturColorStrategy.color(&mut g);
        assert_eq!(k, 2);
        assert!(g.is_proper_coloring());
    }

    #[test]
    fn edgeless_graph_uses_one_color() {
        let mut g = Graph::new(7);
        assert_eq!(GreedyColorStrategy.color(&mut g), 1);
        assert!(g.vertices().all(|v| g.color_of(v) == 1));
    }

    #[test]
    fn coloring_survives_merges() {
        let mut g = five_cycle();
        g.merge_vertices(0, 2);
        let k = DsaturColorStrategy.color(&mut g);
        assert!(g.is_proper_coloring());
        assert_eq!(k, 3);
    }

    #[test]
    fn strategies_are_deterministic() {
        let mut a = five_cycle();
        let mut b = five_cycle();
        DsaturColorStrategy.color(&mut a);
        DsaturColorStrategy.color(&mut b);
        assert_eq!(a.coloring(), b.coloring());
    }
}
