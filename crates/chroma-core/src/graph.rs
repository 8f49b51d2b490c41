//! Undirected simple graph with vertex contraction.
//!
//! The search works on graphs that shrink under merges: `merge_vertices(u, v)`
//! removes `v` and rewires its edges onto `u`, recording that any coloring of
//! the contracted graph assigns `v` the color of `u`. Both mutating search
//! operations (`merge_vertices`, `add_edge`) append to the graph's
//! [`GraphHistory`], so a graph deep in the search tree can be shipped to a
//! peer as root-plus-history and replayed there.
//!
//! Vertex ids are dense `u32` indices assigned at construction and never
//! reused; removed vertices stay allocated but dead. Colors are `u16` with
//! `0` meaning uncolored.

use crate::history::{GraphHistory, GraphOp};
use rustc_hash::FxHashSet;

pub type Vertex = u32;
pub type ColorId = u16;

/// A mergeable undirected simple graph with per-vertex colors.
#[derive(Debug, Clone)]
pub struct Graph {
    /// Adjacency sets, indexed by vertex id. Dead vertices have empty sets.
    adj: Vec<FxHashSet<Vertex>>,
    /// Liveness per vertex id; merging kills the absorbed vertex.
    alive: Vec<bool>,
    /// Vertices absorbed into this one, flattened transitively.
    merged: Vec<Vec<Vertex>>,
    /// Current coloring; 0 = uncolored.
    colors: Vec<ColorId>,
    live_count: usize,
    history: GraphHistory,
}

impl Graph {
    /// Create an edgeless graph on `n` vertices with ids `0..n`.
    pub fn new(n: usize) -> Self {
        Graph {
            adj: vec![FxHashSet::default(); n],
            alive: vec![true; n],
            merged: vec![Vec::new(); n],
            colors: vec![0; n],
            live_count: n,
            history: GraphHistory::new(),
        }
    }

    /// Build a graph from an edge list without recording history.
    ///
    /// Duplicate edges and self-loops in the input are ignored.
    pub fn from_edges(n: usize, edges: &[(Vertex, Vertex)]) -> Self {
        let mut g = Graph::new(n);
        for &(u, v) in edges {
            if u != v {
                g.link(u, v);
            }
        }
        g
    }

    pub(crate) fn link(&mut self, u: Vertex, v: Vertex) {
        self.adj[u as usize].insert(v);
        self.adj[v as usize].insert(u);
    }

    /// Total number of vertex ids ever allocated, dead or alive.
    pub fn order(&self) -> usize {
        self.adj.len()
    }

    /// Number of surviving vertices.
    pub fn num_vertices(&self) -> usize {
        self.live_count
    }

    /// Number of edges between surviving vertices.
    pub fn num_edges(&self) -> usize {
        self.adj.iter().map(|n| n.len()).sum::<usize>() / 2
    }

    pub fn is_alive(&self, v: Vertex) -> bool {
        self.alive[v as usize]
    }

    /// Iterate the surviving vertex ids in ascending order.
    pub fn vertices(&self) -> impl Iterator<Item = Vertex> + '_ {
        self.alive
            .iter()
            .enumerate()
            .filter(|(_, live)| **live)
            .map(|(v, _)| v as Vertex)
    }

    pub fn neighbors(&self, v: Vertex) -> &FxHashSet<Vertex> {
        &self.adj[v as usize]
    }

    pub fn degree(&self, v: Vertex) -> usize {
        self.adj[v as usize].len()
    }

    pub fn has_edge(&self, u: Vertex, v: Vertex) -> bool {
        self.adj[u as usize].contains(&v)
    }

    /// All vertices that have been contracted into `v`, transitively.
    pub fn merged_vertices(&self, v: Vertex) -> &[Vertex] {
        &self.merged[v as usize]
    }

    /// Insert the edge `(u, v)` and record the decision in the history.
    ///
    /// Both endpoints must be alive.
    pub fn add_edge(&mut self, u: Vertex, v: Vertex) {
        debug_assert!(u != v);
        debug_assert!(self.alive[u as usize] && self.alive[v as usize]);
        self.link(u, v);
        self.history.push(GraphOp::AddEdge(u, v));
    }

    /// Contract `v` into `u` and record the decision in the history.
    ///
    /// `u` inherits `v`'s edges and absorbed-vertex set; `v` becomes dead.
    /// The caller picks non-adjacent pairs, but adjacency is tolerated (the
    /// shared edge simply disappears with `v`).
    pub fn merge_vertices(&mut self, u: Vertex, v: Vertex) {
        debug_assert!(u != v);
        debug_assert!(self.alive[u as usize] && self.alive[v as usize]);
        let moved: Vec<Vertex> = self.adj[v as usize].iter().copied().collect();
        for w in moved {
            self.adj[w as usize].remove(&v);
            if w != u {
                self.adj[w as usize].insert(u);
                self.adj[u as usize].insert(w);
            }
        }
        self.adj[v as usize].clear();
        self.adj[u as usize].remove(&v);

        self.alive[v as usize] = false;
        self.live_count -= 1;

        let absorbed = std::mem::take(&mut self.merged[v as usize]);
        self.merged[u as usize].push(v);
        self.merged[u as usize].extend(absorbed);

        self.history.push(GraphOp::Merge(u, v));
    }

    /// The merge / add-edge decisions applied to this graph since the root.
    pub fn history(&self) -> &GraphHistory {
        &self.history
    }

    pub fn color_of(&self, v: Vertex) -> ColorId {
        self.colors[v as usize]
    }

    pub fn set_color(&mut self, v: Vertex, c: ColorId) {
        self.colors[v as usize] = c;
    }

    /// Replace the whole coloring. `colors` is indexed by vertex id.
    pub fn set_coloring(&mut self, colors: Vec<ColorId>) {
        debug_assert_eq!(colors.len(), self.order());
        self.colors = colors;
    }

    pub fn coloring(&self) -> &[ColorId] {
        &self.colors
    }

    pub fn clear_colors(&mut self) {
        self.colors.iter_mut().for_each(|c| *c = 0);
    }

    /// Largest color id in use on surviving vertices.
    pub fn max_color(&self) -> ColorId {
        self.vertices()
            .map(|v| self.colors[v as usize])
            .max()
            .unwrap_or(0)
    }

    /// True when every surviving vertex is colored and no edge joins two
    /// vertices of the same color.
    pub fn is_proper_coloring(&self) -> bool {
        for v in self.vertices() {
            let c = self.colors[v as usize];
            if c == 0 {
                return false;
            }
            for &w in self.neighbors(v) {
                if self.colors[w as usize] == c {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path3() -> Graph {
        Graph::from_edges(3, &[(0, 1), (1, 2)])
    }

    #[test]
    fn construction_does_not_record_history() {
        let g = path3();
        assert!(g.history().is_empty());
        assert_eq!(g.num_vertices(), 3);
        assert_eq!(g.num_edges(), 2);
    }

    #[test]
    fn add_edge_links_and_records() {
        let mut g = path3();
        g.add_edge(0, 2);
        assert!(g.has_edge(0, 2));
        assert_eq!(g.history().len(), 1);
    }

    #[test]
    fn merge_rewires_neighbors() {
        // 0-1, 1-2: merging 0 and 2 gives a single edge 0-1.
        let mut g = path3();
        g.merge_vertices(0, 2);
        assert_eq!(g.num_vertices(), 2);
        assert!(!g.is_alive(2));
        assert!(g.has_edge(0, 1));
        assert!(!g.neighbors(1).contains(&2));
        assert_eq!(g.merged_vertices(0), &[2]);
    }

    #[test]
    fn merge_is_transitive() {
        let mut g = Graph::new(4);
        g.merge_vertices(1, 2);
        g.merge_vertices(0, 1);
        let mut absorbed = g.merged_vertices(0).to_vec();
        absorbed.sort_unstable();
        assert_eq!(absorbed, vec![1, 2]);
        assert_eq!(g.num_vertices(), 2);
    }

    #[test]
    fn merge_does_not_introduce_self_loop() {
        let mut g = Graph::from_edges(3, &[(0, 1), (2, 1)]);
        g.merge_vertices(0, 2);
        assert!(!g.neighbors(0).contains(&0));
        assert!(g.has_edge(0, 1));
        assert_eq!(g.num_edges(), 1);
    }

    #[test]
    fn replay_reproduces_structure() {
        let root = Graph::from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)]);
        let mut g = root.clone();
        g.merge_vertices(0, 2);
        g.add_edge(1, 3);
        g.merge_vertices(1, 4);

        let replayed = g.history().replay(&root).unwrap();
        assert_eq!(replayed.num_vertices(), g.num_vertices());
        assert_eq!(replayed.history(), g.history());
        for v in g.vertices() {
            assert!(replayed.is_alive(v));
            let mut a: Vec<_> = g.neighbors(v).iter().copied().collect();
            let mut b: Vec<_> = replayed.neighbors(v).iter().copied().collect();
            a.sort_unstable();
            b.sort_unstable();
            assert_eq!(a, b, "neighborhood of {v} differs");
        }
    }

    #[test]
    fn proper_coloring_detects_conflicts() {
        let mut g = path3();
        g.set_coloring(vec![1, 2, 1]);
        assert!(g.is_proper_coloring());
        g.set_color(2, 2);
        assert!(!g.is_proper_coloring());
        g.set_color(2, 0);
        assert!(!g.is_proper_coloring());
    }
}
