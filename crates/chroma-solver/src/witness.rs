//! Witness coloring reconstruction.
//!
//! A winning branch colors a contracted graph. Expanding it back to the root
//! instance is a copy: every surviving vertex keeps its color, and every
//! vertex that was merged into it takes the same color, which is exactly
//! what a merge decision asserted.

use chroma_core::Graph;

/// Copy the coloring of the contracted `solved` graph onto `target`, the
/// root instance it was derived from, expanding merged vertices.
pub(crate) fn install(target: &mut Graph, solved: &Graph) {
    let vertices: Vec<_> = solved.vertices().collect();
    for v in vertices {
        let c = solved.color_of(v);
        target.set_color(v, c);
        for &merged in solved.merged_vertices(v) {
            target.set_color(merged, c);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chroma_core::{ColorStrategy, DsaturColorStrategy};

    #[test]
    fn expansion_yields_a_proper_total_coloring() {
        // 5-cycle: merging two non-adjacent vertices leaves chi = 3.
        let root = Graph::from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)]);
        let mut solved = root.clone();
        solved.merge_vertices(0, 2);
        let k = DsaturColorStrategy.color(&mut solved);

        let mut target = root.clone();
        install(&mut target, &solved);

        assert!(target.is_proper_coloring());
        assert_eq!(target.max_color(), k);
        assert_eq!(target.color_of(0), target.color_of(2));
    }

    #[test]
    fn transitive_merges_are_expanded() {
        let root = Graph::new(4);
        let mut solved = root.clone();
        solved.merge_vertices(1, 2);
        solved.merge_vertices(0, 1);
        solved.merge_vertices(0, 3);
        DsaturColorStrategy.color(&mut solved);

        let mut target = root.clone();
        install(&mut target, &solved);
        assert!(target.is_proper_coloring());
        for v in 0..4 {
            assert_eq!(target.color_of(v), target.color_of(0));
        }
    }
}
