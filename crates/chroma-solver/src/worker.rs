//! Worker role: the branch-and-bound search loop.
//!
//! The worker pops the deepest queued branch, prunes it against the fleet
//! bound, and otherwise splits it on a non-adjacent vertex pair: contract
//! the pair, or insert the missing edge. Each child gets fresh bounds from
//! the oracles. An empty queue turns the worker into a thief until a peer
//! donates a branch or the search shuts down.

use crate::branch::Branch;
use crate::error::SolveResult;
use crate::fabric::{Fabric, TAG_IDLE, TAG_SOLUTION_FOUND};
use crate::shared::SearchShared;
use crate::solver::{SearchVariant, SolveParams};
use crate::steal;
use crate::wire;
use chroma_core::{BranchingStrategy, CliqueBound, ColorStrategy, Graph, Vertex};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Sleep between steal attempts while idle.
const STEAL_RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// The three injected bound oracles, borrowed for the lifetime of a solve.
pub(crate) struct Oracles<'a> {
    pub branching: &'a dyn BranchingStrategy,
    pub clique: &'a dyn CliqueBound,
    pub color: &'a dyn ColorStrategy,
}

impl Oracles<'_> {
    /// Compute the bound window of `graph`, installing its coloring.
    ///
    /// An oracle pair reporting lb > ub is a bug in the oracle; the window
    /// is collapsed to the lower bound and the search continues.
    fn bounds(&self, graph: &mut Graph) -> (i32, u16) {
        let lb = self.clique.find_clique(graph);
        let ub = self.color.color(graph);
        if lb > ub as i32 {
            warn!(lb, ub, "oracle returned an inverted bound window");
            return (lb, lb as u16);
        }
        (lb, ub)
    }
}

enum ChildKind {
    Merge,
    AddEdge,
}

/// Build one child of `parent` and bound it. A child inherits its parent's
/// lower bound when the clique oracle finds less: contraction and edge
/// insertion only ever tighten the subproblem.
fn make_child(
    parent: &Branch,
    kind: ChildKind,
    u: Vertex,
    v: Vertex,
    oracles: &Oracles<'_>,
) -> Branch {
    let mut graph = parent.graph.clone();
    match kind {
        ChildKind::Merge => graph.merge_vertices(u, v),
        ChildKind::AddEdge => graph.add_edge(u, v),
    }
    let (lb, ub) = oracles.bounds(&mut graph);
    Branch::new(graph, lb.max(parent.lb), ub, parent.depth + 1)
}

/// Seed the queue for the standard variant: every rank starts at the root.
fn seed_standard(shared: &SearchShared, root: &Graph, oracles: &Oracles<'_>) {
    let mut graph = root.clone();
    let (lb, ub) = oracles.bounds(&mut graph);
    shared.lower_best_ub(ub);
    shared.record_current_best(Branch::new(graph.clone(), lb, ub, 1));
    shared.queue.push(Branch::new(graph, lb, ub, 1));
}

/// Seed the queue for the balanced variant: descend from the root, halving
/// the rank interval at each level, until this rank's subtree is reached.
/// The descent is deterministic, so the P subtrees partition the tree.
fn seed_balanced<F: Fabric>(
    fabric: &F,
    shared: &SearchShared,
    root: &Graph,
    oracles: &Oracles<'_>,
) {
    let my_rank = fabric.rank();
    let mut graph = root.clone();
    let (mut lo, mut hi) = (0usize, fabric.size() - 1);
    let mut depth = 1i32;

    while lo != hi {
        // A complete graph ends the descent early; the remaining ranks
        // share the same leaf and rely on stealing to diverge.
        let Some((u, v)) = oracles.branching.choose_vertices(&graph) else {
            break;
        };
        depth += 1;
        let half = (hi + 1 - lo) / 2;
        if my_rank >= lo + half {
            graph.merge_vertices(u, v);
            lo += half;
        } else {
            graph.add_edge(u, v);
            hi -= half;
        }
    }

    let (lb, ub) = oracles.bounds(&mut graph);
    shared.lower_best_ub(ub);
    shared.record_current_best(Branch::new(graph.clone(), lb, ub, depth));
    shared.queue.push(Branch::new(graph, lb, ub, depth));
    debug!(rank = my_rank, depth, lb, ub, "balanced seed placed");
}

pub(crate) fn run<F: Fabric>(
    fabric: &F,
    shared: &SearchShared,
    root: &Graph,
    oracles: &Oracles<'_>,
    variant: SearchVariant,
    params: &SolveParams,
) -> SolveResult<()> {
    let rank = fabric.rank();
    match variant {
        SearchVariant::Standard => seed_standard(shared, root, oracles),
        SearchVariant::Balanced => seed_balanced(fabric, shared, root, oracles),
    }

    // In the standard variant, a closed bound window on the very first pop
    // means the root itself is solved.
    let mut first_iteration = matches!(variant, SearchVariant::Standard);

    while !shared.terminated() {
        let Some(current) = shared.queue.pop() else {
            fabric.send(0, TAG_IDLE, wire::encode_i32(1))?;
            debug!(rank, "queue empty, turning thief");
            let mut received = false;
            while !shared.terminated() {
                if steal::request_work(fabric, shared, root)? {
                    received = true;
                    break;
                }
                thread::sleep(STEAL_RETRY_INTERVAL);
            }
            if !received {
                return Ok(());
            }
            fabric.send(0, TAG_IDLE, wire::encode_i32(0))?;
            continue;
        };

        debug!(
            rank,
            depth = current.depth,
            lb = current.lb,
            ub = current.ub,
            "processing branch"
        );

        // The coloring reached the caller's target: announce and stop.
        if params.expected_chi == Some(current.ub) {
            shared.lower_best_ub(current.ub);
            wire::send_branch(fabric, &current, 0, TAG_SOLUTION_FOUND)?;
            info!(rank, chi = current.ub, "target chromatic number reached");
            return Ok(());
        }

        // Closed bound window: this subproblem is solved.
        if current.lb == i32::from(current.ub) {
            if first_iteration {
                shared.lower_best_ub(current.ub);
                shared.record_current_best(current.clone());
                wire::send_branch(fabric, &current, 0, TAG_SOLUTION_FOUND)?;
                info!(rank, chi = current.ub, "root bounds met, solved");
                return Ok(());
            }
            if shared.lower_best_ub(current.ub) {
                shared.record_current_best(current.clone());
            }
            continue;
        }

        // Dominated: no coloring below the fleet bound can come from here.
        if current.lb >= i32::from(shared.best_ub()) {
            continue;
        }

        let Some((u, v)) = oracles.branching.choose_vertices(&current.graph) else {
            // Complete graph: one color per surviving vertex, exactly.
            let n = current.graph.num_vertices() as u16;
            if shared.lower_best_ub(n) {
                shared.record_current_best(Branch::new(
                    current.graph.clone(),
                    current.lb,
                    n,
                    current.depth,
                ));
            }
            continue;
        };

        let single_child = match variant {
            SearchVariant::Standard if current.depth < rank as i32 + 1 => {
                Some(ChildKind::AddEdge)
            }
            SearchVariant::Standard if current.depth == rank as i32 + 1 => {
                Some(ChildKind::Merge)
            }
            _ => None,
        };

        match single_child {
            // Depth-conditioned seeding: on the first levels each rank
            // follows a single forced decision so distinct ranks open
            // disjoint subtrees. Ranks whose forced prefix is longer than
            // the tree is deep never reach a two-child node and live off
            // stolen work instead.
            Some(kind) => {
                let child = make_child(&current, kind, u, v, oracles);
                shared.queue.push(child);
            }
            None => {
                let merged = make_child(&current, ChildKind::Merge, u, v, oracles);
                let edged = make_child(&current, ChildKind::AddEdge, u, v, oracles);

                // Prefer the merge child on equal bounds: it has fewer
                // surviving vertices, so its witness expands more compactly.
                let previous = shared.best_ub();
                if merged.ub < previous && merged.ub <= edged.ub {
                    if shared.lower_best_ub(merged.ub) {
                        shared.record_current_best(merged.clone());
                    }
                } else if edged.ub < previous && shared.lower_best_ub(edged.ub) {
                    shared.record_current_best(edged.clone());
                }

                shared.queue.push(merged);
                shared.queue.push(edged);
            }
        }

        first_iteration = false;
    }
    Ok(())
}
