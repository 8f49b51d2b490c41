//! Solver entry point: per-rank role choreography.
//!
//! Each rank runs four threads for the lifetime of a solve:
//!
//! - **terminator**: detects solution / timeout / fleet idleness, owns the
//!   shutdown broadcast and the witness
//! - **gatherer**: periodic all-gather consensus on the best upper bound
//! - **employer**: donates queued branches to stealing peers
//! - **worker**: the branch-and-bound loop itself
//!
//! All four share one [`SearchShared`] and cooperate through the terminate
//! flag: every blocking wait in every role is a poll that watches it, so a
//! shutdown decision drains the whole rank within one poll interval.

use crate::error::{SolveError, SolveResult};
use crate::fabric::Fabric;
use crate::shared::SearchShared;
use crate::worker::Oracles;
use crate::{employer, gatherer, terminator, witness, worker};
use chroma_core::{BranchingStrategy, CliqueBound, ColorStrategy, Graph};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

/// How the search tree is divided between ranks at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchVariant {
    /// Every rank starts at the root; the first `rank + 1` levels are
    /// single-child so distinct ranks open disjoint subtrees. Ranks whose
    /// forced prefix exceeds the depth of the tree never reach a two-child
    /// node and are fed entirely by work stealing.
    #[default]
    Standard,
    /// A deterministic binary-search descent assigns each rank its own
    /// subtree root before the parallel search begins.
    Balanced,
}

/// Tunables of one solve call.
#[derive(Debug, Clone)]
pub struct SolveParams {
    /// Wall-clock budget; expiry is a clean termination, not an error.
    pub timeout: Duration,
    /// Cadence of the bound-consensus all-gather.
    pub gather_period: Duration,
    /// Known chromatic number to short-circuit on, when the caller has one.
    pub expected_chi: Option<u16>,
}

impl Default for SolveParams {
    fn default() -> Self {
        SolveParams {
            timeout: Duration::from_secs(60),
            gather_period: Duration::from_secs(10),
            expected_chi: None,
        }
    }
}

/// Result of a solve on one rank.
#[derive(Debug, Clone)]
pub struct SolveReport {
    /// The fleet-agreed upper bound; the chromatic number whenever the
    /// search ended without a timeout.
    pub chi: u16,
    /// Time to the proven optimum. Set on rank 0; absent after a timeout.
    pub optimum_time: Option<Duration>,
    /// True when the wall-clock budget expired before the search finished.
    pub timed_out: bool,
}

/// Branch-and-bound chromatic-number solver for one rank of a group.
///
/// The bound oracles are injected once and shared by reference for the
/// lifetime of every solve.
pub struct Solver {
    branching: Arc<dyn BranchingStrategy>,
    clique: Arc<dyn CliqueBound>,
    color: Arc<dyn ColorStrategy>,
    variant: SearchVariant,
}

impl Solver {
    pub fn new(
        branching: Arc<dyn BranchingStrategy>,
        clique: Arc<dyn CliqueBound>,
        color: Arc<dyn ColorStrategy>,
        variant: SearchVariant,
    ) -> Self {
        Solver {
            branching,
            clique,
            color,
            variant,
        }
    }

    /// Run the distributed search over `fabric`.
    ///
    /// On rank 0 the graph is recolored in place with the witness
    /// assignment; the report's `chi` is the fleet consensus and agrees
    /// across ranks.
    pub fn solve<F: Fabric>(
        &self,
        fabric: &F,
        graph: &mut Graph,
        params: &SolveParams,
    ) -> SolveResult<SolveReport> {
        let start = Instant::now();
        let root = graph.clone();
        let shared = SearchShared::new();
        let oracles = Oracles {
            branching: self.branching.as_ref(),
            clique: self.clique.as_ref(),
            color: self.color.as_ref(),
        };

        info!(
            rank = fabric.rank(),
            size = fabric.size(),
            vertices = root.num_vertices(),
            edges = root.num_edges(),
            variant = ?self.variant,
            "search starting"
        );

        let (terminator, gatherer, employer, worker) = thread::scope(|s| {
            let shared = &shared;
            let root = &root;
            let oracles = &oracles;

            let terminator = thread::Builder::new()
                .name("chroma-terminator".into())
                .spawn_scoped(s, move || {
                    let result =
                        terminator::run(fabric, shared, root, oracles.color, params, start);
                    if result.is_err() {
                        shared.request_termination();
                    }
                    result
                })
                .expect("Failed to spawn terminator thread");

            let gatherer = thread::Builder::new()
                .name("chroma-gatherer".into())
                .spawn_scoped(s, move || {
                    let result = gatherer::run(fabric, shared, params);
                    if result.is_err() {
                        shared.request_termination();
                    }
                    result
                })
                .expect("Failed to spawn gatherer thread");

            let employer = thread::Builder::new()
                .name("chroma-employer".into())
                .spawn_scoped(s, move || {
                    let result = employer::run(fabric, shared);
                    if result.is_err() {
                        shared.request_termination();
                    }
                    result
                })
                .expect("Failed to spawn employer thread");

            let worker = thread::Builder::new()
                .name("chroma-worker".into())
                .spawn_scoped(s, move || {
                    let result = worker::run(fabric, shared, root, oracles, self.variant, params);
                    if result.is_err() {
                        shared.request_termination();
                    }
                    result
                })
                .expect("Failed to spawn worker thread");

            (
                terminator.join(),
                gatherer.join(),
                employer.join(),
                worker.join(),
            )
        });

        let joined = [
            ("terminator", terminator),
            ("gatherer", gatherer),
            ("employer", employer),
            ("worker", worker),
        ];
        for (role, result) in joined {
            match result {
                Ok(role_result) => role_result?,
                Err(_) => return Err(SolveError::RolePanic { role }),
            }
        }

        // Orderly shutdown: every rank re-synchronizes before reporting.
        fabric.barrier();

        // Rank 0 holds the fleet minimum after incumbent collection; one
        // last broadcast makes every rank report the same value.
        let no_cancel = AtomicBool::new(false);
        let chi = if fabric.rank() == 0 {
            let chi = shared.best_ub();
            let _ = fabric.broadcast(0, [i32::from(chi), 0], &no_cancel);
            chi
        } else {
            match fabric.broadcast(0, [0, 0], &no_cancel) {
                Some([chi, _]) => {
                    let chi = chi as u16;
                    shared.lower_best_ub(chi);
                    chi
                }
                None => shared.best_ub(),
            }
        };

        if fabric.rank() == 0 {
            if let Some(solved) = shared.witness.lock().take() {
                witness::install(graph, &solved);
            }
        }

        let outcome = shared.outcome.lock().clone();
        info!(
            rank = fabric.rank(),
            chi,
            timed_out = outcome.timed_out,
            elapsed = ?start.elapsed(),
            "search finished"
        );

        Ok(SolveReport {
            chi,
            optimum_time: outcome.optimum_time,
            timed_out: outcome.timed_out,
        })
    }
}
