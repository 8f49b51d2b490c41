//! Per-process state shared by the four role threads.

use crate::branch::Branch;
use crate::queue::BranchQueue;
use chroma_core::Graph;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::time::Duration;

/// How the search ended on this rank.
#[derive(Debug, Default, Clone)]
pub(crate) struct Outcome {
    pub solution_found: bool,
    pub timed_out: bool,
    /// Time to the proven optimum; set on rank 0 only, absent on timeout.
    pub optimum_time: Option<Duration>,
}

/// State shared by terminator, gatherer, employer, and worker within one
/// rank. The bound is lock-free; everything else sits behind short-held
/// mutexes.
pub(crate) struct SearchShared {
    /// Local branch queue, depth-greedy.
    pub queue: BranchQueue,
    /// Best proven upper bound on the chromatic number known to this rank.
    /// Only ever lowered.
    best_ub: AtomicU16,
    /// The branch that produced the current `best_ub`, with its coloring.
    pub current_best: Mutex<Option<Branch>>,
    /// Shutdown flag; rises exactly once, every polling loop watches it.
    pub terminate: AtomicBool,
    /// Termination cause, written by the terminator.
    pub outcome: Mutex<Outcome>,
    /// Witness graph chosen at termination, installed into the caller's
    /// graph after the role threads join. Rank 0 only.
    pub witness: Mutex<Option<Graph>>,
}

impl SearchShared {
    pub fn new() -> Self {
        SearchShared {
            queue: BranchQueue::new(),
            best_ub: AtomicU16::new(u16::MAX),
            current_best: Mutex::new(None),
            terminate: AtomicBool::new(false),
            outcome: Mutex::new(Outcome::default()),
            witness: Mutex::new(None),
        }
    }

    pub fn best_ub(&self) -> u16 {
        self.best_ub.load(Ordering::Acquire)
    }

    /// Lower the bound to `ub` if it improves it. Returns true when this
    /// call lowered the bound. `fetch_min` keeps the bound monotone under
    /// concurrent writers.
    pub fn lower_best_ub(&self, ub: u16) -> bool {
        self.best_ub.fetch_min(ub, Ordering::AcqRel) > ub
    }

    /// Snapshot `branch` as the incumbent behind the current bound.
    pub fn record_current_best(&self, branch: Branch) {
        *self.current_best.lock() = Some(branch);
    }

    pub fn terminated(&self) -> bool {
        self.terminate.load(Ordering::Acquire)
    }

    pub fn request_termination(&self) {
        self.terminate.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_ub_only_goes_down() {
        let shared = SearchShared::new();
        assert!(shared.lower_best_ub(10));
        assert!(!shared.lower_best_ub(12));
        assert!(shared.lower_best_ub(7));
        assert_eq!(shared.best_ub(), 7);
    }

    #[test]
    fn equal_bound_is_not_an_improvement() {
        let shared = SearchShared::new();
        shared.lower_best_ub(5);
        assert!(!shared.lower_best_ub(5));
    }
}
