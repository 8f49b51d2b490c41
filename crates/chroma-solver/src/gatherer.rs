//! Gatherer role: periodic fleet-wide bound consensus.
//!
//! Every gather period the ranks all-gather their local bounds and each
//! installs the minimum. The cadence is approximate by design: a stale bound
//! only weakens pruning, it can never prune a branch that should survive,
//! so nothing here needs tight synchronization.

use crate::error::SolveResult;
use crate::fabric::Fabric;
use crate::shared::SearchShared;
use crate::solver::SolveParams;
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// Sleep between cadence checks.
const GATHER_POLL_INTERVAL: Duration = Duration::from_millis(10);

pub(crate) fn run<F: Fabric>(
    fabric: &F,
    shared: &SearchShared,
    params: &SolveParams,
) -> SolveResult<()> {
    let mut last_gather = Instant::now();

    while !shared.terminated() {
        if last_gather.elapsed() >= params.gather_period {
            let local = shared.best_ub();
            let Some(gathered) = fabric.allgather(local, &shared.terminate) else {
                return Ok(());
            };
            let fleet_min = gathered.into_iter().min().unwrap_or(local);
            if shared.lower_best_ub(fleet_min) {
                debug!(rank = fabric.rank(), fleet_min, "bound improved by gather");
            }
            last_gather = Instant::now();
        }
        thread::sleep(GATHER_POLL_INTERVAL);
    }
    Ok(())
}
