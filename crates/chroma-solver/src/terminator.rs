//! Terminator role: decide shutdown and own the witness.
//!
//! Rank 0 coordinates. Each tick it checks the wall-clock timeout, consumes
//! at most one announced solution, drains idle reports, tests for fleet-wide
//! idleness, and broadcasts the two termination flags. Peers mirror the
//! broadcast and, once either flag rises, ship their incumbent branch to
//! rank 0 so the best witness in the fleet survives the shutdown.
//!
//! A received solution takes precedence over collected incumbents: it is
//! installed as the witness the moment it arrives, and the end-of-run
//! collection then only drains the peers' incumbents.

use crate::branch::Branch;
use crate::error::SolveResult;
use crate::fabric::{Fabric, Source, TAG_IDLE, TAG_SOLUTION_FOUND, TAG_TIMEOUT_SOLUTION};
use crate::shared::SearchShared;
use crate::solver::SolveParams;
use crate::wire;
use chroma_core::{ColorStrategy, Graph};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Sleep between coordinator ticks.
const TERMINATOR_POLL_INTERVAL: Duration = Duration::from_millis(10);

pub(crate) fn run<F: Fabric>(
    fabric: &F,
    shared: &SearchShared,
    root: &Graph,
    color: &dyn ColorStrategy,
    params: &SolveParams,
    start: Instant,
) -> SolveResult<()> {
    if fabric.rank() == 0 {
        run_coordinator(fabric, shared, root, color, params, start)
    } else {
        run_peer(fabric, shared)
    }
}

fn run_coordinator<F: Fabric>(
    fabric: &F,
    shared: &SearchShared,
    root: &Graph,
    color: &dyn ColorStrategy,
    params: &SolveParams,
    start: Instant,
) -> SolveResult<()> {
    let size = fabric.size();
    let mut idle_status = vec![0i32; size];
    let mut solution_found = 0i32;
    let mut timeout_signal = 0i32;
    let mut witness_installed = false;

    loop {
        if start.elapsed() >= params.timeout {
            timeout_signal = 1;
        }

        // A worker announced a proven chromatic number.
        if let Some(envelope) = fabric.probe(Source::Any, TAG_SOLUTION_FOUND) {
            if let Some(branch) = wire::recv_branch(
                fabric,
                envelope.source,
                TAG_SOLUTION_FOUND,
                root,
                &shared.terminate,
            )? {
                info!(
                    source = envelope.source,
                    ub = branch.ub,
                    "solution announced"
                );
                shared.lower_best_ub(branch.ub);
                let mut solved = branch.graph;
                color.color(&mut solved);
                *shared.witness.lock() = Some(solved);
                witness_installed = true;
                solution_found = 1;
                shared.outcome.lock().optimum_time = Some(start.elapsed());
            }
        }

        // Latest idleness report wins; a rank that received stolen work
        // already queued its busy report behind the idle one.
        while let Some(report) = fabric.try_recv(Source::Any, TAG_IDLE) {
            idle_status[report.source] = wire::decode_i32(&report.payload);
        }

        // Every queue in the fleet is empty: the bound cannot improve any
        // further, so it is the chromatic number. A pending timeout wins the
        // tick; its report must carry no optimum time.
        if solution_found == 0 && timeout_signal == 0 && idle_status.iter().all(|&s| s == 1) {
            info!(best_ub = shared.best_ub(), "all ranks idle");
            solution_found = 1;
            shared.outcome.lock().optimum_time = Some(start.elapsed());
        }

        let _ = fabric.broadcast(0, [solution_found, timeout_signal], &shared.terminate);

        if solution_found == 1 || timeout_signal == 1 {
            collect_incumbents(fabric, shared, root, color, witness_installed)?;
            let mut outcome = shared.outcome.lock();
            outcome.solution_found = solution_found == 1;
            // A solution and the deadline can land in the same tick; the
            // solution takes precedence and the run did not time out.
            outcome.timed_out = timeout_signal == 1 && solution_found == 0;
            drop(outcome);
            shared.request_termination();
            return Ok(());
        }

        thread::sleep(TERMINATOR_POLL_INTERVAL);
    }
}

/// Receive one incumbent per peer and, unless an announced solution already
/// provided the witness, install the best-bounded one.
fn collect_incumbents<F: Fabric>(
    fabric: &F,
    shared: &SearchShared,
    root: &Graph,
    color: &dyn ColorStrategy,
    witness_installed: bool,
) -> SolveResult<()> {
    let mut incumbent: Option<Branch> = shared.current_best.lock().clone();
    for source in 1..fabric.size() {
        let Some(branch) = wire::recv_branch(
            fabric,
            source,
            TAG_TIMEOUT_SOLUTION,
            root,
            &shared.terminate,
        )?
        else {
            continue;
        };
        debug!(source, ub = branch.ub, "incumbent collected");
        if branch.ub <= shared.best_ub()
            && incumbent.as_ref().map_or(true, |b| branch.ub < b.ub)
        {
            incumbent = Some(branch);
        }
    }

    if !witness_installed {
        if let Some(mut best) = incumbent {
            shared.lower_best_ub(best.ub);
            color.color(&mut best.graph);
            *shared.witness.lock() = Some(best.graph);
        }
    }
    Ok(())
}

fn run_peer<F: Fabric>(fabric: &F, shared: &SearchShared) -> SolveResult<()> {
    loop {
        let Some([solution_found, timeout_signal]) =
            fabric.broadcast(0, [0, 0], &shared.terminate)
        else {
            return Ok(());
        };

        if solution_found == 1 || timeout_signal == 1 {
            let incumbent = shared.current_best.lock().clone();
            match incumbent {
                Some(branch) => {
                    wire::send_branch(fabric, &branch, 0, TAG_TIMEOUT_SOLUTION)?;
                }
                None => wire::send_no_branch(fabric, 0, TAG_TIMEOUT_SOLUTION)?,
            }
            let mut outcome = shared.outcome.lock();
            outcome.solution_found = solution_found == 1;
            // Mirror the coordinator: a solution outranks the deadline.
            outcome.timed_out = timeout_signal == 1 && solution_found == 0;
            drop(outcome);
            shared.request_termination();
            return Ok(());
        }

        thread::sleep(TERMINATOR_POLL_INTERVAL);
    }
}
