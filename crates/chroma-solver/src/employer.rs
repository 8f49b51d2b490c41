//! Employer role: answer work-steal requests from peers.
//!
//! One request is served per tick. The donation rule lives in the queue: a
//! branch is given away only when at least one other remains, so the donor
//! never starves itself. The yes/no answer always precedes the branch
//! transfer.

use crate::error::SolveResult;
use crate::fabric::{Fabric, Source, TAG_WORK_REQUEST, TAG_WORK_RESPONSE, TAG_WORK_STEALING};
use crate::shared::SearchShared;
use crate::wire;
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Sleep between request probes.
const EMPLOYER_POLL_INTERVAL: Duration = Duration::from_millis(10);

pub(crate) fn run<F: Fabric>(fabric: &F, shared: &SearchShared) -> SolveResult<()> {
    while !shared.terminated() {
        if let Some(request) = fabric.try_recv(Source::Any, TAG_WORK_REQUEST) {
            let requester = request.source;
            match shared.queue.donate() {
                Some(branch) => {
                    debug!(
                        rank = fabric.rank(),
                        requester,
                        depth = branch.depth,
                        "donating a branch"
                    );
                    fabric.send(requester, TAG_WORK_RESPONSE, wire::encode_i32(1))?;
                    wire::send_branch(fabric, &branch, requester, TAG_WORK_STEALING)?;
                }
                None => {
                    fabric.send(requester, TAG_WORK_RESPONSE, wire::encode_i32(0))?;
                }
            }
        }
        thread::sleep(EMPLOYER_POLL_INTERVAL);
    }
    Ok(())
}
