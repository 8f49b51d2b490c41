//! Work-steal client.
//!
//! An idle worker picks a victim uniformly at random, asks for work, and
//! waits for the victim's yes/no answer before expecting a branch. The
//! answer-first ordering lets a requester that is being shut down walk away
//! without a branch transfer half-delivered.

use crate::error::SolveResult;
use crate::fabric::{Fabric, Source, TAG_WORK_REQUEST, TAG_WORK_RESPONSE, TAG_WORK_STEALING};
use crate::shared::SearchShared;
use crate::wire;
use chroma_core::Graph;
use rand::Rng;
use tracing::debug;

/// Ask one random peer for a branch. Returns true when a branch was
/// received and pushed onto the local queue.
///
/// A stolen branch is pushed without checking it against the current bound;
/// the pop path prunes dominated branches anyway.
pub(crate) fn request_work<F: Fabric>(
    fabric: &F,
    shared: &SearchShared,
    root: &Graph,
) -> SolveResult<bool> {
    let size = fabric.size();
    if size == 1 {
        return Ok(false);
    }

    let mut rng = rand::thread_rng();
    let mut victim = fabric.rank();
    while victim == fabric.rank() {
        victim = rng.gen_range(0..size);
    }

    fabric.send(victim, TAG_WORK_REQUEST, Vec::new())?;

    let Some(response) = wire::poll_recv(
        fabric,
        Source::Rank(victim),
        TAG_WORK_RESPONSE,
        &shared.terminate,
    ) else {
        return Ok(false);
    };

    if wire::decode_i32(&response.payload) != 1 {
        return Ok(false);
    }

    match wire::recv_branch(fabric, victim, TAG_WORK_STEALING, root, &shared.terminate)? {
        Some(branch) => {
            debug!(
                rank = fabric.rank(),
                victim,
                depth = branch.depth,
                "stole a branch"
            );
            shared.queue.push(branch);
            Ok(true)
        }
        None => Ok(false),
    }
}
