//! Branch transfer protocol.
//!
//! A branch crosses the fabric as two messages under the same tag: a 4-byte
//! size prefix, then the encoded payload. A size of zero is the sentinel for
//! "no branch" (an endpoint with nothing to report still completes the
//! exchange). Receivers poll cooperatively and give up as soon as the
//! termination flag rises, so no transfer can outlive a shutdown decision.

use crate::branch::Branch;
use crate::error::SolveResult;
use crate::fabric::{Fabric, Message, Rank, Source, Tag};
use chroma_core::Graph;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// Sleep between receive polls.
const RECV_POLL_INTERVAL: Duration = Duration::from_millis(1);

pub(crate) fn encode_i32(value: i32) -> Vec<u8> {
    value.to_le_bytes().to_vec()
}

pub(crate) fn decode_i32(payload: &[u8]) -> i32 {
    let mut bytes = [0u8; 4];
    let n = payload.len().min(4);
    bytes[..n].copy_from_slice(&payload[..n]);
    i32::from_le_bytes(bytes)
}

/// Poll for a message from `source` under `tag` until it arrives or
/// `terminate` rises.
pub(crate) fn poll_recv<F: Fabric>(
    fabric: &F,
    source: Source,
    tag: Tag,
    terminate: &AtomicBool,
) -> Option<Message> {
    loop {
        if let Some(message) = fabric.try_recv(source, tag) {
            return Some(message);
        }
        if terminate.load(Ordering::Acquire) {
            return None;
        }
        thread::sleep(RECV_POLL_INTERVAL);
    }
}

/// Send `branch` to `dest` as a size-prefixed two-message transfer.
pub(crate) fn send_branch<F: Fabric>(
    fabric: &F,
    branch: &Branch,
    dest: Rank,
    tag: Tag,
) -> SolveResult<()> {
    let payload = branch.encode();
    fabric.send(dest, tag, (payload.len() as u32).to_le_bytes().to_vec())?;
    fabric.send(dest, tag, payload)?;
    Ok(())
}

/// Send the "no branch" sentinel: a zero size prefix with no payload.
pub(crate) fn send_no_branch<F: Fabric>(fabric: &F, dest: Rank, tag: Tag) -> SolveResult<()> {
    fabric.send(dest, tag, 0u32.to_le_bytes().to_vec())?;
    Ok(())
}

/// Receive a size-prefixed branch from `source`, replaying its history onto
/// `root`. Returns `Ok(None)` on the sentinel and on termination mid-way.
pub(crate) fn recv_branch<F: Fabric>(
    fabric: &F,
    source: Rank,
    tag: Tag,
    root: &Graph,
    terminate: &AtomicBool,
) -> SolveResult<Option<Branch>> {
    let Some(size_msg) = poll_recv(fabric, Source::Rank(source), tag, terminate) else {
        return Ok(None);
    };
    let size = u32::from_le_bytes({
        let mut bytes = [0u8; 4];
        let n = size_msg.payload.len().min(4);
        bytes[..n].copy_from_slice(&size_msg.payload[..n]);
        bytes
    }) as usize;
    if size == 0 {
        return Ok(None);
    }

    let Some(payload_msg) = poll_recv(fabric, Source::Rank(source), tag, terminate) else {
        return Ok(None);
    };
    debug_assert_eq!(payload_msg.payload.len(), size);
    Branch::decode(&payload_msg.payload, root).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fabric::LocalFabric;

    fn root() -> Graph {
        Graph::from_edges(4, &[(0, 1), (1, 2), (2, 3)])
    }

    #[test]
    fn branch_transfer_round_trips() {
        let group = LocalFabric::group(2);
        let root = root();
        let mut g = root.clone();
        g.add_edge(0, 2);
        let branch = Branch::new(g, 2, 3, 2);
        let terminate = AtomicBool::new(false);

        send_branch(&group[0], &branch, 1, 6).unwrap();
        let received = recv_branch(&group[1], 0, 6, &root, &terminate)
            .unwrap()
            .unwrap();
        assert_eq!(received.lb, 2);
        assert_eq!(received.ub, 3);
        assert_eq!(received.depth, 2);
        assert_eq!(received.graph.history(), branch.graph.history());
    }

    #[test]
    fn sentinel_decodes_to_none() {
        let group = LocalFabric::group(2);
        let terminate = AtomicBool::new(false);
        send_no_branch(&group[0], 1, 7).unwrap();
        assert!(recv_branch(&group[1], 0, 7, &root(), &terminate)
            .unwrap()
            .is_none());
    }

    #[test]
    fn termination_aborts_a_pending_receive() {
        let group = LocalFabric::group(2);
        let terminate = AtomicBool::new(true);
        assert!(recv_branch(&group[1], 0, 7, &root(), &terminate)
            .unwrap()
            .is_none());
    }
}
