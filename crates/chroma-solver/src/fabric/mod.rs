//! Message fabric abstraction.
//!
//! The engine runs as a group of peer ranks exchanging tagged messages. All
//! it requires from the transport is buffered point-to-point sends, polling
//! receives with any-source selection, a size-only probe, and three
//! collectives (root broadcast, all-gather, barrier). Everything above the
//! trait, from work stealing to termination, is transport-agnostic; the
//! in-process [`LocalFabric`] is the shipped implementation and a cluster
//! transport is another impl of the same trait.
//!
//! Collectives poll cooperatively: callers pass a cancel flag, and a
//! cancelled collective returns `None` instead of blocking a shutdown.

mod local;

pub use local::{run_group, LocalFabric};

use std::sync::atomic::AtomicBool;
use thiserror::Error;

/// Process index within the group, `0..size`.
pub type Rank = usize;

/// Message tag. Each protocol message class has its own tag.
pub type Tag = u16;

/// Empty message announcing that the sender wants work.
pub const TAG_WORK_REQUEST: Tag = 1;
/// One i32, 1 if the victim will donate a branch, 0 otherwise.
pub const TAG_WORK_RESPONSE: Tag = 2;
/// A serialized branch whose ub is a proven chromatic number.
pub const TAG_SOLUTION_FOUND: Tag = 4;
/// One i32 idleness flag, worker to rank 0.
pub const TAG_IDLE: Tag = 5;
/// A serialized donated branch, victim to requester.
pub const TAG_WORK_STEALING: Tag = 6;
/// Each rank's incumbent branch, sent to rank 0 at termination.
pub const TAG_TIMEOUT_SOLUTION: Tag = 7;

/// Receive-side source selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Match a message from any rank.
    Any,
    /// Match only messages from the given rank.
    Rank(Rank),
}

/// Metadata of a pending message, reported by probe without consuming it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope {
    pub source: Rank,
    pub tag: Tag,
    pub len: usize,
}

/// A received message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub source: Rank,
    pub payload: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum FabricError {
    #[error("destination rank {dest} out of range for group of {size}")]
    RankOutOfRange { dest: Rank, size: usize },
}

/// A reliable message-passing endpoint for one rank of a group.
///
/// Sends are buffered and complete immediately; delivery between live ranks
/// is guaranteed and per (source, tag) order is FIFO. Receives never block.
pub trait Fabric: Send + Sync {
    /// This endpoint's rank.
    fn rank(&self) -> Rank;

    /// Number of ranks in the group.
    fn size(&self) -> usize;

    /// Enqueue `payload` for `dest` under `tag`.
    fn send(&self, dest: Rank, tag: Tag, payload: Vec<u8>) -> Result<(), FabricError>;

    /// Take the oldest pending message matching `source` and `tag`, if any.
    fn try_recv(&self, source: Source, tag: Tag) -> Option<Message>;

    /// Report the oldest pending message matching `source` and `tag` without
    /// consuming it.
    fn probe(&self, source: Source, tag: Tag) -> Option<Envelope>;

    /// Collective broadcast of two i32s from `root`. Non-root callers poll
    /// until the value for their next round arrives; returns `None` if
    /// `cancel` becomes true first.
    fn broadcast(&self, root: Rank, value: [i32; 2], cancel: &AtomicBool) -> Option<[i32; 2]>;

    /// Collective all-gather of one u16 per rank, indexed by rank. Polls
    /// until every rank has contributed to this round; returns `None` if
    /// `cancel` becomes true first.
    fn allgather(&self, value: u16, cancel: &AtomicBool) -> Option<Vec<u16>>;

    /// Block until every rank has entered the barrier.
    fn barrier(&self);
}
