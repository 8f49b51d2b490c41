//! In-process fabric: a rank group backed by shared memory.
//!
//! Every rank is an endpoint over the same [`Shared`] state: one mailbox per
//! rank for point-to-point messages, one broadcast queue per rank, and
//! round-numbered slots for the all-gather and barrier collectives. Rounds
//! advance independently per endpoint, so a rank cancelled mid-collective
//! never blocks the others; its deposit is already visible and later rounds
//! use fresh slots.

use super::{Envelope, Fabric, FabricError, Message, Rank, Source, Tag};
use crossbeam_channel::bounded;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Sleep between completion polls inside collectives and receives.
const POLL_INTERVAL: Duration = Duration::from_millis(1);

struct GatherRound {
    slots: Vec<Option<u16>>,
    read: usize,
}

struct BarrierRound {
    arrived: usize,
    departed: usize,
}

struct Shared {
    size: usize,
    /// Pending point-to-point messages per destination rank.
    mailboxes: Vec<Mutex<VecDeque<(Rank, Tag, Vec<u8>)>>>,
    /// Pending broadcast values per receiving rank.
    bcast: Vec<Mutex<VecDeque<[i32; 2]>>>,
    gathers: Mutex<HashMap<u64, GatherRound>>,
    barriers: Mutex<HashMap<u64, BarrierRound>>,
}

/// One rank's endpoint of an in-process group.
pub struct LocalFabric {
    rank: Rank,
    shared: Arc<Shared>,
    gather_round: AtomicU64,
    barrier_round: AtomicU64,
}

impl LocalFabric {
    /// Create a group of `size` connected endpoints, one per rank.
    pub fn group(size: usize) -> Vec<LocalFabric> {
        assert!(size > 0, "a fabric group needs at least one rank");
        let shared = Arc::new(Shared {
            size,
            mailboxes: (0..size).map(|_| Mutex::new(VecDeque::new())).collect(),
            bcast: (0..size).map(|_| Mutex::new(VecDeque::new())).collect(),
            gathers: Mutex::new(HashMap::new()),
            barriers: Mutex::new(HashMap::new()),
        });
        (0..size)
            .map(|rank| LocalFabric {
                rank,
                shared: Arc::clone(&shared),
                gather_round: AtomicU64::new(0),
                barrier_round: AtomicU64::new(0),
            })
            .collect()
    }

    fn matches(source: Source, from: Rank) -> bool {
        match source {
            Source::Any => true,
            Source::Rank(r) => r == from,
        }
    }
}

impl Fabric for LocalFabric {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn size(&self) -> usize {
        self.shared.size
    }

    fn send(&self, dest: Rank, tag: Tag, payload: Vec<u8>) -> Result<(), FabricError> {
        if dest >= self.shared.size {
            return Err(FabricError::RankOutOfRange {
                dest,
                size: self.shared.size,
            });
        }
        self.shared.mailboxes[dest]
            .lock()
            .push_back((self.rank, tag, payload));
        Ok(())
    }

    fn try_recv(&self, source: Source, tag: Tag) -> Option<Message> {
        let mut mailbox = self.shared.mailboxes[self.rank].lock();
        let at = mailbox
            .iter()
            .position(|(from, t, _)| *t == tag && Self::matches(source, *from))?;
        let (from, _, payload) = mailbox.remove(at)?;
        Some(Message {
            source: from,
            payload,
        })
    }

    fn probe(&self, source: Source, tag: Tag) -> Option<Envelope> {
        let mailbox = self.shared.mailboxes[self.rank].lock();
        mailbox
            .iter()
            .find(|(from, t, _)| *t == tag && Self::matches(source, *from))
            .map(|(from, t, payload)| Envelope {
                source: *from,
                tag: *t,
                len: payload.len(),
            })
    }

    fn broadcast(&self, root: Rank, value: [i32; 2], cancel: &AtomicBool) -> Option<[i32; 2]> {
        if self.rank == root {
            for (rank, queue) in self.shared.bcast.iter().enumerate() {
                if rank != root {
                    queue.lock().push_back(value);
                }
            }
            return Some(value);
        }
        loop {
            if let Some(v) = self.shared.bcast[self.rank].lock().pop_front() {
                return Some(v);
            }
            if cancel.load(Ordering::Acquire) {
                return None;
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    fn allgather(&self, value: u16, cancel: &AtomicBool) -> Option<Vec<u16>> {
        let round = self.gather_round.fetch_add(1, Ordering::Relaxed);
        let size = self.shared.size;
        {
            let mut gathers = self.shared.gathers.lock();
            let entry = gathers.entry(round).or_insert_with(|| GatherRound {
                slots: vec![None; size],
                read: 0,
            });
            entry.slots[self.rank] = Some(value);
        }
        loop {
            {
                let mut gathers = self.shared.gathers.lock();
                let entry = gathers.get_mut(&round).expect("gather round vanished");
                if entry.slots.iter().all(|s| s.is_some()) {
                    let values: Vec<u16> = entry.slots.iter().filter_map(|s| *s).collect();
                    entry.read += 1;
                    if entry.read == size {
                        gathers.remove(&round);
                    }
                    return Some(values);
                }
            }
            if cancel.load(Ordering::Acquire) {
                return None;
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    fn barrier(&self) {
        let round = self.barrier_round.fetch_add(1, Ordering::Relaxed);
        let size = self.shared.size;
        {
            let mut barriers = self.shared.barriers.lock();
            let entry = barriers
                .entry(round)
                .or_insert_with(|| BarrierRound {
                    arrived: 0,
                    departed: 0,
                });
            entry.arrived += 1;
        }
        loop {
            {
                let mut barriers = self.shared.barriers.lock();
                let entry = barriers.get_mut(&round).expect("barrier round vanished");
                if entry.arrived == size {
                    entry.departed += 1;
                    if entry.departed == size {
                        barriers.remove(&round);
                    }
                    return;
                }
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

/// Run one closure per rank of a fresh group, each on its own thread, and
/// collect the results indexed by rank.
pub fn run_group<R, F>(size: usize, f: F) -> Vec<R>
where
    R: Send,
    F: Fn(LocalFabric) -> R + Sync,
{
    let endpoints = LocalFabric::group(size);
    let (result_tx, result_rx) = bounded::<(Rank, R)>(size);

    thread::scope(|s| {
        for endpoint in endpoints {
            let result_tx = result_tx.clone();
            let f = &f;
            thread::Builder::new()
                .name(format!("chroma-rank-{}", endpoint.rank()))
                .spawn_scoped(s, move || {
                    let rank = endpoint.rank();
                    let _ = result_tx.send((rank, f(endpoint)));
                })
                .expect("Failed to spawn rank thread");
        }
        drop(result_tx);
    });

    let mut results: Vec<Option<R>> = (0..size).map(|_| None).collect();
    for (rank, result) in result_rx {
        results[rank] = Some(result);
    }
    results
        .into_iter()
        .map(|r| r.expect("rank thread exited without a result"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_to_point_is_fifo_per_source_and_tag() {
        let group = LocalFabric::group(2);
        group[0].send(1, 9, vec![1]).unwrap();
        group[0].send(1, 9, vec![2]).unwrap();
        group[0].send(1, 8, vec![3]).unwrap();

        let env = group[1].probe(Source::Any, 9).unwrap();
        assert_eq!(env.source, 0);
        assert_eq!(env.len, 1);

        assert_eq!(group[1].try_recv(Source::Rank(0), 9).unwrap().payload, [1]);
        assert_eq!(group[1].try_recv(Source::Any, 9).unwrap().payload, [2]);
        assert_eq!(group[1].try_recv(Source::Any, 8).unwrap().payload, [3]);
        assert!(group[1].try_recv(Source::Any, 9).is_none());
    }

    #[test]
    fn send_to_unknown_rank_is_an_error() {
        let group = LocalFabric::group(1);
        assert!(matches!(
            group[0].send(3, 1, vec![]),
            Err(FabricError::RankOutOfRange { dest: 3, size: 1 })
        ));
    }

    #[test]
    fn broadcast_reaches_every_rank_in_order() {
        let results = run_group(3, |fabric| {
            let cancel = AtomicBool::new(false);
            if fabric.rank() == 0 {
                let a = fabric.broadcast(0, [1, 0], &cancel).unwrap();
                let b = fabric.broadcast(0, [2, 0], &cancel).unwrap();
                (a, b)
            } else {
                let a = fabric.broadcast(0, [0, 0], &cancel).unwrap();
                let b = fabric.broadcast(0, [0, 0], &cancel).unwrap();
                (a, b)
            }
        });
        for (a, b) in results {
            assert_eq!(a, [1, 0]);
            assert_eq!(b, [2, 0]);
        }
    }

    #[test]
    fn broadcast_cancels_instead_of_blocking() {
        let group = LocalFabric::group(2);
        let cancel = AtomicBool::new(true);
        assert!(group[1].broadcast(0, [0, 0], &cancel).is_none());
    }

    #[test]
    fn allgather_collects_every_contribution() {
        let results = run_group(4, |fabric| {
            let cancel = AtomicBool::new(false);
            fabric.allgather(fabric.rank() as u16 + 10, &cancel).unwrap()
        });
        for gathered in results {
            assert_eq!(gathered, vec![10, 11, 12, 13]);
        }
    }

    #[test]
    fn barrier_releases_all_ranks() {
        use std::sync::atomic::AtomicUsize;
        let arrived = AtomicUsize::new(0);
        run_group(3, |fabric| {
            arrived.fetch_add(1, Ordering::SeqCst);
            fabric.barrier();
            assert_eq!(arrived.load(Ordering::SeqCst), 3);
        });
    }
}
