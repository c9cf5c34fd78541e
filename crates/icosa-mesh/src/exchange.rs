//! Hand-off of finished meshes from the LOD worker to the render thread.
//!
//! The worker builds a [`MeshSnapshot`] on its own stack and publishes it
//! with a pointer swap. The render thread polls a lock-free generation
//! counter every frame and only takes the lock when there is something new,
//! so it never waits on a rebuild and never sees a half-written buffer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::snapshot::MeshSnapshot;

pub struct MeshExchange {
    current: Mutex<Arc<MeshSnapshot>>,
    generation: AtomicU64,
}

impl MeshExchange {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(Arc::new(MeshSnapshot::empty())),
            generation: AtomicU64::new(0),
        }
    }

    /// Publish `snapshot` and return the generation assigned to it.
    ///
    /// Intended for a single publisher. The lock is held only for the
    /// pointer swap; the previous snapshot is dropped after it is released.
    pub fn publish(&self, mut snapshot: MeshSnapshot) -> u64 {
        let generation = self.generation.load(Ordering::Acquire) + 1;
        snapshot.generation = generation;
        let snapshot = Arc::new(snapshot);

        let previous = {
            let mut slot = self.lock();
            let previous = std::mem::replace(&mut *slot, snapshot);
            self.generation.store(generation, Ordering::Release);
            previous
        };
        drop(previous);
        generation
    }

    /// Generation of the most recent publication, 0 before the first.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn latest(&self) -> Arc<MeshSnapshot> {
        Arc::clone(&self.lock())
    }

    /// The latest snapshot if it is newer than generation `seen`.
    pub fn latest_if_newer(&self, seen: u64) -> Option<Arc<MeshSnapshot>> {
        if self.generation() <= seen {
            return None;
        }
        Some(self.latest())
    }

    // The slot only ever holds a complete Arc, so a poisoned lock is safe
    // to keep using.
    fn lock(&self) -> MutexGuard<'_, Arc<MeshSnapshot>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MeshExchange {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::vertex::PlanetVertex;

    fn snapshot_with(count: usize) -> MeshSnapshot {
        MeshSnapshot {
            vertices: vec![PlanetVertex::default(); count],
            indices: (0..count as u32).collect(),
            leaf_count: count / 3,
            ..MeshSnapshot::empty()
        }
    }

    #[test]
    fn test_starts_empty_at_generation_zero() {
        let exchange = MeshExchange::new();
        assert_eq!(exchange.generation(), 0);
        assert!(exchange.latest().is_empty());
        assert!(exchange.latest_if_newer(0).is_none());
    }

    #[test]
    fn test_publish_assigns_increasing_generations() {
        let exchange = MeshExchange::new();
        assert_eq!(exchange.publish(snapshot_with(3)), 1);
        assert_eq!(exchange.publish(snapshot_with(6)), 2);
        let latest = exchange.latest();
        assert_eq!(latest.generation, 2);
        assert_eq!(latest.vertices.len(), 6);
    }

    #[test]
    fn test_latest_if_newer_only_reports_new_publications() {
        let exchange = MeshExchange::new();
        exchange.publish(snapshot_with(3));
        let first = exchange.latest_if_newer(0).expect("generation 1 is newer");
        assert_eq!(first.generation, 1);
        assert!(exchange.latest_if_newer(first.generation).is_none());

        exchange.publish(snapshot_with(9));
        let second = exchange.latest_if_newer(first.generation).expect("newer");
        assert_eq!(second.triangle_count(), 3);
    }

    #[test]
    fn test_reader_keeps_old_snapshot_alive() {
        let exchange = MeshExchange::new();
        exchange.publish(snapshot_with(3));
        let held = exchange.latest();
        exchange.publish(snapshot_with(6));
        assert_eq!(held.vertices.len(), 3, "held snapshot must not change");
    }

    #[test]
    fn test_concurrent_reader_never_sees_partial_snapshot() {
        let exchange = Arc::new(MeshExchange::new());
        let writer = {
            let exchange = Arc::clone(&exchange);
            thread::spawn(move || {
                for i in 1..=200 {
                    exchange.publish(snapshot_with(i * 3));
                }
            })
        };

        let mut seen = 0;
        while seen < 200 {
            if let Some(snapshot) = exchange.latest_if_newer(seen) {
                assert!(snapshot.generation > seen, "generations must increase");
                assert_eq!(snapshot.vertices.len(), snapshot.indices.len());
                assert_eq!(snapshot.vertices.len() as u64, snapshot.generation * 3);
                seen = snapshot.generation;
            }
        }
        writer.join().expect("writer thread");
    }
}
