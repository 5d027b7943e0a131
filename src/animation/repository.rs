//! Shared sequence storage.
//!
//! [`SequenceRepository`] hands out [`SharedSequence`]s keyed by identity.
//! Each identity has a construction routine registered up front; the routine
//! runs on the first `acquire` and every later call returns the same `Arc`
//! until the repository is discarded.
//!
//! Controllers register themselves on creation and release on teardown.
//! When the last one goes away the repository discards every live sequence,
//! so a reloaded host starts from freshly built data.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::animation::sequence::Sequence;
use crate::errors::{AnimaError, Result};

/// Reference-counted handle to immutable sequence data.
pub type SharedSequence = Arc<Sequence>;

type SequenceSource = Arc<dyn Fn() -> Result<Sequence> + Send + Sync>;

#[derive(Default)]
struct RepositoryInner {
    sources: FxHashMap<String, SequenceSource>,
    live: FxHashMap<String, SharedSequence>,
    controllers: usize,
}

/// Identity-keyed cache of shared sequences.
///
/// All access goes through one mutex, so `acquire` and `discard_all` are
/// serialized even when a host drives controllers from several threads.
/// Construction routines run with the lock held and must not call back into
/// the repository.
#[derive(Default)]
pub struct SequenceRepository {
    inner: Mutex<RepositoryInner>,
}

impl SequenceRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates `name` with the routine that builds it.
    ///
    /// Replacing a source does not touch an instance that is already live.
    pub fn register<F>(&self, name: impl Into<String>, source: F)
    where
        F: Fn() -> Result<Sequence> + Send + Sync + 'static,
    {
        let mut guard = self.inner.lock();
        guard.sources.insert(name.into(), Arc::new(source));
    }

    /// Registers a sequence authored as JSON; decoding happens on first acquire.
    pub fn register_json(&self, name: impl Into<String>, json: impl Into<String>) {
        let json: String = json.into();
        self.register(name, move || Sequence::from_json(&json));
    }

    /// Returns the shared instance for `name`, building it on first use.
    pub fn acquire(&self, name: &str) -> Result<SharedSequence> {
        let mut guard = self.inner.lock();
        if let Some(sequence) = guard.live.get(name) {
            return Ok(Arc::clone(sequence));
        }

        let source = guard
            .sources
            .get(name)
            .cloned()
            .ok_or_else(|| AnimaError::UnknownSequence(name.to_string()))?;
        let sequence = Arc::new(source()?);
        log::debug!(
            "Constructed sequence '{}' ({} keyframes, frames {}..={} @ {} fps)",
            name,
            sequence.len(),
            sequence.frame_start(),
            sequence.frame_end(),
            sequence.frame_rate()
        );
        guard.live.insert(name.to_string(), Arc::clone(&sequence));
        Ok(sequence)
    }

    /// Whether `name` currently has a constructed instance.
    #[must_use]
    pub fn is_live(&self, name: &str) -> bool {
        self.inner.lock().live.contains_key(name)
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.inner.lock().live.len()
    }

    /// Drops the repository's instance of `name`, releasing it. The next
    /// acquire rebuilds it.
    pub fn discard(&self, name: &str) -> bool {
        let removed = self.inner.lock().live.remove(name);
        if let Some(sequence) = &removed {
            log::debug!(
                "Discarded sequence '{}' ({} outside holders)",
                name,
                Arc::strong_count(sequence) - 1
            );
        }
        removed.is_some()
    }

    /// Releases every live instance and returns how many were dropped.
    ///
    /// Dropping the repository's `Arc` is the release of a sequence; there is
    /// no separate hook. Parts that still hold a sequence keep their copy
    /// alive; the repository simply forgets it.
    pub fn discard_all(&self) -> usize {
        let drained: Vec<(String, SharedSequence)> = self.inner.lock().live.drain().collect();
        for (name, sequence) in &drained {
            log::debug!(
                "Discarded sequence '{}' ({} outside holders)",
                name,
                Arc::strong_count(sequence) - 1
            );
        }
        drained.len()
    }

    /// Counts one more live controller. Returns the new count.
    pub fn register_controller(&self) -> usize {
        let mut guard = self.inner.lock();
        guard.controllers += 1;
        guard.controllers
    }

    /// Counts one controller less; reaching zero discards every sequence.
    pub fn release_controller(&self) -> usize {
        let remaining = {
            let mut guard = self.inner.lock();
            if guard.controllers == 0 {
                return 0;
            }
            guard.controllers -= 1;
            guard.controllers
        };
        if remaining == 0 {
            log::debug!("Last controller released, discarding sequences");
            self.discard_all();
        }
        remaining
    }

    #[must_use]
    pub fn controller_count(&self) -> usize {
        self.inner.lock().controllers
    }
}

impl std::fmt::Debug for SequenceRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let guard = self.inner.lock();
        f.debug_struct("SequenceRepository")
            .field("sources", &guard.sources.len())
            .field("live", &guard.live.len())
            .field("controllers", &guard.controllers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_repo() -> (SequenceRepository, Arc<AtomicUsize>) {
        let builds = Arc::new(AtomicUsize::new(0));
        let repo = SequenceRepository::new();
        let counter = Arc::clone(&builds);
        repo.register("idle", move || {
            counter.fetch_add(1, Ordering::Relaxed);
            Sequence::builder("idle").frames(0, 0).none().build()
        });
        (repo, builds)
    }

    #[test]
    fn test_source_runs_once_until_discard() {
        let (repo, builds) = counting_repo();
        let _a = repo.acquire("idle").unwrap();
        let _b = repo.acquire("idle").unwrap();
        assert_eq!(builds.load(Ordering::Relaxed), 1);

        assert_eq!(repo.discard_all(), 1);
        let _c = repo.acquire("idle").unwrap();
        assert_eq!(builds.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_controller_count_saturates() {
        let (repo, _) = counting_repo();
        assert_eq!(repo.release_controller(), 0);
        assert_eq!(repo.register_controller(), 1);
        assert_eq!(repo.release_controller(), 0);
        assert_eq!(repo.controller_count(), 0);
    }

    #[test]
    fn test_single_discard() {
        let (repo, _) = counting_repo();
        repo.acquire("idle").unwrap();
        assert!(repo.discard("idle"));
        assert!(!repo.discard("idle"));
        assert!(!repo.is_live("idle"));
    }
}
