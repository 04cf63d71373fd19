use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;

use crate::error::TtlError;

/// Expiry sentinel written by [`Registry::expire`]: the identifier is
/// already expired and will be reclaimed by the next sweep.
pub const EXPIRED: i64 = -1;

/// Reverse index: expiry second → identifiers holding that expiry.
///
/// The inner value repeats the outer key so a read can verify the bucket
/// entry against the forward index.
type ExpiryBuckets = HashMap<i64, HashMap<u64, i64>>;

/// Both indices live behind one lock so a write migrating an identifier
/// between buckets is atomic with respect to readers.
#[derive(Debug, Default)]
struct Indices {
    forward: HashMap<u64, i64>,
    by_expiry: ExpiryBuckets,
}

struct RegistryInner {
    indices: RwLock<Indices>,
    /// Sender to signal shutdown to the background sweeper
    shutdown_tx: watch::Sender<bool>,
}

/// Thread-safe registry of identifier expirations.
///
/// Holds a forward index (identifier → expiry) as the source of truth and a
/// reverse index (expiry → identifiers) that lets [`sweep`](Registry::sweep)
/// visit only the buckets whose timestamp has elapsed, instead of scanning
/// every entry. [`ttl`](Registry::ttl) re-validates both indices on every
/// read and reports disagreement as a distinct error.
///
/// The registry is cheap to clone (internal `Arc`); clones share state.
/// Writers exclude each other and all readers for their full duration, so a
/// read never observes a partially applied update or sweep.
///
/// # Example
///
/// ```rust
/// use ttl_registry::Registry;
///
/// let registry = Registry::new();
/// registry.set_ttl(7, 1_900_000_000);
/// assert_eq!(registry.ttl(7).unwrap(), 1_900_000_000);
/// ```
#[derive(Clone)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

impl Registry {
    /// Creates an empty registry.
    ///
    /// Construction spawns nothing and needs no async runtime; pair the
    /// registry with a [`Sweeper`](crate::Sweeper) for timer-driven sweeps.
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(RegistryInner {
                indices: RwLock::new(Indices::default()),
                shutdown_tx,
            }),
        }
    }

    /// Records or updates the expiration for `id`, as epoch seconds.
    ///
    /// If the identifier already held a different expiry, its entry in the
    /// old reverse bucket is removed (and the bucket deleted once empty)
    /// before the new bucket gains it, so no stale bucket entry survives an
    /// update. Accepts any value, including the [`EXPIRED`] sentinel.
    pub fn set_ttl(&self, id: u64, expires_at: i64) {
        let mut indices = self.inner.indices.write();
        let Indices { forward, by_expiry } = &mut *indices;

        if let Some(previous) = forward.insert(id, expires_at) {
            if previous != expires_at {
                if let Some(bucket) = by_expiry.get_mut(&previous) {
                    bucket.remove(&id);
                    if bucket.is_empty() {
                        by_expiry.remove(&previous);
                    }
                }
            }
        }

        by_expiry.entry(expires_at).or_default().insert(id, expires_at);
    }

    /// Returns the recorded expiration for `id`.
    ///
    /// The reverse index is consulted as authoritative confirmation, not as
    /// an optimization: a successful return is the statement that both
    /// indices agree for this identifier.
    ///
    /// This is a pure read. An identifier whose expiry has passed but which
    /// has not been swept yet still reports its recorded expiry.
    ///
    /// # Errors
    ///
    /// - [`TtlError::NoSuchIdentifier`] if `id` was never set or has been
    ///   swept
    /// - [`TtlError::InconsistentState`] if no reverse bucket exists for the
    ///   recorded expiry
    /// - [`TtlError::InconsistentTtl`] if the bucket exists but is missing
    ///   `id` or holds a mismatched value
    pub fn ttl(&self, id: u64) -> Result<i64, TtlError> {
        let indices = self.inner.indices.read();

        let expires_at = *indices
            .forward
            .get(&id)
            .ok_or(TtlError::NoSuchIdentifier)?;

        let bucket = indices
            .by_expiry
            .get(&expires_at)
            .ok_or(TtlError::InconsistentState)?;

        match bucket.get(&id) {
            Some(recorded) if *recorded == expires_at => Ok(expires_at),
            _ => Err(TtlError::InconsistentTtl),
        }
    }

    /// Marks `id` as expired immediately.
    ///
    /// Equivalent to `set_ttl(id, EXPIRED)`. The identifier remains
    /// queryable, reporting [`EXPIRED`], until the next sweep removes it.
    pub fn expire(&self, id: u64) {
        self.set_ttl(id, EXPIRED);
    }

    /// Removes every identifier whose expiry is strictly before `now`.
    ///
    /// Visits only the reverse buckets whose timestamp has elapsed, deletes
    /// their identifiers from the forward index, then drops the buckets.
    /// Runs under the exclusive lock for its full duration; the pause is
    /// proportional to the number of elapsed buckets, not the registry size.
    ///
    /// Returns the number of identifiers removed. Idempotent: a second call
    /// with the same `now` and no intervening writes removes nothing.
    pub fn sweep(&self, now: i64) -> usize {
        let mut indices = self.inner.indices.write();
        let Indices { forward, by_expiry } = &mut *indices;

        let elapsed: Vec<i64> = by_expiry
            .keys()
            .copied()
            .filter(|stamp| *stamp < now)
            .collect();

        let mut removed = 0;
        for stamp in elapsed {
            if let Some(bucket) = by_expiry.remove(&stamp) {
                for id in bucket.keys() {
                    if forward.remove(id).is_some() {
                        removed += 1;
                    }
                }
            }
        }
        removed
    }

    /// Returns the number of registered identifiers (including expired ones
    /// not yet swept).
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.indices.read().forward.len()
    }

    /// Returns `true` if no identifiers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.indices.read().forward.is_empty()
    }

    /// Returns the number of distinct expiry values currently indexed.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.inner.indices.read().by_expiry.len()
    }

    /// Signals the background sweeper (if any) to stop.
    ///
    /// This is also sent automatically when the last handle is dropped, but
    /// a running [`Sweeper`](crate::Sweeper) holds its own handle, so call
    /// this to stop one explicitly.
    pub fn shutdown(&self) {
        let _ = self.inner.shutdown_tx.send(true);
    }

    pub(crate) fn subscribe_shutdown(&self) -> watch::Receiver<bool> {
        self.inner.shutdown_tx.subscribe()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RegistryInner {
    fn drop(&mut self) {
        // Signal the sweeper to stop when the registry is dropped
        let _ = self.shutdown_tx.send(true);
    }
}
