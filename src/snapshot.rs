//! Point-in-time read views over the index and their lifecycle.

use crate::error::{IndexError, IndexResult};
use crate::store::IndexStore;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tantivy::{IndexReader, ReloadPolicy, Searcher};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// An immutable point-in-time view of the index.
///
/// Handed to readers as `Arc<Snapshot>`: in-flight queries keep their view
/// alive across swaps, and the underlying segments are released when the
/// last holder drops.
pub struct Snapshot {
    searcher: Searcher,
    generation: u64,
    opstamp: u64,
}

impl Snapshot {
    /// Monotonic version marker, bumped on every successful swap.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The writer flush this view reflects.
    pub fn opstamp(&self) -> u64 {
        self.opstamp
    }

    /// Number of live entries visible to this view.
    pub fn num_entries(&self) -> u64 {
        self.searcher.num_docs()
    }

    pub fn searcher(&self) -> &Searcher {
        &self.searcher
    }
}

enum SnapshotState {
    Uninitialized,
    Open(Arc<Snapshot>),
    Closed,
}

/// Owns the currently-visible snapshot and refreshes it on demand.
///
/// Freshness is pull-based and explicit: the reader is built with
/// [`ReloadPolicy::Manual`] and only [`refresh_if_changed`](Self::refresh_if_changed)
/// ever swaps the live view. Opening a snapshot costs time proportional to
/// the changed segments, which is why nothing here refreshes on a hidden
/// timer.
pub struct SnapshotManager {
    reader: IndexReader,
    committed: Arc<AtomicU64>,
    state: RwLock<SnapshotState>,
}

impl SnapshotManager {
    pub(crate) fn new(store: &IndexStore, committed: Arc<AtomicU64>) -> IndexResult<Self> {
        let reader = store
            .index()
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e: tantivy::TantivyError| {
                IndexError::Init(format!("failed to create index reader: {}", e))
            })?;

        Ok(Self {
            reader,
            committed,
            state: RwLock::new(SnapshotState::Uninitialized),
        })
    }

    /// Open the first snapshot; a no-op when one is already live.
    pub async fn ensure_open(&self) -> IndexResult<Arc<Snapshot>> {
        let mut state = self.state.write().await;
        match &*state {
            SnapshotState::Closed => Err(IndexError::Closed),
            SnapshotState::Open(snapshot) => Ok(snapshot.clone()),
            SnapshotState::Uninitialized => {
                let snapshot = self.open_snapshot(0)?;
                *state = SnapshotState::Open(snapshot.clone());
                debug!(generation = 0, "initial snapshot opened");
                Ok(snapshot)
            }
        }
    }

    /// Swap in a fresh snapshot if the writer has flushed since the live one
    /// was opened; otherwise return the live snapshot unchanged.
    ///
    /// Either the swap completes and new readers see the fresh view, or the
    /// refresh fails and the previous snapshot remains authoritative. The
    /// writer is never blocked by this call.
    pub async fn refresh_if_changed(&self) -> IndexResult<Arc<Snapshot>> {
        let mut state = self.state.write().await;
        match &*state {
            SnapshotState::Closed => Err(IndexError::Closed),
            // A reader racing start-up gets the first open instead of an error
            SnapshotState::Uninitialized => {
                let snapshot = self.open_snapshot(0)?;
                *state = SnapshotState::Open(snapshot.clone());
                Ok(snapshot)
            }
            SnapshotState::Open(current) => {
                let committed = self.committed.load(Ordering::Acquire);
                if committed == current.opstamp {
                    return Ok(current.clone());
                }

                if let Err(e) = self.reader.reload() {
                    warn!(error = %e, "snapshot refresh failed, previous view stays live");
                    return Err(IndexError::from_read(e));
                }

                let snapshot = Arc::new(Snapshot {
                    searcher: self.reader.searcher(),
                    generation: current.generation + 1,
                    opstamp: committed,
                });
                debug!(
                    generation = snapshot.generation,
                    opstamp = committed,
                    "snapshot swapped"
                );
                *state = SnapshotState::Open(snapshot.clone());
                Ok(snapshot)
            }
        }
    }

    /// The live snapshot, without checking for newer flushed state.
    pub async fn current(&self) -> IndexResult<Arc<Snapshot>> {
        match &*self.state.read().await {
            SnapshotState::Open(snapshot) => Ok(snapshot.clone()),
            SnapshotState::Uninitialized => Err(IndexError::Read(
                "snapshot manager has not been opened".to_string(),
            )),
            SnapshotState::Closed => Err(IndexError::Closed),
        }
    }

    /// Release the live snapshot. In-flight readers holding an `Arc` finish
    /// against their view; everything after this fails with `Closed`.
    pub async fn close(&self) {
        let mut state = self.state.write().await;
        *state = SnapshotState::Closed;
        debug!("snapshot manager closed");
    }

    fn open_snapshot(&self, generation: u64) -> IndexResult<Arc<Snapshot>> {
        // reload() so a pre-existing on-disk index is visible immediately
        self.reader.reload().map_err(IndexError::from_read)?;
        Ok(Arc::new(Snapshot {
            searcher: self.reader.searcher(),
            generation,
            opstamp: self.committed.load(Ordering::Acquire),
        }))
    }
}
