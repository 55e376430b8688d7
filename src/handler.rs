//! Process-wide indexing façade: lifecycle, mutations, and search.

use crate::config::IndexConfig;
use crate::error::{IndexError, IndexResult};
use crate::query::{self, SearchQuery, SearchResponse};
use crate::record::{DocumentRecord, FileRecord, RecordKey};
use crate::snapshot::{Snapshot, SnapshotManager};
use crate::store::IndexStore;
use crate::writer::SegmentWriter;
use serde::{Deserialize, Serialize};
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

/// Index statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    /// Live entries visible to the current snapshot
    pub total_entries: u64,

    /// Number of segments behind the current snapshot
    pub num_segments: usize,

    /// Approximate store footprint in bytes (zero for in-memory stores)
    pub store_size_bytes: u64,

    /// Generation of the snapshot these numbers describe
    pub generation: u64,
}

struct Core {
    store: IndexStore,
    writer: Mutex<SegmentWriter>,
    snapshots: SnapshotManager,
}

enum HandlerState {
    Created,
    Started(Arc<Core>),
    Stopped,
}

/// The only component other subsystems talk to.
///
/// Explicitly constructed and explicitly owned: build one with
/// [`new`](Self::new), call [`start_up`](Self::start_up) from the
/// application's boot sequence, and pass it by reference to whatever needs
/// it. Designed for many concurrent readers and one logical writer stream:
/// every mutation serializes on an internal lock while queries run freely
/// against the live snapshot.
///
/// A failed index mutation must not fail the originating domain
/// transaction: the index may go transiently stale relative to the source
/// of truth and is recoverable via [`rebuild_index`](Self::rebuild_index).
pub struct IndexingHandler {
    config: IndexConfig,
    state: RwLock<HandlerState>,
}

impl IndexingHandler {
    /// Create a handler; the store is not touched until `start_up`.
    pub fn new(config: IndexConfig) -> Self {
        Self {
            config,
            state: RwLock::new(HandlerState::Created),
        }
    }

    /// Open the store, construct the writer, and open the initial snapshot
    /// so the first query has a valid (possibly empty) view.
    ///
    /// Idempotent while started; fails with [`IndexError::Closed`] once the
    /// handler has been shut down.
    pub async fn start_up(&self) -> IndexResult<()> {
        let mut state = self.state.write().await;
        match &*state {
            HandlerState::Started(_) => return Ok(()),
            HandlerState::Stopped => return Err(IndexError::Closed),
            HandlerState::Created => {}
        }

        let store = IndexStore::open(&self.config)?;
        let committed = Arc::new(AtomicU64::new(0));
        let writer = SegmentWriter::new(&store, self.config.writer_heap_size, committed.clone())?;
        let snapshots = SnapshotManager::new(&store, committed)?;
        snapshots.ensure_open().await?;

        *state = HandlerState::Started(Arc::new(Core {
            store,
            writer: Mutex::new(writer),
            snapshots,
        }));
        info!("indexing handler started");
        Ok(())
    }

    /// Flush pending state and release the snapshot manager, writer, and
    /// store. Idempotent; everything afterwards fails with `Closed`.
    pub async fn shut_down(&self) -> IndexResult<()> {
        let mut state = self.state.write().await;
        let core = match std::mem::replace(&mut *state, HandlerState::Stopped) {
            HandlerState::Started(core) => core,
            // Never started or already stopped: nothing to release
            HandlerState::Created | HandlerState::Stopped => return Ok(()),
        };
        drop(state);

        let flush_result = {
            let mut writer = core.writer.lock().await;
            writer.flush()
        };
        core.snapshots.close().await;
        drop(core);
        info!("indexing handler shut down");

        match flush_result {
            Ok(_) => Ok(()),
            // A faulted writer has nothing left to flush
            Err(IndexError::Closed) => Ok(()),
            Err(e) => {
                warn!(error = %e, "final flush failed during shutdown");
                Err(e)
            }
        }
    }

    /// Index a new document.
    pub async fn create_document(&self, record: &DocumentRecord) -> IndexResult<()> {
        let core = self.core().await?;
        let mut writer = core.writer.lock().await;
        writer.add_document(record)?;
        writer.flush()?;
        Ok(())
    }

    /// Re-index a document in full, replacing any previous entry with its id.
    pub async fn update_document(&self, record: &DocumentRecord) -> IndexResult<()> {
        let core = self.core().await?;
        let mut writer = core.writer.lock().await;
        writer.replace(record)?;
        writer.flush()?;
        Ok(())
    }

    /// Remove a document's entry from the index.
    ///
    /// Does not cascade to the document's files: the persistence layer emits
    /// explicit per-file delete events when cascading is wanted.
    pub async fn delete_document(&self, id: &str) -> IndexResult<()> {
        let core = self.core().await?;
        let mut writer = core.writer.lock().await;
        writer.delete_by_key(&RecordKey::document(id))?;
        writer.flush()?;
        Ok(())
    }

    /// Index a new file.
    pub async fn create_file(&self, record: &FileRecord) -> IndexResult<()> {
        let core = self.core().await?;
        let mut writer = core.writer.lock().await;
        writer.add_file(record)?;
        writer.flush()?;
        Ok(())
    }

    /// Re-index a file in full, replacing any previous entry with its id.
    pub async fn update_file(&self, record: &FileRecord) -> IndexResult<()> {
        let core = self.core().await?;
        let mut writer = core.writer.lock().await;
        writer.replace(record)?;
        writer.flush()?;
        Ok(())
    }

    /// Remove a file's entry from the index.
    pub async fn delete_file(&self, id: &str) -> IndexResult<()> {
        let core = self.core().await?;
        let mut writer = core.writer.lock().await;
        writer.delete_by_key(&RecordKey::file(id))?;
        writer.flush()?;
        Ok(())
    }

    /// Remove every entry. Used for full reindex bootstrapping.
    pub async fn clear_index(&self) -> IndexResult<()> {
        let core = self.core().await?;
        let mut writer = core.writer.lock().await;
        writer.clear_all()?;
        writer.flush()?;
        info!("index cleared");
        Ok(())
    }

    /// Clear the index and re-add every supplied record in one flush batch:
    /// all of it becomes visible together at the next refresh.
    pub async fn rebuild_index(
        &self,
        documents: &[DocumentRecord],
        files: &[FileRecord],
    ) -> IndexResult<()> {
        let core = self.core().await?;
        let mut writer = core.writer.lock().await;
        writer.clear_all()?;
        for record in documents {
            writer.add_document(record)?;
        }
        for record in files {
            writer.add_file(record)?;
        }
        writer.flush()?;
        info!(
            documents = documents.len(),
            files = files.len(),
            "index rebuilt"
        );
        Ok(())
    }

    /// Refresh the read view if the writer has flushed since it was opened,
    /// and return the live snapshot.
    pub async fn refresh(&self) -> IndexResult<Arc<Snapshot>> {
        let core = self.core().await?;
        core.snapshots.refresh_if_changed().await
    }

    /// The live snapshot without checking for newer flushed state.
    pub async fn snapshot(&self) -> IndexResult<Arc<Snapshot>> {
        let core = self.core().await?;
        core.snapshots.current().await
    }

    /// Refresh, then run `query` against the fresh snapshot.
    pub async fn search(&self, query: &SearchQuery) -> IndexResult<SearchResponse> {
        let core = self.core().await?;
        let snapshot = core.snapshots.refresh_if_changed().await?;
        query::execute(query, &snapshot, core.store.fields(), self.config.max_results)
    }

    /// Statistics for the freshest available view.
    pub async fn stats(&self) -> IndexResult<IndexStats> {
        let core = self.core().await?;
        let snapshot = core.snapshots.refresh_if_changed().await?;
        Ok(IndexStats {
            total_entries: snapshot.num_entries(),
            num_segments: snapshot.searcher().segment_readers().len(),
            store_size_bytes: core.store.store_size_bytes(),
            generation: snapshot.generation(),
        })
    }

    async fn core(&self) -> IndexResult<Arc<Core>> {
        match &*self.state.read().await {
            HandlerState::Started(core) => Ok(core.clone()),
            HandlerState::Created | HandlerState::Stopped => Err(IndexError::Closed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn started_handler() -> IndexingHandler {
        let handler = IndexingHandler::new(IndexConfig::in_memory());
        handler.start_up().await.unwrap();
        handler
    }

    #[tokio::test]
    async fn start_up_is_idempotent() {
        let handler = started_handler().await;
        handler.start_up().await.unwrap();

        let snapshot = handler.snapshot().await.unwrap();
        assert_eq!(snapshot.num_entries(), 0);
    }

    #[tokio::test]
    async fn operations_before_start_up_fail_closed() {
        let handler = IndexingHandler::new(IndexConfig::in_memory());
        let result = handler
            .create_document(&DocumentRecord::new("1", "Test Document"))
            .await;
        assert!(matches!(result, Err(IndexError::Closed)));
    }

    #[tokio::test]
    async fn shut_down_is_idempotent_and_terminal() {
        let handler = started_handler().await;
        handler.shut_down().await.unwrap();
        handler.shut_down().await.unwrap();

        assert!(matches!(
            handler.start_up().await,
            Err(IndexError::Closed)
        ));
        assert!(matches!(
            handler.clear_index().await,
            Err(IndexError::Closed)
        ));
    }
}
