//! The single mutation path into the index store.

use crate::error::{IndexError, IndexResult};
use crate::record::{DocumentRecord, FileRecord, IndexFields, IndexableRecord, RecordKey};
use crate::store::IndexStore;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error};

/// Sole writer over the index store.
///
/// Not safe for concurrent mutation; the façade serializes access behind one
/// mutation lock. Buffered mutations become visible to new snapshots only
/// after [`flush`](Self::flush), which publishes the commit opstamp the
/// snapshot manager compares against.
///
/// A write failure leaves the writer usable for subsequent calls. Corruption
/// reported by the store is terminal: the writer faults and every further
/// operation fails fast with [`IndexError::Closed`].
pub struct SegmentWriter {
    writer: tantivy::IndexWriter,
    fields: IndexFields,
    committed: Arc<AtomicU64>,
    faulted: bool,
}

impl SegmentWriter {
    pub(crate) fn new(
        store: &IndexStore,
        heap_size: usize,
        committed: Arc<AtomicU64>,
    ) -> IndexResult<Self> {
        let writer = store
            .index()
            .writer(heap_size)
            .map_err(|e| IndexError::Init(format!("failed to create index writer: {}", e)))?;

        Ok(Self {
            writer,
            fields: *store.fields(),
            committed,
            faulted: false,
        })
    }

    /// Append a document entry.
    pub fn add_document(&mut self, record: &DocumentRecord) -> IndexResult<()> {
        self.add(record)
    }

    /// Append a file entry.
    pub fn add_file(&mut self, record: &FileRecord) -> IndexResult<()> {
        self.add(record)
    }

    fn add<R: IndexableRecord>(&mut self, record: &R) -> IndexResult<()> {
        self.ensure_usable()?;
        let doc = record.to_index_doc(&self.fields);
        self.writer
            .add_document(doc)
            .map_err(|e| self.fail(e))?;
        debug!(key = %record.key().token(), "entry added");
        Ok(())
    }

    /// Delete any live entry with `record`'s identity, then append the new
    /// projection. Both happen within one writer session, so a refresh can
    /// only observe the old entry or the new one once flushed, never a
    /// half-applied pair.
    pub fn replace<R: IndexableRecord>(&mut self, record: &R) -> IndexResult<()> {
        self.ensure_usable()?;
        let key = record.key();
        self.writer.delete_term(key.term(&self.fields));
        let doc = record.to_index_doc(&self.fields);
        self.writer
            .add_document(doc)
            .map_err(|e| self.fail(e))?;
        debug!(key = %key.token(), "entry replaced");
        Ok(())
    }

    /// Remove every entry matching the identity.
    pub fn delete_by_key(&mut self, key: &RecordKey) -> IndexResult<()> {
        self.ensure_usable()?;
        self.writer.delete_term(key.term(&self.fields));
        debug!(key = %key.token(), "entry deleted");
        Ok(())
    }

    /// Remove every entry in the index.
    pub fn clear_all(&mut self) -> IndexResult<()> {
        self.ensure_usable()?;
        self.writer
            .delete_all_documents()
            .map_err(|e| self.fail(e))?;
        debug!("all entries deleted");
        Ok(())
    }

    /// Commit buffered mutations and publish the resulting opstamp. New
    /// snapshots opened after a successful flush observe everything up to it.
    pub fn flush(&mut self) -> IndexResult<u64> {
        self.ensure_usable()?;
        let opstamp = self.writer.commit().map_err(|e| self.fail(e))?;
        self.committed.store(opstamp, Ordering::Release);
        debug!(opstamp, "index flushed");
        Ok(opstamp)
    }

    fn ensure_usable(&self) -> IndexResult<()> {
        if self.faulted {
            return Err(IndexError::Closed);
        }
        Ok(())
    }

    fn fail(&mut self, err: tantivy::TantivyError) -> IndexError {
        let classified = IndexError::from_write(err);
        if matches!(classified, IndexError::Corrupt(_)) {
            error!(error = %classified, "store corruption, writer faulted");
            self.faulted = true;
        }
        classified
    }
}
