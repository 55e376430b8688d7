//! Error types for the indexing subsystem

use tantivy::TantivyError;

/// Result type for index operations
pub type IndexResult<T> = std::result::Result<T, IndexError>;

/// Errors surfaced by the indexing subsystem.
///
/// Nothing in this crate retries internally: every failure is returned to the
/// caller, who owns the source-of-truth record and decides whether to resubmit
/// the originating domain event.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The index store, writer, or reader could not be opened
    #[error("index initialization failed: {0}")]
    Init(String),

    /// The store rejected a mutation; the writer remains usable and the
    /// whole logical operation may be retried
    #[error("index write failed: {0}")]
    Write(String),

    /// Snapshot open/refresh or search execution failed; the previous
    /// snapshot remains valid
    #[error("index read failed: {0}")]
    Read(String),

    /// The search text could not be parsed
    #[error("query parsing failed: {0}")]
    Query(String),

    /// The store reported structural corruption; the writer is faulted and
    /// the index must be rebuilt from the source of truth
    #[error("index corruption detected: {0}")]
    Corrupt(String),

    /// Operation attempted after `shut_down()` or after a fatal fault
    #[error("index is closed")]
    Closed,
}

impl IndexError {
    /// Classify a tantivy failure on the mutation path. Corruption is
    /// terminal for the writer; everything else is a recoverable write error.
    pub(crate) fn from_write(err: TantivyError) -> Self {
        match err {
            e @ TantivyError::DataCorruption(_) => IndexError::Corrupt(e.to_string()),
            e => IndexError::Write(e.to_string()),
        }
    }

    /// Classify a tantivy failure on the snapshot/search path.
    pub(crate) fn from_read(err: TantivyError) -> Self {
        match err {
            e @ TantivyError::DataCorruption(_) => IndexError::Corrupt(e.to_string()),
            e => IndexError::Read(e.to_string()),
        }
    }
}
