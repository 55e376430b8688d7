//! Full-text indexing engine for a document-management platform, powered by
//! Tantivy.
//!
//! This crate projects mutable domain records (documents and their attached
//! files) into an inverted index and serves consistent, near-real-time
//! search views over it:
//!
//! - **Single write path**: one writer, serialized by the façade; updates
//!   are atomic delete-then-add by `(kind, id)` identity
//! - **Point-in-time reads**: reference-counted snapshots that in-flight
//!   queries keep across swaps
//! - **Pull-based freshness**: writes become visible after an explicit
//!   flush + refresh, never on a hidden timer
//! - **Explicit lifecycle**: start-up opens store, writer, and the initial
//!   snapshot; shutdown flushes and releases them
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │           IndexingHandler (façade)               │
//! ├─────────────────────────────────────────────────┤
//! │  create/update/delete document & file            │
//! │  clear_index()  rebuild_index()                  │
//! │  refresh()  search()  stats()                    │
//! └──────────────┬───────────────────┬──────────────┘
//!                │ mutations         │ reads
//!                ▼                   ▼
//! ┌──────────────────────┐  ┌───────────────────────┐
//! │    SegmentWriter     │  │    SnapshotManager    │
//! ├──────────────────────┤  ├───────────────────────┤
//! │  add / replace /     │  │  ensure_open()        │
//! │  delete / clear      │  │  refresh_if_changed() │
//! │  flush() → opstamp ──┼──┼─▶ swap on change      │
//! └──────────┬───────────┘  └───────────┬───────────┘
//!            ▼                          ▼
//! ┌─────────────────────────────────────────────────┐
//! │              IndexStore (tantivy)                │
//! │     in-memory or directory-backed segments       │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use docstack_search::{DocumentRecord, IndexConfig, IndexingHandler, SearchQuery};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let handler = IndexingHandler::new(IndexConfig::in_directory("./data/index"));
//!     handler.start_up().await?;
//!
//!     handler
//!         .create_document(&DocumentRecord::new("1", "Quarterly Report"))
//!         .await?;
//!
//!     let results = handler.search(&SearchQuery::new("quarterly")).await?;
//!     println!("found {} entries", results.total_hits);
//!
//!     handler.shut_down().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod handler;
pub mod query;
pub mod record;
pub mod snapshot;
pub mod store;
pub mod writer;

pub use config::{IndexConfig, IndexConfigBuilder, StoreLocation};
pub use error::{IndexError, IndexResult};
pub use handler::{IndexStats, IndexingHandler};
pub use query::{SearchHit, SearchQuery, SearchResponse};
pub use record::{DocumentRecord, FileRecord, IndexableRecord, RecordKey, RecordKind};
pub use snapshot::{Snapshot, SnapshotManager};
pub use store::IndexStore;
pub use writer::SegmentWriter;
