//! Index configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where index segments live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreLocation {
    /// Segments held entirely in memory; gone at shutdown. Used by tests
    /// and ephemeral deployments.
    Memory,

    /// Segments persisted under the given directory, created on first use.
    Directory(PathBuf),
}

/// Indexing subsystem configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Where the index store keeps its segments
    pub store: StoreLocation,

    /// Index writer heap size in bytes (default: 50MB)
    pub writer_heap_size: usize,

    /// Maximum search results a single query may return
    pub max_results: usize,

    /// Default page size when a query does not set a limit
    pub default_limit: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            store: StoreLocation::Memory,
            writer_heap_size: 50_000_000, // 50MB
            max_results: 1000,
            default_limit: 20,
        }
    }
}

impl IndexConfig {
    /// Configuration for an on-disk store rooted at `path`.
    pub fn in_directory(path: impl Into<PathBuf>) -> Self {
        Self {
            store: StoreLocation::Directory(path.into()),
            ..Default::default()
        }
    }

    /// Configuration for an in-memory store.
    pub fn in_memory() -> Self {
        Self::default()
    }
}

/// Builder for IndexConfig
pub struct IndexConfigBuilder {
    config: IndexConfig,
}

impl IndexConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: IndexConfig::default(),
        }
    }

    pub fn store(mut self, store: StoreLocation) -> Self {
        self.config.store = store;
        self
    }

    pub fn writer_heap_size(mut self, size: usize) -> Self {
        self.config.writer_heap_size = size;
        self
    }

    pub fn max_results(mut self, max: usize) -> Self {
        self.config.max_results = max;
        self
    }

    pub fn default_limit(mut self, limit: usize) -> Self {
        self.config.default_limit = limit;
        self
    }

    pub fn build(self) -> IndexConfig {
        self.config
    }
}

impl Default for IndexConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
