//! Index store: opens or creates the backing tantivy index.

use crate::config::{IndexConfig, StoreLocation};
use crate::error::{IndexError, IndexResult};
use crate::record::{build_schema, IndexFields};
use std::path::Path;
use tantivy::schema::Schema;
use tantivy::Index;
use tracing::info;

/// The durable segment store behind the writer and the snapshot manager.
///
/// Treats the segment format as opaque; all this layer decides is where the
/// segments live and which schema they follow.
pub struct IndexStore {
    index: Index,
    schema: Schema,
    fields: IndexFields,
    location: StoreLocation,
}

impl IndexStore {
    /// Open the store described by `config`, creating it if absent.
    pub fn open(config: &IndexConfig) -> IndexResult<Self> {
        let (schema, fields) = build_schema();

        let index = match &config.store {
            StoreLocation::Memory => Index::create_in_ram(schema.clone()),
            StoreLocation::Directory(path) => {
                std::fs::create_dir_all(path).map_err(|e| {
                    IndexError::Init(format!("failed to create index directory: {}", e))
                })?;

                if Self::index_exists(path) {
                    Index::open_in_dir(path).map_err(|e| {
                        IndexError::Init(format!("failed to open existing index: {}", e))
                    })?
                } else {
                    Index::create_in_dir(path, schema.clone()).map_err(|e| {
                        IndexError::Init(format!("failed to create new index: {}", e))
                    })?
                }
            }
        };

        info!(store = ?config.store, "index store opened");

        Ok(Self {
            index,
            schema,
            fields,
            location: config.store.clone(),
        })
    }

    /// Check if an index exists at the given path
    fn index_exists(path: &Path) -> bool {
        path.join("meta.json").exists()
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn fields(&self) -> &IndexFields {
        &self.fields
    }

    /// Approximate on-disk footprint; zero for in-memory stores.
    pub fn store_size_bytes(&self) -> u64 {
        match &self.location {
            StoreLocation::Memory => 0,
            StoreLocation::Directory(path) => std::fs::read_dir(path)
                .map(|entries| {
                    entries
                        .filter_map(|e| e.ok())
                        .filter_map(|e| e.metadata().ok())
                        .map(|m| m.len())
                        .sum()
                })
                .unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn opens_in_memory() {
        let store = IndexStore::open(&IndexConfig::in_memory()).unwrap();
        assert_eq!(store.store_size_bytes(), 0);
    }

    #[test]
    fn creates_then_reopens_directory() {
        let dir = TempDir::new().unwrap();
        let config = IndexConfig::in_directory(dir.path());

        let store = IndexStore::open(&config).unwrap();
        drop(store);

        // Second open must hit the existing-index path, not recreate
        let reopened = IndexStore::open(&config);
        assert!(reopened.is_ok());
    }
}
