use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::loader::{load_table, LoadError};
use super::model::MetadataTable;

/// Loaded tables keyed by file path, invalidated when the file's
/// modification time changes.
///
/// Owned by the caller and passed by reference; a table is parsed once and
/// shared across any number of filter/group passes.
#[derive(Debug, Default)]
pub struct TableCache {
    entries: HashMap<PathBuf, CachedTable>,
}

#[derive(Debug)]
struct CachedTable {
    modified: Option<SystemTime>,
    table: Arc<MetadataTable>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the table for `path`, reading it only when it is not cached or
    /// the file changed since it was cached.
    pub fn load(&mut self, path: &Path) -> Result<Arc<MetadataTable>, LoadError> {
        let io_err = |source| LoadError::Io {
            path: path.display().to_string(),
            source,
        };
        let key = path.canonicalize().map_err(io_err)?;
        let modified = std::fs::metadata(&key).map_err(io_err)?.modified().ok();

        if let Some(hit) = self.entries.get(&key) {
            if hit.modified.is_some() && hit.modified == modified {
                log::debug!("table cache hit for {}", key.display());
                return Ok(Arc::clone(&hit.table));
            }
        }

        log::debug!("table cache miss for {}", key.display());
        let table = Arc::new(load_table(&key)?);
        self.entries.insert(
            key,
            CachedTable {
                modified,
                table: Arc::clone(&table),
            },
        );
        Ok(table)
    }

    /// Drop every cached table.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
