//! Schema document cache
//!
//! Parsed schemas keyed by the path they were loaded from. Unbounded, never
//! evicted; entries only change on a forced reload or a full [`SchemaCache::reset`].
//! Thread-safe with parking_lot RwLock. Atomic counters for diagnostics.

use crate::error::{Result, ValidatorError};
use crate::log_cache_operation;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct SchemaCache {
    entries: RwLock<HashMap<String, Arc<Value>>>,
    /// Lookups answered from memory
    hits: AtomicU64,
    /// Reads of a schema file from disk
    loads: AtomicU64,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the schema for `path`, reading it from disk when it is not
    /// cached yet or when `force_reload` is set.
    pub fn get_or_load(&self, path: &str, force_reload: bool) -> Result<Arc<Value>> {
        if !force_reload {
            if let Some(schema) = self.get(path) {
                return Ok(schema);
            }
        }
        self.load(path)
    }

    /// Look up a cached schema without touching the file system.
    pub fn get(&self, path: &str) -> Option<Arc<Value>> {
        let entries = self.entries.read();
        match entries.get(path) {
            Some(schema) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                log_cache_operation!(hit, path, "schema served from cache");
                Some(schema.clone())
            }
            None => {
                log_cache_operation!(miss, path, "schema not cached");
                None
            }
        }
    }

    /// Read and parse `path`, replacing any cached entry.
    ///
    /// Decode failures surface as [`ValidatorError::SchemaDecode`] and leave
    /// the cache untouched.
    pub fn load(&self, path: &str) -> Result<Arc<Value>> {
        let file = File::open(path).map_err(|source| ValidatorError::io(path, source))?;
        self.loads.fetch_add(1, Ordering::Relaxed);

        let schema: Value = serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            ValidatorError::SchemaDecode {
                path: path.to_string(),
                source,
            }
        })?;

        let schema = Arc::new(schema);
        self.entries.write().insert(path.to_string(), schema.clone());
        tracing::debug!(schema_path = path, "schema loaded");
        Ok(schema)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.read().contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Forget every cached schema and zero the counters.
    pub fn reset(&self) {
        self.entries.write().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.loads.store(0, Ordering::Relaxed);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub loads: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.loads;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
