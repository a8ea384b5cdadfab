//! The store interface (spec.md §4.D): an opaque key/value map plus a
//! monotonically increasing counter. The core only depends on the trait;
//! `MemStore` is the default in-process implementation, and `redb_store`
//! (feature `redb-store`) is a persistent one.

use crate::error::Result;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

pub trait SchemaStore: Send + Sync {
    /// Unconditional put. Callers never rewrite a changed value for the
    /// same key, so overwriting with identical bytes is always safe.
    fn store(&self, key: &str, data: &[u8]) -> Result<()>;

    fn load(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Atomically increments and returns the previous value.
    fn next_counter(&self) -> Result<u64>;
}

/// In-memory store. Thread-safe: `next_counter` via an atomic, and
/// disjoint-key `store`/`load` are safe under the shared `RwLock`.
#[derive(Debug, Default)]
pub struct MemStore {
    map: RwLock<HashMap<String, Vec<u8>>>,
    counter: AtomicU64,
}

impl MemStore {
    pub fn new() -> Self {
        MemStore::default()
    }
}

impl SchemaStore for MemStore {
    fn store(&self, key: &str, data: &[u8]) -> Result<()> {
        self.map.write().insert(key.to_string(), data.to_vec());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.map.read().get(key).cloned())
    }

    fn next_counter(&self) -> Result<u64> {
        Ok(self.counter.fetch_add(1, Ordering::Relaxed))
    }
}
