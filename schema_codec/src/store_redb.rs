//! Persistent `SchemaStore` backed by `redb`, grounded on the save-file
//! database pattern (key/value table + a dedicated counter key) used
//! elsewhere in this codebase for exactly this kind of durable metadata.

use crate::error::{Error, ErrorKind, Result};
use crate::store::SchemaStore;
use parking_lot::Mutex;
use redb::{Database, ReadableTable, TableDefinition};
use std::path::Path;

const TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("schema_codec");
const COUNTER_KEY: &[u8] = b"\0counter";

pub struct RedbStore {
    db: Database,
    // redb transactions are not internally serialized against each other for
    // read-modify-write of the counter, so guard the counter bump with a
    // lock the same way the in-memory store relies on its RwLock.
    counter_guard: Mutex<()>,
}

impl RedbStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Database::create(path).map_err(|e| Error::new(ErrorKind::Io, e))?;
        Ok(RedbStore { db, counter_guard: Mutex::new(()) })
    }
}

impl SchemaStore for RedbStore {
    fn store(&self, key: &str, data: &[u8]) -> Result<()> {
        let txn = self.db.begin_write().map_err(|e| Error::new(ErrorKind::Io, e))?;
        {
            let mut table = txn.open_table(TABLE).map_err(|e| Error::new(ErrorKind::Io, e))?;
            table
                .insert(key.as_bytes(), data)
                .map_err(|e| Error::new(ErrorKind::Io, e))?;
        }
        txn.commit().map_err(|e| Error::new(ErrorKind::Io, e))?;
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let txn = self.db.begin_read().map_err(|e| Error::new(ErrorKind::Io, e))?;
        let table = match txn.open_table(TABLE) {
            Ok(table) => table,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(Error::new(ErrorKind::Io, e)),
        };
        let value = table.get(key.as_bytes()).map_err(|e| Error::new(ErrorKind::Io, e))?;
        Ok(value.map(|v| v.value().to_vec()))
    }

    fn next_counter(&self) -> Result<u64> {
        let _guard = self.counter_guard.lock();
        let txn = self.db.begin_write().map_err(|e| Error::new(ErrorKind::Io, e))?;
        let previous = {
            let mut table = txn.open_table(TABLE).map_err(|e| Error::new(ErrorKind::Io, e))?;
            let previous = table
                .get(COUNTER_KEY)
                .map_err(|e| Error::new(ErrorKind::Io, e))?
                .map(|v| u64::from_le_bytes(v.value().try_into().unwrap_or([0; 8])))
                .unwrap_or(0);
            table
                .insert(COUNTER_KEY, (previous + 1).to_le_bytes().as_slice())
                .map_err(|e| Error::new(ErrorKind::Io, e))?;
            previous
        };
        txn.commit().map_err(|e| Error::new(ErrorKind::Io, e))?;
        Ok(previous)
    }
}
