use std::fmt::Display;
use std::path::Path;

use redb::{Database, ReadableTable, TableDefinition};

use crate::error::StoreError;

const TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("kv");

/// Key-value storage for small, volatile records.
///
/// Keys are path-like and namespaced by module: `auth/otp/{account_id}`.
pub trait KVStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Insert or overwrite.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Remove a key. No-op if absent.
    fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Atomically remove `key` if and only if its current value equals
    /// `expected`. Returns whether the key was removed.
    ///
    /// Of several concurrent callers holding the same `expected` value,
    /// at most one observes `true`.
    fn take_if(&self, key: &str, expected: &[u8]) -> Result<bool, StoreError>;
}

/// KVStore backed by redb. redb admits one write transaction at a time,
/// which is what makes [`KVStore::take_if`] atomic.
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let db = Database::create(path).map_err(kv_err)?;

        let txn = db.begin_write().map_err(kv_err)?;
        txn.open_table(TABLE).map_err(kv_err)?;
        txn.commit().map_err(kv_err)?;

        Ok(Self { db })
    }
}

impl KVStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let txn = self.db.begin_read().map_err(kv_err)?;
        let table = txn.open_table(TABLE).map_err(kv_err)?;
        let value = table.get(key).map_err(kv_err)?;
        Ok(value.map(|v| v.value().to_vec()))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let txn = self.db.begin_write().map_err(kv_err)?;
        {
            let mut table = txn.open_table(TABLE).map_err(kv_err)?;
            table.insert(key, value).map_err(kv_err)?;
        }
        txn.commit().map_err(kv_err)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let txn = self.db.begin_write().map_err(kv_err)?;
        {
            let mut table = txn.open_table(TABLE).map_err(kv_err)?;
            table.remove(key).map_err(kv_err)?;
        }
        txn.commit().map_err(kv_err)
    }

    fn take_if(&self, key: &str, expected: &[u8]) -> Result<bool, StoreError> {
        let txn = self.db.begin_write().map_err(kv_err)?;
        let taken = {
            let mut table = txn.open_table(TABLE).map_err(kv_err)?;
            let matches = match table.get(key).map_err(kv_err)? {
                Some(current) => current.value() == expected,
                None => false,
            };
            if matches {
                table.remove(key).map_err(kv_err)?;
            }
            matches
        };
        if taken {
            txn.commit().map_err(kv_err)?;
        } else {
            txn.abort().map_err(kv_err)?;
        }
        Ok(taken)
    }
}

fn kv_err(e: impl Display) -> StoreError {
    StoreError::Kv(e.to_string())
}
