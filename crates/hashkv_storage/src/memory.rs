//! In-memory hash store.

use crate::backend::{HashEntries, HashStore};
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone)]
enum Entry {
    Hash(HashEntries),
    Set(BTreeSet<Vec<u8>>),
}

/// An in-memory hash store.
///
/// This store keeps all structures in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Embedded, non-durable use
///
/// Hash fields keep their insertion order. Keys are kept sorted so prefix
/// scans are range reads.
///
/// # Thread Safety
///
/// This store is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use hashkv_storage::{HashStore, InMemoryStore};
///
/// let store = InMemoryStore::new();
/// store.sadd(b"persons", b"1").unwrap();
/// assert!(store.sismember(b"persons", b"1").unwrap());
/// assert_eq!(store.scard(b"persons").unwrap(), 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<BTreeMap<Vec<u8>, Entry>>,
    closed: AtomicBool,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of keys in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns every key in the store, sorted.
    ///
    /// Useful for testing and debugging.
    #[must_use]
    pub fn keys(&self) -> Vec<Vec<u8>> {
        self.entries.read().keys().cloned().collect()
    }

    /// Removes every key.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Closes the store. Every later operation fails with [`StorageError::Closed`].
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    fn ensure_open(&self) -> StorageResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StorageError::Closed);
        }
        Ok(())
    }
}

impl HashStore for InMemoryStore {
    fn hset_all(&self, key: &[u8], fields: &[(Vec<u8>, Vec<u8>)]) -> StorageResult<()> {
        self.ensure_open()?;
        let mut entries = self.entries.write();
        let entry = entries
            .entry(key.to_vec())
            .or_insert_with(|| Entry::Hash(Vec::new()));

        let Entry::Hash(hash) = entry else {
            return Err(StorageError::wrong_type(key, "hash"));
        };

        for (field, value) in fields {
            match hash.iter_mut().find(|(f, _)| f == field) {
                Some(slot) => slot.1 = value.clone(),
                None => hash.push((field.clone(), value.clone())),
            }
        }
        Ok(())
    }

    fn hget_all(&self, key: &[u8]) -> StorageResult<HashEntries> {
        self.ensure_open()?;
        match self.entries.read().get(key) {
            Some(Entry::Hash(hash)) => Ok(hash.clone()),
            Some(Entry::Set(_)) => Err(StorageError::wrong_type(key, "hash")),
            None => Ok(Vec::new()),
        }
    }

    fn del(&self, key: &[u8]) -> StorageResult<bool> {
        self.ensure_open()?;
        Ok(self.entries.write().remove(key).is_some())
    }

    fn sadd(&self, key: &[u8], member: &[u8]) -> StorageResult<bool> {
        self.ensure_open()?;
        let mut entries = self.entries.write();
        let entry = entries
            .entry(key.to_vec())
            .or_insert_with(|| Entry::Set(BTreeSet::new()));

        match entry {
            Entry::Set(set) => Ok(set.insert(member.to_vec())),
            Entry::Hash(_) => Err(StorageError::wrong_type(key, "set")),
        }
    }

    fn srem(&self, key: &[u8], member: &[u8]) -> StorageResult<bool> {
        self.ensure_open()?;
        let mut entries = self.entries.write();
        let (removed, now_empty) = match entries.get_mut(key) {
            Some(Entry::Set(set)) => (set.remove(member), set.is_empty()),
            Some(Entry::Hash(_)) => return Err(StorageError::wrong_type(key, "set")),
            None => return Ok(false),
        };

        if now_empty {
            entries.remove(key);
        }
        Ok(removed)
    }

    fn smembers(&self, key: &[u8]) -> StorageResult<Vec<Vec<u8>>> {
        self.ensure_open()?;
        match self.entries.read().get(key) {
            Some(Entry::Set(set)) => Ok(set.iter().cloned().collect()),
            Some(Entry::Hash(_)) => Err(StorageError::wrong_type(key, "set")),
            None => Ok(Vec::new()),
        }
    }

    fn sismember(&self, key: &[u8], member: &[u8]) -> StorageResult<bool> {
        self.ensure_open()?;
        match self.entries.read().get(key) {
            Some(Entry::Set(set)) => Ok(set.contains(member)),
            Some(Entry::Hash(_)) => Err(StorageError::wrong_type(key, "set")),
            None => Ok(false),
        }
    }

    fn scard(&self, key: &[u8]) -> StorageResult<u64> {
        self.ensure_open()?;
        match self.entries.read().get(key) {
            Some(Entry::Set(set)) => Ok(set.len() as u64),
            Some(Entry::Hash(_)) => Err(StorageError::wrong_type(key, "set")),
            None => Ok(0),
        }
    }

    fn keys_with_prefix(&self, prefix: &[u8]) -> StorageResult<Vec<Vec<u8>>> {
        self.ensure_open()?;
        let entries = self.entries.read();
        let keys = entries
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect::<Vec<_>>();
        tracing::trace!(
            prefix = %String::from_utf8_lossy(prefix),
            matches = keys.len(),
            "prefix scan"
        );
        Ok(keys)
    }
}
