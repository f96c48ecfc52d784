//! Hash store trait definition.

use crate::error::StorageResult;

/// Field/value pairs of a stored hash.
pub type HashEntries = Vec<(Vec<u8>, Vec<u8>)>;

/// A hash-oriented key-value store.
///
/// Stores are **opaque byte stores** holding two kinds of structure under
/// binary keys: hashes (field → value) and sets (unordered members). They do
/// not interpret paths, keyspaces, or type hints.
///
/// # Invariants
///
/// - `hset_all` merges fields into the hash, replacing existing fields
/// - `hget_all` returns an empty vector for a missing key
/// - Set operations on a key holding a hash (and vice versa) fail with
///   [`crate::StorageError::WrongType`]
/// - Stores must be `Send + Sync`; all methods take `&self`
///
/// # Implementors
///
/// - [`super::InMemoryStore`] - For testing and embedded use
pub trait HashStore: Send + Sync {
    /// Writes the given fields into the hash at `key`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` holds a set.
    fn hset_all(&self, key: &[u8], fields: &[(Vec<u8>, Vec<u8>)]) -> StorageResult<()>;

    /// Reads every field of the hash at `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` holds a set.
    fn hget_all(&self, key: &[u8]) -> StorageResult<HashEntries>;

    /// Deletes whatever structure is stored at `key`.
    ///
    /// Returns `true` if something was removed.
    fn del(&self, key: &[u8]) -> StorageResult<bool>;

    /// Adds `member` to the set at `key`, creating it if needed.
    ///
    /// Returns `true` if the member was not already present.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` holds a hash.
    fn sadd(&self, key: &[u8], member: &[u8]) -> StorageResult<bool>;

    /// Removes `member` from the set at `key`.
    ///
    /// Returns `true` if the member was present. Empty sets are dropped.
    fn srem(&self, key: &[u8], member: &[u8]) -> StorageResult<bool>;

    /// Returns all members of the set at `key`.
    fn smembers(&self, key: &[u8]) -> StorageResult<Vec<Vec<u8>>>;

    /// Returns true if `member` belongs to the set at `key`.
    fn sismember(&self, key: &[u8], member: &[u8]) -> StorageResult<bool>;

    /// Returns the number of members of the set at `key`.
    fn scard(&self, key: &[u8]) -> StorageResult<u64>;

    /// Returns every key starting with `prefix`.
    fn keys_with_prefix(&self, prefix: &[u8]) -> StorageResult<Vec<Vec<u8>>>;
}
