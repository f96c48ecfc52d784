//! Flat records: the hash form of one root entity.

use crate::error::{CoreError, CoreResult};
use crate::path;
use hashkv_codec::CodecError;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

/// The flattened form of one root entity.
///
/// A flat record is an insertion-ordered map of path keys to byte values,
/// plus the keyspace and id of the root entity and the index fragments
/// derived while writing it.
///
/// # Invariants
///
/// - Keys are unique; a repeated `put` replaces the value but keeps the
///   position of the first insertion
/// - `put` with an empty key or an empty value is a no-op
/// - Entries whose key starts with `P.` form the subtree at `P`
#[derive(Debug, Clone, Default)]
pub struct FlatRecord {
    keyspace: Option<String>,
    id: Option<String>,
    data: Vec<(String, Vec<u8>)>,
    positions: HashMap<String, usize>,
    index_fragments: BTreeSet<String>,
}

impl FlatRecord {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from raw hash entries, as returned by a store.
    ///
    /// # Errors
    ///
    /// Returns a conversion error if a key is not valid UTF-8.
    pub fn from_raw<I>(entries: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = (Vec<u8>, Vec<u8>)>,
    {
        let mut record = Self::new();
        for (key, value) in entries {
            let key = String::from_utf8(key).map_err(|e| {
                let raw = e.into_bytes();
                let source = CodecError::conversion("text", &raw, "key is not valid UTF-8");
                CoreError::conversion(String::from_utf8_lossy(&raw), &raw, source)
            })?;
            record.put(key, value);
        }
        Ok(record)
    }

    /// Builds a record from text keys and values.
    pub fn from_string_map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut record = Self::new();
        for (key, value) in entries {
            record.put(key, value.into().into_bytes());
        }
        record
    }

    /// Returns the keyspace of the root entity, if set.
    pub fn keyspace(&self) -> Option<&str> {
        self.keyspace.as_deref()
    }

    /// Sets the keyspace of the root entity.
    pub fn set_keyspace(&mut self, keyspace: impl Into<String>) {
        self.keyspace = Some(keyspace.into());
    }

    /// Returns the id of the root entity, if set.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Sets the id of the root entity.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Stores `value` at `key`. Empty keys and empty values are ignored.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        let key = key.into();
        let value = value.into();
        if key.is_empty() || value.is_empty() {
            return;
        }
        match self.positions.get(&key) {
            Some(&pos) => self.data[pos].1 = value,
            None => {
                self.positions.insert(key.clone(), self.data.len());
                self.data.push((key, value));
            }
        }
    }

    /// Returns the value stored at `key`.
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.positions.get(key).map(|&pos| self.data[pos].1.as_slice())
    }

    /// Returns true if an entry exists at `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the record has no entries.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterates over entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.data.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Iterates over entries whose key starts with `prefix`, in insertion order.
    pub fn entries_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a [u8])> + 'a {
        self.entries().filter(move |(k, _)| k.starts_with(prefix))
    }

    /// Returns true if any entry lies in the subtree rooted at `path`.
    pub fn has_subtree(&self, path: &str) -> bool {
        let prefix = path::subtree_prefix(path);
        self.data.iter().any(|(k, _)| k.starts_with(&prefix))
    }

    /// Distinct element paths below `element_prefix`, in order of first
    /// appearance. Each path runs up to the first `]` after the prefix.
    pub fn element_paths(&self, element_prefix: &str) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut paths = Vec::new();
        for (key, _) in &self.data {
            if let Some(element) = path::element_path(key, element_prefix) {
                if seen.insert(element) {
                    paths.push(element.to_string());
                }
            }
        }
        paths
    }

    /// Extracts the sub-record rooted at `path`.
    ///
    /// Keys keep their full path. The type hint at `path._class` is also
    /// copied to the local `_class` key.
    pub fn extract(&self, path: &str) -> FlatRecord {
        let prefix = path::subtree_prefix(path);
        let mut sub = FlatRecord::new();
        for (key, value) in self.entries_with_prefix(&prefix) {
            sub.put(key, value);
        }
        if let Some(hint) = self.get(&path::type_hint(path)) {
            sub.put(path::TYPE_HINT_KEY, hint);
        }
        sub
    }

    /// Adds an index fragment (`property:value`).
    pub fn add_index_fragment(&mut self, fragment: impl Into<String>) {
        self.index_fragments.insert(fragment.into());
    }

    /// Returns the index fragments, sorted.
    pub fn index_fragments(&self) -> impl Iterator<Item = &str> {
        self.index_fragments.iter().map(String::as_str)
    }

    /// Storage key of the root entity (`keyspace:id`), if both are known.
    pub fn root_key(&self) -> Option<String> {
        Some(path::entity_key(self.keyspace()?, self.id()?))
    }

    /// Storage keys of the index sets this record belongs to.
    ///
    /// Empty when no keyspace is set.
    pub fn index_keys(&self) -> Vec<String> {
        match self.keyspace() {
            Some(keyspace) => self
                .index_fragments
                .iter()
                .map(|fragment| path::index_key(keyspace, fragment))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Raw hash entries, in insertion order.
    pub fn to_raw(&self) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.data
            .iter()
            .map(|(k, v)| (k.as_bytes().to_vec(), v.clone()))
            .collect()
    }

    /// Text view of the data, sorted by key. Values are decoded lossily.
    pub fn to_string_map(&self) -> BTreeMap<String, String> {
        self.data
            .iter()
            .map(|(k, v)| (k.clone(), String::from_utf8_lossy(v).into_owned()))
            .collect()
    }
}

impl PartialEq for FlatRecord {
    /// Records are equal when they hold the same entries, in any order.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .data
                .iter()
                .all(|(k, v)| other.get(k) == Some(v.as_slice()))
    }
}

impl fmt::Display for FlatRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.data {
            writeln!(f, "{key} = {}", String::from_utf8_lossy(value))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_ignores_empty_key_and_value() {
        let mut record = FlatRecord::new();
        record.put("", "x");
        record.put("firstname", "");
        assert!(record.is_empty());
    }

    #[test]
    fn put_replaces_but_keeps_position() {
        let mut record = FlatRecord::new();
        record.put("a", "1");
        record.put("b", "2");
        record.put("a", "3");

        let keys: Vec<&str> = record.entries().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(record.get("a"), Some(&b"3"[..]));
    }

    #[test]
    fn root_key_needs_keyspace_and_id() {
        let mut record = FlatRecord::new();
        assert_eq!(record.root_key(), None);
        record.set_keyspace("persons");
        assert_eq!(record.root_key(), None);
        record.set_id("1");
        assert_eq!(record.root_key().as_deref(), Some("persons:1"));
    }

    #[test]
    fn index_keys_prefix_keyspace() {
        let mut record = FlatRecord::new();
        record.add_index_fragment("firstname:rand");
        assert!(record.index_keys().is_empty());

        record.set_keyspace("persons");
        record.add_index_fragment("firstname:rand");
        assert_eq!(record.index_keys(), vec!["persons.firstname:rand"]);
    }

    #[test]
    fn element_paths_in_stored_order() {
        let record = FlatRecord::from_string_map([
            ("coworkers.[1].firstname", "mat"),
            ("coworkers.[0].firstname", "perrin"),
            ("coworkers.[1].age", "20"),
            ("coworkersx.[5].firstname", "nope"),
        ]);

        assert_eq!(
            record.element_paths("coworkers.["),
            vec!["coworkers.[1]", "coworkers.[0]"]
        );
    }

    #[test]
    fn extract_copies_local_type_hint() {
        let record = FlatRecord::from_string_map([
            ("_class", "Person"),
            ("address._class", "AddressWithPostcode"),
            ("address.postcode", "1234"),
            ("addressbook.name", "x"),
        ]);

        let sub = record.extract("address");
        assert_eq!(sub.len(), 3);
        assert_eq!(sub.get("_class"), Some(&b"AddressWithPostcode"[..]));
        assert_eq!(sub.get("address.postcode"), Some(&b"1234"[..]));
        assert!(!sub.contains_key("addressbook.name"));
    }

    #[test]
    fn extract_of_missing_subtree_is_empty() {
        let record = FlatRecord::from_string_map([("firstname", "rand")]);
        assert!(record.extract("address").is_empty());
        assert!(!record.has_subtree("address"));
    }

    #[test]
    fn from_raw_rejects_invalid_utf8_keys() {
        let result = FlatRecord::from_raw(vec![(vec![0xff, 0xfe], b"x".to_vec())]);
        assert!(matches!(result, Err(CoreError::Conversion { .. })));
    }

    #[test]
    fn raw_round_trip_keeps_order() {
        let record = FlatRecord::from_string_map([("b", "2"), ("a", "1")]);
        let copy = FlatRecord::from_raw(record.to_raw()).unwrap();
        let keys: Vec<&str> = copy.entries().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn equality_ignores_order() {
        let a = FlatRecord::from_string_map([("a", "1"), ("b", "2")]);
        let b = FlatRecord::from_string_map([("b", "2"), ("a", "1")]);
        let c = FlatRecord::from_string_map([("a", "1")]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn display_lists_entries() {
        let record = FlatRecord::from_string_map([("_class", "Person"), ("firstname", "rand")]);
        assert_eq!(record.to_string(), "_class = Person\nfirstname = rand\n");
    }
}
