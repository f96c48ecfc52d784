//! Key-value adapter: stores flat records in a [`HashStore`].
//!
//! Layout per keyspace `ks`:
//!
//! | key | structure | content |
//! |---|---|---|
//! | `ks:<id>` | hash | the flat record of one entity |
//! | `ks` | set | ids of all stored entities |
//! | `ks.<property>:<value>` | set | ids of entities with that indexed value |

use crate::config::ConverterConfig;
use crate::convert::MappingConverter;
use crate::error::{CoreError, CoreResult};
use crate::metadata::TypeRef;
use crate::path;
use crate::query::IndexQuery;
use crate::record::FlatRecord;
use crate::resolver::{NoReferences, ReferenceResolver};
use hashkv_codec::{Object, ScalarType, Value};
use hashkv_storage::HashStore;
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

/// Stores and loads entities through a [`MappingConverter`].
///
/// References are resolved against the same store, one level deep: a
/// loaded referent has its own references left unset.
///
/// # Example
///
/// ```
/// use hashkv_codec::{Object, ScalarType};
/// use hashkv_core::{EntityDescriptor, KeyValueAdapter, MappingConverter, PropertyDescriptor, TypeRegistry};
/// use hashkv_storage::InMemoryStore;
/// use std::sync::Arc;
///
/// let registry = TypeRegistry::new();
/// registry
///     .register(
///         EntityDescriptor::new("Person")
///             .keyspace("persons")
///             .property(PropertyDescriptor::scalar("id", ScalarType::Text).id())
///             .property(PropertyDescriptor::scalar("firstname", ScalarType::Text)),
///     )
///     .unwrap();
///
/// let adapter = KeyValueAdapter::new(
///     Arc::new(InMemoryStore::new()),
///     MappingConverter::new(Arc::new(registry)),
/// );
///
/// let mut rand = Object::new("Person").with("id", "1").with("firstname", "rand");
/// adapter.put(&mut rand).unwrap();
///
/// assert!(adapter.contains("1", "persons").unwrap());
/// assert_eq!(adapter.get("1", "persons", "Person").unwrap(), Some(rand));
/// ```
#[derive(Debug)]
pub struct KeyValueAdapter<S: HashStore> {
    store: Arc<S>,
    converter: MappingConverter,
    generate_ids: bool,
}

impl<S: HashStore> KeyValueAdapter<S> {
    /// Creates an adapter that generates missing ids.
    pub fn new(store: Arc<S>, converter: MappingConverter) -> Self {
        Self {
            store,
            converter,
            generate_ids: true,
        }
    }

    /// Creates an adapter following `config`.
    pub fn with_config(store: Arc<S>, converter: MappingConverter, config: &ConverterConfig) -> Self {
        Self::new(store, converter).generate_ids(config.generate_ids)
    }

    /// Sets whether entities stored without an id get a random one.
    #[must_use]
    pub fn generate_ids(mut self, value: bool) -> Self {
        self.generate_ids = value;
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// The converter.
    pub fn converter(&self) -> &MappingConverter {
        &self.converter
    }

    /// Stores an entity, replacing any previous version with the same id.
    ///
    /// An entity without an id gets a random UUID, which is also set on
    /// `object`. Returns the id.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingId`] if the entity has no id and none can
    /// be generated, plus any conversion or storage error.
    pub fn put(&self, object: &mut Object) -> CoreResult<String> {
        let mut record = self.converter.write(object)?;
        if record.id().is_none() {
            self.assign_id(object)?;
            record = self.converter.write(object)?;
        }

        let (Some(keyspace), Some(id), Some(key)) = (record.keyspace(), record.id(), record.root_key())
        else {
            return Err(CoreError::missing_id(object.type_name()));
        };

        if self.store.sismember(keyspace.as_bytes(), id.as_bytes())? {
            self.remove_from_indexes(keyspace, id)?;
            self.store.del(key.as_bytes())?;
        }

        self.store.hset_all(key.as_bytes(), &record.to_raw())?;
        self.store.sadd(keyspace.as_bytes(), id.as_bytes())?;
        let index_keys = record.index_keys();
        for index_key in &index_keys {
            self.store.sadd(index_key.as_bytes(), id.as_bytes())?;
        }

        tracing::debug!(key = %key, entries = record.len(), indexes = index_keys.len(), "stored entity");
        Ok(id.to_string())
    }

    /// Loads an entity, resolving its references from the store.
    ///
    /// # Errors
    ///
    /// Returns any storage or conversion error.
    pub fn get(&self, id: &str, keyspace: &str, type_name: &str) -> CoreResult<Option<Object>> {
        let Some(record) = self.load_record(id, keyspace)? else {
            return Ok(None);
        };
        self.converter
            .read_with(type_name, &record, &StoreResolver::new(self))
    }

    /// Returns true if an entity with `id` is stored in `keyspace`.
    ///
    /// # Errors
    ///
    /// Returns any storage error.
    pub fn contains(&self, id: &str, keyspace: &str) -> CoreResult<bool> {
        Ok(self.store.sismember(keyspace.as_bytes(), id.as_bytes())?)
    }

    /// Deletes an entity and its index memberships. Returns the deleted entity.
    ///
    /// Removal works on keys alone. The stored record is decoded afterwards
    /// for the return value; a record that no longer decodes is still
    /// deleted and yields `None` with a warning.
    ///
    /// # Errors
    ///
    /// Returns any storage error.
    pub fn delete(&self, id: &str, keyspace: &str, type_name: &str) -> CoreResult<Option<Object>> {
        let record = self.load_record(id, keyspace)?;
        if record.is_none() && !self.contains(id, keyspace)? {
            return Ok(None);
        }

        self.remove_from_indexes(keyspace, id)?;
        self.store.del(path::entity_key(keyspace, id).as_bytes())?;
        self.store.srem(keyspace.as_bytes(), id.as_bytes())?;
        tracing::debug!(keyspace, id, "deleted entity");

        let Some(record) = record else {
            return Ok(None);
        };
        match self
            .converter
            .read_with(type_name, &record, &StoreResolver::new(self))
        {
            Ok(object) => Ok(object),
            Err(err) => {
                tracing::warn!(keyspace, id, error = %err, "deleted entity could not be decoded");
                Ok(None)
            }
        }
    }

    /// Loads every entity of a keyspace.
    ///
    /// # Errors
    ///
    /// Returns any storage or conversion error.
    pub fn get_all_of(&self, keyspace: &str, type_name: &str) -> CoreResult<Vec<Object>> {
        let ids = self.store.smembers(keyspace.as_bytes())?;
        self.load_all(keyspace, type_name, ids)
    }

    /// Deletes every entity of a keyspace, its membership set and its index sets.
    ///
    /// # Errors
    ///
    /// Returns any storage error.
    pub fn delete_all_of(&self, keyspace: &str) -> CoreResult<()> {
        let ids = self.store.smembers(keyspace.as_bytes())?;
        for id in &ids {
            let id = String::from_utf8_lossy(id);
            self.store.del(path::entity_key(keyspace, &id).as_bytes())?;
        }
        self.store.del(keyspace.as_bytes())?;
        for index_key in self.store.keys_with_prefix(path::index_prefix(keyspace).as_bytes())? {
            self.store.del(&index_key)?;
        }
        tracing::debug!(keyspace, entities = ids.len(), "deleted keyspace");
        Ok(())
    }

    /// Number of entities stored in a keyspace.
    ///
    /// # Errors
    ///
    /// Returns any storage error.
    pub fn count(&self, keyspace: &str) -> CoreResult<u64> {
        Ok(self.store.scard(keyspace.as_bytes())?)
    }

    /// Loads the entities matching an index query.
    ///
    /// An empty query matches every entity of the keyspace.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-scalar criterion, plus any storage or
    /// conversion error.
    pub fn find(&self, keyspace: &str, type_name: &str, query: &IndexQuery) -> CoreResult<Vec<Object>> {
        if query.is_empty() {
            return self.get_all_of(keyspace, type_name);
        }
        let (all_of, any_of) = query.fragments()?;

        let mut matched: Option<BTreeSet<Vec<u8>>> = None;
        for fragment in &all_of {
            let members = self.index_members(keyspace, fragment)?;
            matched = Some(match matched {
                None => members,
                Some(acc) => acc.intersection(&members).cloned().collect(),
            });
        }
        let mut ids = matched.unwrap_or_default();
        for fragment in &any_of {
            ids.extend(self.index_members(keyspace, fragment)?);
        }

        tracing::debug!(keyspace, matches = ids.len(), "index query");
        self.load_all(keyspace, type_name, ids)
    }

    fn assign_id(&self, object: &mut Object) -> CoreResult<()> {
        let descriptor = self.converter.accessor().descriptor(object.type_name())?;
        let id_property = descriptor
            .id_property()
            .filter(|p| p.declared_type() == &TypeRef::Scalar(ScalarType::Text));

        match id_property {
            Some(property) if self.generate_ids => {
                let id = Uuid::new_v4().to_string();
                tracing::debug!(type_name = object.type_name(), id = %id, "generated id");
                self.converter
                    .accessor()
                    .set_property(object, property, Value::Text(id));
                Ok(())
            }
            _ => Err(CoreError::missing_id(object.type_name())),
        }
    }

    fn load_record(&self, id: &str, keyspace: &str) -> CoreResult<Option<FlatRecord>> {
        let raw = self.store.hget_all(path::entity_key(keyspace, id).as_bytes())?;
        if raw.is_empty() {
            return Ok(None);
        }
        let mut record = FlatRecord::from_raw(raw)?;
        record.set_keyspace(keyspace);
        record.set_id(id);
        Ok(Some(record))
    }

    fn load_all<I>(&self, keyspace: &str, type_name: &str, ids: I) -> CoreResult<Vec<Object>>
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        let mut objects = Vec::new();
        for id in ids {
            let id = String::from_utf8_lossy(&id);
            match self.get(&id, keyspace, type_name)? {
                Some(object) => objects.push(object),
                None => tracing::warn!(keyspace, id = %id, "indexed entity is missing"),
            }
        }
        Ok(objects)
    }

    fn index_members(&self, keyspace: &str, fragment: &str) -> CoreResult<BTreeSet<Vec<u8>>> {
        let key = path::index_key(keyspace, fragment);
        Ok(self.store.smembers(key.as_bytes())?.into_iter().collect())
    }

    fn remove_from_indexes(&self, keyspace: &str, id: &str) -> CoreResult<()> {
        for index_key in self.store.keys_with_prefix(path::index_prefix(keyspace).as_bytes())? {
            self.store.srem(&index_key, id.as_bytes())?;
        }
        Ok(())
    }
}

/// Resolves references from the adapter's store.
///
/// Referents are read with their own references left unset, which keeps
/// reference cycles finite.
#[derive(Debug)]
pub struct StoreResolver<'a, S: HashStore> {
    adapter: &'a KeyValueAdapter<S>,
}

impl<'a, S: HashStore> StoreResolver<'a, S> {
    /// Creates a resolver over the adapter's store.
    pub fn new(adapter: &'a KeyValueAdapter<S>) -> Self {
        Self { adapter }
    }
}

impl<S: HashStore> ReferenceResolver for StoreResolver<'_, S> {
    fn resolve(&self, id: &str, keyspace: &str, type_name: &str) -> CoreResult<Option<Object>> {
        let Some(record) = self.adapter.load_record(id, keyspace)? else {
            return Ok(None);
        };
        self.adapter
            .converter
            .read_with(type_name, &record, &NoReferences)
    }
}
