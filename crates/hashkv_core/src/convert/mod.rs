//! Object graph ⇄ flat record conversion.
//!
//! Writing walks an object's descriptor in declaration order and emits one
//! entry per scalar leaf, element and reference pointer. Reading rebuilds the
//! object from those entries, using the `_class` hints to pick subtypes.
//!
//! ## Example
//!
//! ```
//! use hashkv_codec::{Object, ScalarType, Value};
//! use hashkv_core::{EntityDescriptor, MappingConverter, PropertyDescriptor, TypeRegistry};
//! use std::sync::Arc;
//!
//! let registry = TypeRegistry::new();
//! registry
//!     .register(
//!         EntityDescriptor::new("Person")
//!             .keyspace("persons")
//!             .property(PropertyDescriptor::scalar("id", ScalarType::Text).id())
//!             .property(PropertyDescriptor::collection("nicknames", ScalarType::Text)),
//!     )
//!     .unwrap();
//!
//! let converter = MappingConverter::new(Arc::new(registry));
//! let person = Object::new("Person")
//!     .with("id", "1")
//!     .with("nicknames", Value::List(vec!["dragon reborn".into(), "lews therin".into()]));
//!
//! let record = converter.write(&person).unwrap();
//! assert_eq!(record.root_key().as_deref(), Some("persons:1"));
//! assert_eq!(record.get("nicknames.[1]"), Some(&b"lews therin"[..]));
//!
//! let read = converter.read("Person", &record).unwrap();
//! assert_eq!(read, Some(person));
//! ```

mod reader;
mod writer;

use crate::config::ConverterConfig;
use crate::error::CoreResult;
use crate::index::IndexConfiguration;
use crate::metadata::EntityAccessor;
use crate::record::FlatRecord;
use crate::resolver::{NoReferences, ReferenceResolver};
use hashkv_codec::Object;
use std::fmt;
use std::sync::Arc;

/// Converts entities to flat records and back.
///
/// The converter is `Send + Sync`; share it with `Arc`. Its only mutable
/// state is the index registry, which is internally synchronized.
#[derive(Clone)]
pub struct MappingConverter {
    accessor: Arc<dyn EntityAccessor>,
    indexes: Arc<IndexConfiguration>,
    resolver: Arc<dyn ReferenceResolver>,
}

impl MappingConverter {
    /// Creates a converter with an empty index registry and a resolver that
    /// leaves references unset.
    pub fn new(accessor: Arc<dyn EntityAccessor>) -> Self {
        Self {
            accessor,
            indexes: Arc::new(IndexConfiguration::new()),
            resolver: Arc::new(NoReferences),
        }
    }

    /// Creates a converter whose index registry is seeded from `config`.
    pub fn from_config(accessor: Arc<dyn EntityAccessor>, config: &ConverterConfig) -> Self {
        Self::new(accessor).with_index_configuration(Arc::new(config.index_configuration()))
    }

    /// Replaces the index registry.
    #[must_use]
    pub fn with_index_configuration(mut self, indexes: Arc<IndexConfiguration>) -> Self {
        self.indexes = indexes;
        self
    }

    /// Replaces the reference resolver used by [`MappingConverter::read`].
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn ReferenceResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// The metadata accessor.
    pub fn accessor(&self) -> &Arc<dyn EntityAccessor> {
        &self.accessor
    }

    /// The index registry.
    pub fn index_configuration(&self) -> &Arc<IndexConfiguration> {
        &self.indexes
    }

    /// The configured reference resolver.
    pub fn resolver(&self) -> &Arc<dyn ReferenceResolver> {
        &self.resolver
    }

    /// Flattens a root entity.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::UnknownType`] if a runtime type is not
    /// registered, [`crate::CoreError::UnsupportedDescriptor`] if a value
    /// does not match its property's shape, and
    /// [`crate::CoreError::MissingId`] for a reference to an entity without
    /// an id.
    pub fn write(&self, object: &Object) -> CoreResult<FlatRecord> {
        writer::write(self.accessor.as_ref(), &self.indexes, object)
    }

    /// Rebuilds an entity of (a subtype of) `type_name` from a record.
    ///
    /// Returns `None` for an empty record.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::TypeResolution`] for an unknown or
    /// incompatible `_class` hint, [`crate::CoreError::Conversion`] for a
    /// leaf that does not decode, and any error raised by the resolver.
    pub fn read(&self, type_name: &str, record: &FlatRecord) -> CoreResult<Option<Object>> {
        self.read_with(type_name, record, self.resolver.as_ref())
    }

    /// Like [`MappingConverter::read`], resolving references with `resolver`.
    ///
    /// # Errors
    ///
    /// See [`MappingConverter::read`].
    pub fn read_with(
        &self,
        type_name: &str,
        record: &FlatRecord,
        resolver: &dyn ReferenceResolver,
    ) -> CoreResult<Option<Object>> {
        reader::read(self.accessor.as_ref(), resolver, type_name, record)
    }
}

impl fmt::Debug for MappingConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingConverter")
            .field("indexes", &self.indexes)
            .finish_non_exhaustive()
    }
}
