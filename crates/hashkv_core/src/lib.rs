//! # hashkv Core
//!
//! Object-graph to flat-hash mapping for hashkv.
//!
//! This crate provides:
//! - Entity metadata ([`EntityDescriptor`], [`TypeRegistry`]) behind the
//!   [`EntityAccessor`] trait
//! - [`FlatRecord`], the path-keyed hash form of one root entity
//! - [`MappingConverter`], which flattens objects into records and rebuilds
//!   them, including polymorphic subtypes and references
//! - Secondary index definitions ([`IndexConfiguration`]) and equality
//!   queries ([`IndexQuery`])
//! - [`KeyValueAdapter`], which stores records in any [`hashkv_storage::HashStore`]
//!
//! ## Wire Format
//!
//! ```text
//! _class                          = Person
//! id                              = 1
//! firstname                       = rand
//! nicknames.[0]                   = dragon reborn
//! physicalAttributes.[hair-color] = red
//! address._class                  = AddressWithPostcode
//! address.postcode                = 1234
//! location                        = locations:1
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod adapter;
mod config;
mod convert;
mod error;
mod index;
mod metadata;
pub mod path;
mod query;
mod record;
mod resolver;

pub use adapter::{KeyValueAdapter, StoreResolver};
pub use config::ConverterConfig;
pub use convert::MappingConverter;
pub use error::{CoreError, CoreResult};
pub use index::{IndexConfiguration, IndexDefinition, IndexType};
pub use metadata::{
    builtin_scalar, EntityAccessor, EntityDescriptor, EntitySchema, PropertyDescriptor,
    PropertySchema, PropertyShape, Schema, ShapeSchema, TypeRef, TypeRegistry,
};
pub use path::{entity_key, index_key};
pub use query::IndexQuery;
pub use record::FlatRecord;
pub use resolver::{NoReferences, ReferenceResolver};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
