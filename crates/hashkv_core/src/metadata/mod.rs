//! Entity metadata.
//!
//! The converter never inspects objects directly. It asks an
//! [`EntityAccessor`] for descriptors and for property values, so any object
//! model that can describe itself this way can be flattened.
//! [`TypeRegistry`] is the accessor for the dynamic [`Object`] model.

mod descriptor;
mod registry;
mod schema;

pub use descriptor::{EntityDescriptor, PropertyDescriptor, PropertyShape, TypeRef};
pub use registry::TypeRegistry;
pub use schema::{builtin_scalar, EntitySchema, PropertySchema, Schema, ShapeSchema};

use crate::error::CoreResult;
use hashkv_codec::{Object, Value};
use std::sync::Arc;

/// Access to entity metadata and property values.
///
/// # Invariants
///
/// - `descriptor` returns properties in declaration order, parent first
/// - `is_assignable(t, t)` is true for every registered `t`
/// - Implementations must be `Send + Sync`; converters share them across threads
pub trait EntityAccessor: Send + Sync {
    /// Returns the descriptor of a registered type.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::UnknownType`] if the type is not registered.
    fn descriptor(&self, type_name: &str) -> CoreResult<Arc<EntityDescriptor>>;

    /// Returns true if `sub` is `sup` or one of its subtypes.
    fn is_assignable(&self, sub: &str, sup: &str) -> bool;

    /// Creates an instance, supplying the constructor-bound properties.
    ///
    /// # Errors
    ///
    /// Returns an error if the instance cannot be created from the arguments.
    fn instantiate(
        &self,
        descriptor: &EntityDescriptor,
        args: Vec<(String, Value)>,
    ) -> CoreResult<Object>;

    /// Reads a property value. Missing and null values are `None`.
    fn get_property<'a>(
        &self,
        instance: &'a Object,
        property: &PropertyDescriptor,
    ) -> Option<&'a Value>;

    /// Writes a property value.
    fn set_property(&self, instance: &mut Object, property: &PropertyDescriptor, value: Value);
}
