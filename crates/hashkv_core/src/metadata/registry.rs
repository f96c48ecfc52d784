//! Type registry for the dynamic object model.

use super::descriptor::{EntityDescriptor, PropertyDescriptor, PropertyShape, TypeRef};
use super::schema::{self, EntitySchema, PropertySchema, Schema, ShapeSchema};
use super::EntityAccessor;
use crate::error::{CoreError, CoreResult};
use hashkv_codec::{Object, Value};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of entity descriptors keyed by canonical type name.
///
/// Registration resolves inheritance: a subtype receives its parent's
/// keyspace (unless it declares its own) and its parent's properties ahead
/// of its own. Parents must be registered before their subtypes;
/// [`TypeRegistry::from_schema`] orders a schema accordingly.
///
/// # Thread Safety
///
/// The registry is internally synchronized and may be shared via `Arc`.
///
/// # Example
///
/// ```
/// use hashkv_codec::ScalarType;
/// use hashkv_core::{EntityAccessor, EntityDescriptor, PropertyDescriptor, TypeRegistry};
///
/// let registry = TypeRegistry::new();
/// registry
///     .register(
///         EntityDescriptor::new("Person")
///             .keyspace("persons")
///             .property(PropertyDescriptor::scalar("id", ScalarType::Text).id()),
///     )
///     .unwrap();
/// registry.register(EntityDescriptor::new("TaVeren").extends("Person")).unwrap();
///
/// let taveren = registry.descriptor("TaVeren").unwrap();
/// assert_eq!(taveren.keyspace_name(), "persons");
/// assert!(registry.is_assignable("TaVeren", "Person"));
/// ```
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: RwLock<HashMap<String, Arc<EntityDescriptor>>>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from a schema.
    ///
    /// # Errors
    ///
    /// Returns an error if a property names an unknown type, a parent is
    /// missing, or a descriptor fails validation.
    pub fn from_schema(schema: &Schema) -> CoreResult<Self> {
        let registry = Self::new();
        let entity_names: Vec<&str> = schema.entities.iter().map(|e| e.name.as_str()).collect();

        let mut pending = schema
            .entities
            .iter()
            .map(|entity| descriptor_from_schema(schema, &entity_names, entity))
            .collect::<CoreResult<Vec<_>>>()?;

        while !pending.is_empty() {
            let before = pending.len();
            let mut deferred = Vec::new();
            for descriptor in pending {
                let ready = descriptor.parent().map_or(true, |p| registry.contains(p));
                if ready {
                    registry.register(descriptor)?;
                } else {
                    deferred.push(descriptor);
                }
            }
            if deferred.len() == before {
                // No progress: the first remaining parent is missing or cyclic.
                return match deferred.into_iter().next() {
                    Some(descriptor) => registry.register(descriptor).map(|_| registry),
                    None => Ok(registry),
                };
            }
            pending = deferred;
        }

        Ok(registry)
    }

    /// Registers a type, resolving inheritance and validating its properties.
    ///
    /// Registering a name again replaces the previous descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnsupportedDescriptor`] for an unknown parent,
    /// a keyspace containing `.` or `:`, more than one id, a non-scalar id, a constructor-bound non-scalar, or
    /// a reference whose declared type is not an entity.
    pub fn register(&self, mut descriptor: EntityDescriptor) -> CoreResult<Arc<EntityDescriptor>> {
        if let Some(parent_name) = descriptor.parent() {
            let parent = self.get(parent_name).ok_or_else(|| {
                CoreError::unsupported(
                    descriptor.name(),
                    format!("unknown parent type {parent_name}"),
                )
            })?;
            if !descriptor.has_explicit_keyspace() {
                descriptor.set_keyspace(parent.keyspace_name().to_string());
            }
            descriptor.inherit_properties(parent.properties());
        }

        validate(&descriptor)?;

        tracing::debug!(
            type_name = descriptor.name(),
            keyspace = descriptor.keyspace_name(),
            properties = descriptor.properties().len(),
            "registered entity type"
        );

        let descriptor = Arc::new(descriptor);
        self.types
            .write()
            .insert(descriptor.name().to_string(), Arc::clone(&descriptor));
        Ok(descriptor)
    }

    /// Looks up a registered descriptor.
    pub fn get(&self, type_name: &str) -> Option<Arc<EntityDescriptor>> {
        self.types.read().get(type_name).cloned()
    }

    /// Returns true if the type is registered.
    pub fn contains(&self, type_name: &str) -> bool {
        self.types.read().contains_key(type_name)
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    /// Returns true if no types are registered.
    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }
}

impl EntityAccessor for TypeRegistry {
    fn descriptor(&self, type_name: &str) -> CoreResult<Arc<EntityDescriptor>> {
        self.get(type_name)
            .ok_or_else(|| CoreError::unknown_type(type_name))
    }

    fn is_assignable(&self, sub: &str, sup: &str) -> bool {
        let types = self.types.read();
        let mut current = types.get(sub);
        // Parents are registered first, so a chain is at most `len` long.
        for _ in 0..=types.len() {
            let Some(descriptor) = current else {
                return false;
            };
            if descriptor.name() == sup {
                return true;
            }
            current = descriptor.parent().and_then(|p| types.get(p));
        }
        false
    }

    fn instantiate(
        &self,
        descriptor: &EntityDescriptor,
        args: Vec<(String, Value)>,
    ) -> CoreResult<Object> {
        let mut object = Object::new(descriptor.name());
        for (name, value) in args {
            if descriptor.find_property(&name).is_none() {
                return Err(CoreError::unsupported(
                    format!("{}.{name}", descriptor.name()),
                    "constructor argument names no property",
                ));
            }
            object.set(name, value);
        }
        Ok(object)
    }

    fn get_property<'a>(
        &self,
        instance: &'a Object,
        property: &PropertyDescriptor,
    ) -> Option<&'a Value> {
        instance.get(property.name())
    }

    fn set_property(&self, instance: &mut Object, property: &PropertyDescriptor, value: Value) {
        instance.set(property.name(), value);
    }
}

fn validate(descriptor: &EntityDescriptor) -> CoreResult<()> {
    let owner = descriptor.name();
    let keyspace = descriptor.keyspace_name();
    // Index keys are `keyspace.fragment` and entity keys `keyspace:id`.
    if keyspace.is_empty() || keyspace.contains(['.', ':']) {
        return Err(CoreError::unsupported(
            owner,
            format!("keyspace {keyspace:?} must be non-empty and free of '.' and ':'"),
        ));
    }

    let mut ids = descriptor.properties().iter().filter(|p| p.is_id());
    if let (Some(_), Some(second)) = (ids.next(), ids.next()) {
        return Err(CoreError::unsupported(
            format!("{owner}.{}", second.name()),
            "more than one id property",
        ));
    }

    for property in descriptor.properties() {
        let path = format!("{owner}.{}", property.name());
        let single_scalar = matches!(property.shape(), PropertyShape::Single(TypeRef::Scalar(_)));

        if property.is_id() && (!single_scalar || property.is_reference()) {
            return Err(CoreError::unsupported(path, "id property must be a single scalar"));
        }
        if property.is_constructor_bound() && !single_scalar {
            return Err(CoreError::unsupported(
                path,
                "constructor-bound property must be a single scalar",
            ));
        }
        if property.is_reference() && property.declared_type().as_entity().is_none() {
            return Err(CoreError::unsupported(path, "reference must point to an entity type"));
        }
        if property.is_indexed() && !single_scalar {
            return Err(CoreError::unsupported(path, "only single scalars can be indexed"));
        }
    }
    Ok(())
}

fn descriptor_from_schema(
    schema: &Schema,
    entity_names: &[&str],
    entity: &EntitySchema,
) -> CoreResult<EntityDescriptor> {
    let mut descriptor = EntityDescriptor::new(&entity.name);
    if let Some(keyspace) = &entity.keyspace {
        descriptor = descriptor.keyspace(keyspace);
    }
    if let Some(parent) = &entity.parent {
        descriptor = descriptor.extends(parent);
    }
    for property in &entity.properties {
        descriptor = descriptor.property(property_from_schema(schema, entity_names, &entity.name, property)?);
    }
    Ok(descriptor)
}

fn property_from_schema(
    schema: &Schema,
    entity_names: &[&str],
    owner: &str,
    property: &PropertySchema,
) -> CoreResult<PropertyDescriptor> {
    let declared = match schema::resolve_scalar(schema, &property.type_name) {
        Some(ty) => TypeRef::Scalar(ty),
        None if entity_names.contains(&property.type_name.as_str()) => {
            TypeRef::entity(&property.type_name)
        }
        None => return Err(CoreError::unknown_type(&property.type_name)),
    };

    let shape = match property.shape {
        ShapeSchema::Single => PropertyShape::Single(declared),
        ShapeSchema::List => PropertyShape::Collection(declared),
        ShapeSchema::Map => PropertyShape::Map {
            key: schema::resolve_key(schema, owner, property)?,
            value: declared,
        },
    };

    let mut descriptor = PropertyDescriptor::new(&property.name, shape);
    if property.id {
        descriptor = descriptor.id();
    }
    if property.reference {
        descriptor = descriptor.as_reference();
    }
    if property.indexed {
        descriptor = descriptor.indexed();
    }
    if property.constructor {
        descriptor = descriptor.constructor_bound();
    }
    Ok(descriptor)
}
