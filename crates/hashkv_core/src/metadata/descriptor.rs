//! Entity and property descriptors.

use hashkv_codec::ScalarType;

/// The declared type of a property value or element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// A scalar handled by the scalar codec.
    Scalar(ScalarType),
    /// An entity type, by registered name.
    Entity(String),
}

impl TypeRef {
    /// Shorthand for an entity type reference.
    pub fn entity(name: impl Into<String>) -> Self {
        TypeRef::Entity(name.into())
    }

    /// Returns the scalar type, if this is a scalar.
    pub fn as_scalar(&self) -> Option<&ScalarType> {
        match self {
            TypeRef::Scalar(ty) => Some(ty),
            TypeRef::Entity(_) => None,
        }
    }

    /// Returns the entity type name, if this is an entity.
    pub fn as_entity(&self) -> Option<&str> {
        match self {
            TypeRef::Entity(name) => Some(name),
            TypeRef::Scalar(_) => None,
        }
    }

    /// Display name of the declared type.
    pub fn name(&self) -> &str {
        match self {
            TypeRef::Scalar(ty) => ty.name(),
            TypeRef::Entity(name) => name,
        }
    }
}

impl From<ScalarType> for TypeRef {
    fn from(ty: ScalarType) -> Self {
        TypeRef::Scalar(ty)
    }
}

/// How a property holds its value(s).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyShape {
    /// A single value.
    Single(TypeRef),
    /// An ordered collection of elements.
    Collection(TypeRef),
    /// A map from scalar keys to values.
    Map {
        /// Declared key type.
        key: ScalarType,
        /// Declared value type.
        value: TypeRef,
    },
}

/// Metadata of one entity property.
///
/// Built with the shape constructors and refined with the flag setters:
///
/// ```
/// use hashkv_codec::ScalarType;
/// use hashkv_core::PropertyDescriptor;
///
/// let id = PropertyDescriptor::scalar("id", ScalarType::Text).id();
/// let name = PropertyDescriptor::scalar("firstname", ScalarType::Text).indexed();
/// assert!(id.is_id());
/// assert!(name.is_indexed());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptor {
    name: String,
    shape: PropertyShape,
    id: bool,
    reference: bool,
    indexed: bool,
    constructor_bound: bool,
}

impl PropertyDescriptor {
    /// Creates a descriptor with the given shape and no flags.
    pub fn new(name: impl Into<String>, shape: PropertyShape) -> Self {
        Self {
            name: name.into(),
            shape,
            id: false,
            reference: false,
            indexed: false,
            constructor_bound: false,
        }
    }

    /// A single scalar property.
    pub fn scalar(name: impl Into<String>, ty: ScalarType) -> Self {
        Self::new(name, PropertyShape::Single(TypeRef::Scalar(ty)))
    }

    /// A single nested entity property.
    pub fn entity(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, PropertyShape::Single(TypeRef::entity(type_name)))
    }

    /// A pointer to another root entity.
    pub fn reference(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::entity(name, type_name).as_reference()
    }

    /// A collection property.
    pub fn collection(name: impl Into<String>, element: impl Into<TypeRef>) -> Self {
        Self::new(name, PropertyShape::Collection(element.into()))
    }

    /// A map property.
    pub fn map(name: impl Into<String>, key: ScalarType, value: impl Into<TypeRef>) -> Self {
        Self::new(
            name,
            PropertyShape::Map {
                key,
                value: value.into(),
            },
        )
    }

    /// Marks this property as the entity id.
    #[must_use]
    pub fn id(mut self) -> Self {
        self.id = true;
        self
    }

    /// Marks entity-typed values as pointers to other root entities.
    #[must_use]
    pub fn as_reference(mut self) -> Self {
        self.reference = true;
        self
    }

    /// Marks this property as carrying an equality index.
    #[must_use]
    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    /// Marks this property as supplied at instantiation time.
    #[must_use]
    pub fn constructor_bound(mut self) -> Self {
        self.constructor_bound = true;
        self
    }

    /// Property name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Property shape.
    pub fn shape(&self) -> &PropertyShape {
        &self.shape
    }

    /// Declared type of the value, or of each element for collections and maps.
    pub fn declared_type(&self) -> &TypeRef {
        match &self.shape {
            PropertyShape::Single(ty) | PropertyShape::Collection(ty) => ty,
            PropertyShape::Map { value, .. } => value,
        }
    }

    /// Declared map key type, for maps.
    pub fn map_key_type(&self) -> Option<&ScalarType> {
        match &self.shape {
            PropertyShape::Map { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Returns true for the id property.
    pub fn is_id(&self) -> bool {
        self.id
    }

    /// Returns true for reference properties.
    pub fn is_reference(&self) -> bool {
        self.reference
    }

    /// Returns true if the property carries an index annotation.
    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    /// Returns true if the property is supplied at instantiation time.
    pub fn is_constructor_bound(&self) -> bool {
        self.constructor_bound
    }

    /// Returns true for collection properties.
    pub fn is_collection_like(&self) -> bool {
        matches!(self.shape, PropertyShape::Collection(_))
    }

    /// Returns true for map properties.
    pub fn is_map(&self) -> bool {
        matches!(self.shape, PropertyShape::Map { .. })
    }

    /// Returns true for single nested entities (not references).
    pub fn is_entity(&self) -> bool {
        matches!(self.shape, PropertyShape::Single(TypeRef::Entity(_))) && !self.reference
    }
}

/// Metadata of one entity type.
///
/// Descriptors are registered with a [`super::TypeRegistry`], which fills in
/// inherited keyspace and properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDescriptor {
    name: String,
    keyspace: Option<String>,
    parent: Option<String>,
    properties: Vec<PropertyDescriptor>,
}

impl EntityDescriptor {
    /// Creates a descriptor with no properties.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keyspace: None,
            parent: None,
            properties: Vec::new(),
        }
    }

    /// Sets the keyspace.
    #[must_use]
    pub fn keyspace(mut self, keyspace: impl Into<String>) -> Self {
        self.keyspace = Some(keyspace.into());
        self
    }

    /// Declares the parent type.
    #[must_use]
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Appends a property.
    #[must_use]
    pub fn property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    /// Type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Keyspace of this type. Defaults to the type name.
    pub fn keyspace_name(&self) -> &str {
        self.keyspace.as_deref().unwrap_or(&self.name)
    }

    /// Parent type name, if any.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Properties in declaration order, parent properties first once registered.
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    /// Looks up a property by name.
    pub fn find_property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// The id property, if any.
    pub fn id_property(&self) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.id)
    }

    pub(crate) fn has_explicit_keyspace(&self) -> bool {
        self.keyspace.is_some()
    }

    pub(crate) fn set_keyspace(&mut self, keyspace: String) {
        self.keyspace = Some(keyspace);
    }

    /// Puts the parent's properties first. Own properties with the same name
    /// replace the inherited ones in place.
    pub(crate) fn inherit_properties(&mut self, parent: &[PropertyDescriptor]) {
        let own = std::mem::take(&mut self.properties);
        let mut merged = parent.to_vec();
        for property in own {
            match merged.iter_mut().find(|p| p.name == property.name) {
                Some(slot) => *slot = property,
                None => merged.push(property),
            }
        }
        self.properties = merged;
    }
}
