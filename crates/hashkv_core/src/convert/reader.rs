//! Flat record → object.

use crate::error::{CoreError, CoreResult};
use crate::metadata::{EntityAccessor, EntityDescriptor, PropertyDescriptor, PropertyShape, TypeRef};
use crate::path;
use crate::record::FlatRecord;
use crate::resolver::ReferenceResolver;
use hashkv_codec::{from_bytes, Object, ScalarType, Value};
use std::sync::Arc;

pub(super) fn read(
    accessor: &dyn EntityAccessor,
    resolver: &dyn ReferenceResolver,
    type_name: &str,
    record: &FlatRecord,
) -> CoreResult<Option<Object>> {
    if record.is_empty() {
        return Ok(None);
    }
    tracing::debug!(type_name, entries = record.len(), "reading entity");

    let reader = RecordReader { accessor, resolver };
    reader.read_entity("", type_name, record).map(Some)
}

struct RecordReader<'a> {
    accessor: &'a dyn EntityAccessor,
    resolver: &'a dyn ReferenceResolver,
}

impl RecordReader<'_> {
    /// Reads the entity at `path` from `record`, whose local `_class` (if
    /// any) is the hint for this entity.
    fn read_entity(&self, path: &str, declared: &str, record: &FlatRecord) -> CoreResult<Object> {
        let descriptor = self.resolve_type(path, declared, record)?;

        let mut args = Vec::new();
        for property in descriptor.properties().iter().filter(|p| p.is_constructor_bound()) {
            let property_path = path::join(path, property.name());
            if let Some(value) = self.read_property(&property_path, property, record)? {
                args.push((property.name().to_string(), value));
            }
        }
        let mut object = self.accessor.instantiate(&descriptor, args)?;

        for property in descriptor.properties().iter().filter(|p| !p.is_constructor_bound()) {
            let property_path = path::join(path, property.name());
            if let Some(value) = self.read_property(&property_path, property, record)? {
                self.accessor.set_property(&mut object, property, value);
            }
        }
        Ok(object)
    }

    fn resolve_type(
        &self,
        path: &str,
        declared: &str,
        record: &FlatRecord,
    ) -> CoreResult<Arc<EntityDescriptor>> {
        let Some(raw) = record.get(path::TYPE_HINT_KEY) else {
            return self.accessor.descriptor(declared);
        };

        let hint_path = path::type_hint(path);
        let type_name = std::str::from_utf8(raw).map_err(|_| {
            CoreError::type_resolution(String::from_utf8_lossy(raw), hint_path.as_str())
        })?;

        let descriptor = match self.accessor.descriptor(type_name) {
            Ok(descriptor) => descriptor,
            Err(CoreError::UnknownType { .. }) => {
                return Err(CoreError::type_resolution(type_name, hint_path));
            }
            Err(e) => return Err(e),
        };
        if !self.accessor.is_assignable(type_name, declared) {
            return Err(CoreError::type_resolution(type_name, hint_path));
        }

        tracing::trace!(path = %hint_path, type_name, "resolved type hint");
        Ok(descriptor)
    }

    fn read_property(
        &self,
        path: &str,
        property: &PropertyDescriptor,
        record: &FlatRecord,
    ) -> CoreResult<Option<Value>> {
        let reference = property.is_reference();
        match property.shape() {
            PropertyShape::Single(declared) => self.read_single(path, declared, reference, record),
            PropertyShape::Collection(element) => {
                self.read_collection(path, element, reference, record)
            }
            PropertyShape::Map { key, value } => self.read_map(path, key, value, reference, record),
        }
    }

    fn read_single(
        &self,
        path: &str,
        declared: &TypeRef,
        reference: bool,
        record: &FlatRecord,
    ) -> CoreResult<Option<Value>> {
        match declared {
            TypeRef::Entity(type_name) if reference => {
                self.read_reference(path, type_name, record.get(path))
            }
            TypeRef::Entity(type_name) => {
                let sub = record.extract(path);
                if sub.is_empty() {
                    return Ok(None);
                }
                Ok(Some(Value::Object(self.read_entity(path, type_name, &sub)?)))
            }
            TypeRef::Scalar(ty) => match record.get(path) {
                Some(raw) => decode(path, raw, ty),
                None => Ok(None),
            },
        }
    }

    fn read_reference(
        &self,
        path: &str,
        type_name: &str,
        raw: Option<&[u8]>,
    ) -> CoreResult<Option<Value>> {
        let Some(raw) = raw else {
            return Ok(None);
        };
        let pointer = std::str::from_utf8(raw)
            .map_err(|_| CoreError::invalid_reference(path, String::from_utf8_lossy(raw)))?;
        let (keyspace, id) = path::split_reference(pointer)
            .ok_or_else(|| CoreError::invalid_reference(path, pointer))?;

        match self.resolver.resolve(id, keyspace, type_name)? {
            Some(object) => Ok(Some(Value::Object(object))),
            None => {
                tracing::warn!(path, pointer, "reference did not resolve");
                Ok(None)
            }
        }
    }

    /// Elements come back in index order; keys whose bracket text is not an
    /// index keep their stored order after the indexed ones.
    fn read_collection(
        &self,
        path: &str,
        element: &TypeRef,
        reference: bool,
        record: &FlatRecord,
    ) -> CoreResult<Option<Value>> {
        let prefix = path::element_prefix(path);
        let mut items: Vec<(Option<usize>, Value)> = Vec::new();

        match element {
            TypeRef::Entity(type_name) if !reference => {
                for element_path in record.element_paths(&prefix) {
                    let sub = record.extract(&element_path);
                    if sub.is_empty() {
                        continue;
                    }
                    let object = self.read_entity(&element_path, type_name, &sub)?;
                    items.push((element_index(&element_path, &prefix), Value::Object(object)));
                }
            }
            _ => {
                for (key, raw) in record.entries_with_prefix(&prefix) {
                    let value = match element {
                        TypeRef::Entity(type_name) => self.read_reference(key, type_name, Some(raw))?,
                        TypeRef::Scalar(ty) => decode(key, raw, ty)?,
                    };
                    if let Some(value) = value {
                        items.push((element_index(key, &prefix), value));
                    }
                }
            }
        }

        if items.is_empty() {
            return Ok(None);
        }
        items.sort_by_key(|(index, _)| index.unwrap_or(usize::MAX));
        Ok(Some(Value::List(items.into_iter().map(|(_, v)| v).collect())))
    }

    fn read_map(
        &self,
        path: &str,
        key_type: &ScalarType,
        element: &TypeRef,
        reference: bool,
        record: &FlatRecord,
    ) -> CoreResult<Option<Value>> {
        let prefix = path::element_prefix(path);
        let mut entries = Vec::new();

        match element {
            TypeRef::Entity(type_name) if !reference => {
                for element_path in record.element_paths(&prefix) {
                    let Some(key_text) = path::element_key(&element_path, &prefix) else {
                        continue;
                    };
                    let Some(key) = decode(&element_path, key_text.as_bytes(), key_type)? else {
                        continue;
                    };
                    let sub = record.extract(&element_path);
                    if sub.is_empty() {
                        continue;
                    }
                    let object = self.read_entity(&element_path, type_name, &sub)?;
                    entries.push((key, Value::Object(object)));
                }
            }
            _ => {
                for (entry_key, raw) in record.entries_with_prefix(&prefix) {
                    let Some(key_text) = path::leaf_element_key(entry_key, &prefix) else {
                        continue;
                    };
                    let Some(key) = decode(entry_key, key_text.as_bytes(), key_type)? else {
                        continue;
                    };
                    let value = match element {
                        TypeRef::Entity(type_name) => {
                            self.read_reference(entry_key, type_name, Some(raw))?
                        }
                        TypeRef::Scalar(ty) => decode(entry_key, raw, ty)?,
                    };
                    if let Some(value) = value {
                        entries.push((key, value));
                    }
                }
            }
        }

        Ok((!entries.is_empty()).then_some(Value::Map(entries)))
    }
}

fn decode(path: &str, raw: &[u8], ty: &ScalarType) -> CoreResult<Option<Value>> {
    from_bytes(raw, ty).map_err(|source| CoreError::conversion(path, raw, source))
}

fn element_index(key: &str, prefix: &str) -> Option<usize> {
    path::element_key(key, prefix)?.parse().ok()
}
