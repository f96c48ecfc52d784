//! Object → flat record.

use crate::error::{CoreError, CoreResult};
use crate::index::{IndexConfiguration, IndexDefinition};
use crate::metadata::{EntityAccessor, EntityDescriptor, PropertyDescriptor, PropertyShape, TypeRef};
use crate::path;
use crate::record::FlatRecord;
use hashkv_codec::{to_bytes, to_bytes_as, to_text, CodecError, Object, ScalarType, Value};

pub(super) fn write(
    accessor: &dyn EntityAccessor,
    indexes: &IndexConfiguration,
    object: &Object,
) -> CoreResult<FlatRecord> {
    let descriptor = accessor.descriptor(object.type_name())?;
    let keyspace = descriptor.keyspace_name().to_string();
    tracing::debug!(type_name = object.type_name(), keyspace = %keyspace, "writing entity");

    let mut record = FlatRecord::new();
    record.set_keyspace(keyspace.clone());
    record.put(path::TYPE_HINT_KEY, object.type_name());

    let mut writer = RecordWriter {
        accessor,
        indexes,
        keyspace,
        record,
    };
    writer.write_properties("", object, &descriptor, true)?;

    tracing::trace!(
        entries = writer.record.len(),
        fragments = writer.record.index_fragments().count(),
        "wrote entity"
    );
    Ok(writer.record)
}

struct RecordWriter<'a> {
    accessor: &'a dyn EntityAccessor,
    indexes: &'a IndexConfiguration,
    /// Keyspace of the root entity; index definitions are looked up here.
    keyspace: String,
    record: FlatRecord,
}

impl RecordWriter<'_> {
    fn write_properties(
        &mut self,
        path: &str,
        object: &Object,
        descriptor: &EntityDescriptor,
        root: bool,
    ) -> CoreResult<()> {
        for property in descriptor.properties() {
            let Some(value) = self.accessor.get_property(object, property) else {
                continue;
            };
            let property_path = path::join(path, property.name());

            if property.is_id() {
                let id = scalar_text(&property_path, value)?;
                if root && !id.is_empty() {
                    self.record.set_id(id.clone());
                }
                self.record.put(property_path, id.clone());
                self.write_index(property, &id);
                continue;
            }

            let reference = property.is_reference();
            match property.shape() {
                PropertyShape::Single(declared) => {
                    self.write_element(&property_path, value, declared, reference)?;
                    if let TypeRef::Scalar(ty) = declared {
                        let text = encode(&property_path, value, ty)?;
                        self.write_index(property, &String::from_utf8_lossy(&text));
                    }
                }
                PropertyShape::Collection(element) => {
                    self.write_collection(&property_path, value, element, reference)?;
                }
                PropertyShape::Map {
                    key: key_type,
                    value: element,
                } => {
                    self.write_map(&property_path, value, key_type, element, reference)?;
                }
            }
        }
        Ok(())
    }

    fn write_element(
        &mut self,
        path: &str,
        value: &Value,
        declared: &TypeRef,
        reference: bool,
    ) -> CoreResult<()> {
        if value.is_null() {
            return Ok(());
        }
        match declared {
            TypeRef::Entity(type_name) if reference => self.write_reference(path, value, type_name),
            TypeRef::Entity(type_name) => self.write_nested(path, value, type_name),
            TypeRef::Scalar(ty) => {
                let bytes = encode(path, value, ty)?;
                self.record.put(path, bytes);
                Ok(())
            }
        }
    }

    fn write_nested(&mut self, path: &str, value: &Value, declared: &str) -> CoreResult<()> {
        let object = expect_object(path, value, declared)?;
        let descriptor = self.accessor.descriptor(object.type_name())?;

        if object.type_name() != declared {
            if !self.accessor.is_assignable(object.type_name(), declared) {
                return Err(CoreError::unsupported(
                    path,
                    format!("type {} is not assignable to {declared}", object.type_name()),
                ));
            }
            self.record.put(path::type_hint(path), object.type_name());
        }

        self.write_properties(path, object, &descriptor, false)
    }

    fn write_reference(&mut self, path: &str, value: &Value, declared: &str) -> CoreResult<()> {
        let target = expect_object(path, value, declared)?;
        let descriptor = self.accessor.descriptor(target.type_name())?;

        let id = match descriptor
            .id_property()
            .and_then(|p| self.accessor.get_property(target, p))
        {
            Some(id) => scalar_text(path, id)?,
            None => String::new(),
        };
        if id.is_empty() {
            return Err(CoreError::missing_id(target.type_name()));
        }

        self.record
            .put(path, path::entity_key(descriptor.keyspace_name(), &id));
        Ok(())
    }

    fn write_collection(
        &mut self,
        path: &str,
        value: &Value,
        element: &TypeRef,
        reference: bool,
    ) -> CoreResult<()> {
        let Value::List(items) = value else {
            return Err(CoreError::unsupported(
                path,
                format!("expected a list, found {}", value.kind()),
            ));
        };
        for (index, item) in items.iter().enumerate() {
            let element_path = path::element(path, &index.to_string());
            self.write_element(&element_path, item, element, reference)?;
        }
        Ok(())
    }

    fn write_map(
        &mut self,
        path: &str,
        value: &Value,
        key_type: &ScalarType,
        element: &TypeRef,
        reference: bool,
    ) -> CoreResult<()> {
        let Value::Map(entries) = value else {
            return Err(CoreError::unsupported(
                path,
                format!("expected a map, found {}", value.kind()),
            ));
        };
        for (key, item) in entries {
            let key_text = String::from_utf8_lossy(&encode(path, key, key_type)?).into_owned();
            let element_path = path::element(path, &key_text);
            self.write_element(&element_path, item, element, reference)?;
        }
        Ok(())
    }

    fn write_index(&mut self, property: &PropertyDescriptor, text: &str) {
        let name = property.name();
        let indexed = if self.indexes.has_index_for(&self.keyspace, name) {
            true
        } else if property.is_indexed() {
            let definition = IndexDefinition::simple(self.keyspace.as_str(), name);
            if self.indexes.add_index_definition(definition) {
                tracing::info!(keyspace = %self.keyspace, property = name, "registered index");
            }
            true
        } else {
            false
        };

        if indexed && !text.is_empty() {
            self.record.add_index_fragment(path::index_fragment(name, text));
        }
    }
}

fn expect_object<'v>(path: &str, value: &'v Value, declared: &str) -> CoreResult<&'v Object> {
    match value {
        Value::Object(object) => Ok(object),
        other => Err(CoreError::unsupported(
            path,
            format!("expected an object of type {declared}, found {}", other.kind()),
        )),
    }
}

fn scalar_text(path: &str, value: &Value) -> CoreResult<String> {
    if !value.is_scalar() {
        return Err(CoreError::unsupported(
            path,
            format!("expected a scalar, found {}", value.kind()),
        ));
    }
    Ok(to_text(value)?)
}

/// Encodes a scalar as its declared type. A value that does not fit is a
/// conversion error at `path`.
fn encode(path: &str, value: &Value, ty: &ScalarType) -> CoreResult<Vec<u8>> {
    to_bytes_as(value, ty).map_err(|source| match source {
        CodecError::NotScalar { kind } => {
            CoreError::unsupported(path, format!("expected a scalar, found {kind}"))
        }
        CodecError::Conversion { .. } => {
            CoreError::conversion(path, &to_bytes(value).unwrap_or_default(), source)
        }
    })
}
