//! Reference resolution.

use crate::error::CoreResult;
use hashkv_codec::Object;

/// Loads the entity behind a stored reference pointer.
///
/// The reader calls `resolve` exactly once per pointer it meets. Returning
/// `Ok(None)` leaves the property unset; errors abort the read.
pub trait ReferenceResolver: Send + Sync {
    /// Resolves the entity `id` in `keyspace`, declared as `type_name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the referent cannot be loaded.
    fn resolve(&self, id: &str, keyspace: &str, type_name: &str) -> CoreResult<Option<Object>>;
}

/// A resolver that never finds anything. References read as unset.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoReferences;

impl ReferenceResolver for NoReferences {
    fn resolve(&self, _id: &str, _keyspace: &str, _type_name: &str) -> CoreResult<Option<Object>> {
        Ok(None)
    }
}

impl<F> ReferenceResolver for F
where
    F: Fn(&str, &str, &str) -> CoreResult<Option<Object>> + Send + Sync,
{
    fn resolve(&self, id: &str, keyspace: &str, type_name: &str) -> CoreResult<Option<Object>> {
        self(id, keyspace, type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_references_resolves_nothing() {
        assert_eq!(NoReferences.resolve("1", "locations", "Location").unwrap(), None);
    }

    #[test]
    fn closures_are_resolvers() {
        let resolver = |id: &str, keyspace: &str, type_name: &str| -> CoreResult<Option<Object>> {
            Ok(Some(
                Object::new(type_name).with("id", id).with("keyspace", keyspace),
            ))
        };
        let object = resolver.resolve("1", "locations", "Location").unwrap().unwrap();
        assert_eq!(object.type_name(), "Location");
    }
}
