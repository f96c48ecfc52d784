//! A reference resolver that records its calls.

use hashkv_codec::Object;
use hashkv_core::{CoreResult, ReferenceResolver};
use parking_lot::Mutex;
use std::collections::HashMap;

/// One call to [`RecordingResolver::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveCall {
    /// Referenced id.
    pub id: String,
    /// Keyspace the id was read from.
    pub keyspace: String,
    /// Declared type of the reference.
    pub type_name: String,
}

/// Serves canned referents and remembers every lookup.
///
/// Lookups of unknown `(keyspace, id)` pairs return `None`.
#[derive(Debug, Default)]
pub struct RecordingResolver {
    referents: HashMap<(String, String), Object>,
    calls: Mutex<Vec<ResolveCall>>,
}

impl RecordingResolver {
    /// Creates a resolver with no referents.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a referent served for `keyspace:id`.
    #[must_use]
    pub fn with(mut self, keyspace: &str, id: &str, referent: Object) -> Self {
        self.referents
            .insert((keyspace.to_string(), id.to_string()), referent);
        self
    }

    /// Calls made so far, in order.
    pub fn calls(&self) -> Vec<ResolveCall> {
        self.calls.lock().clone()
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl ReferenceResolver for RecordingResolver {
    fn resolve(&self, id: &str, keyspace: &str, type_name: &str) -> CoreResult<Option<Object>> {
        self.calls.lock().push(ResolveCall {
            id: id.to_string(),
            keyspace: keyspace.to_string(),
            type_name: type_name.to_string(),
        });
        Ok(self
            .referents
            .get(&(keyspace.to_string(), id.to_string()))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_hits_and_misses() {
        let resolver =
            RecordingResolver::new().with("locations", "1", Object::new("Location").with("id", "1"));

        assert!(resolver.resolve("1", "locations", "Location").unwrap().is_some());
        assert!(resolver.resolve("2", "locations", "Location").unwrap().is_none());

        let calls = resolver.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].id, "2");
        assert_eq!(calls[1].type_name, "Location");
    }
}
