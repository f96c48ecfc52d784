//! Equality queries over secondary indexes.

use crate::error::{CoreError, CoreResult};
use crate::path;
use hashkv_codec::{to_text, Value};

/// A query answered from index sets alone.
///
/// `and` criteria must all match: their sets are intersected. `or`
/// criteria are alternatives: their sets are united with the result of the
/// `and` part.
///
/// ```
/// use hashkv_core::IndexQuery;
///
/// let query = IndexQuery::new().and("firstname", "rand").or("firstname", "mat");
/// let (all, any) = query.fragments().unwrap();
/// assert_eq!(all, vec!["firstname:rand"]);
/// assert_eq!(any, vec!["firstname:mat"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexQuery {
    all_of: Vec<(String, Value)>,
    any_of: Vec<(String, Value)>,
}

impl IndexQuery {
    /// Creates an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires `property` to equal `value`.
    #[must_use]
    pub fn and(mut self, property: impl Into<String>, value: impl Into<Value>) -> Self {
        self.all_of.push((property.into(), value.into()));
        self
    }

    /// Also accepts entities whose `property` equals `value`.
    #[must_use]
    pub fn or(mut self, property: impl Into<String>, value: impl Into<Value>) -> Self {
        self.any_of.push((property.into(), value.into()));
        self
    }

    /// Returns true if the query has no criteria.
    pub fn is_empty(&self) -> bool {
        self.all_of.is_empty() && self.any_of.is_empty()
    }

    /// Index fragments of the `and` and `or` parts.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnsupportedDescriptor`] if a criterion value is
    /// not a scalar.
    pub fn fragments(&self) -> CoreResult<(Vec<String>, Vec<String>)> {
        Ok((to_fragments(&self.all_of)?, to_fragments(&self.any_of)?))
    }
}

fn to_fragments(criteria: &[(String, Value)]) -> CoreResult<Vec<String>> {
    criteria
        .iter()
        .map(|(property, value)| {
            if !value.is_scalar() {
                return Err(CoreError::unsupported(
                    property.as_str(),
                    format!("query value must be a scalar, found {}", value.kind()),
                ));
            }
            Ok(path::index_fragment(property, &to_text(value)?))
        })
        .collect()
}
