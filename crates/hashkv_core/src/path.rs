//! Path and key syntax of flat records.
//!
//! A path is a dot-separated sequence of segments. Properties contribute
//! their name, list elements contribute `[<index>]` and map entries
//! contribute `[<key text>]`:
//!
//! ```text
//! firstname
//! address.city
//! nicknames.[0]
//! physicalAttributes.[hair-color]
//! coworkers.[1].address._class
//! ```
//!
//! Storage keys combine a keyspace with an id (`persons:1`) or with an
//! index fragment (`persons.firstname:rand`).

/// Key of the type hint entry, relative to the entity it describes.
pub const TYPE_HINT_KEY: &str = "_class";

/// Separator between path segments.
pub const PATH_SEPARATOR: char = '.';

/// Separator between keyspace and id, and between index property and value.
pub const KEY_SEPARATOR: char = ':';

/// Opening bracket of an element segment.
const ELEMENT_OPEN: &str = "[";

/// Closing bracket of an element segment.
const ELEMENT_CLOSE: char = ']';

/// Appends a property segment to `prefix`.
///
/// The empty prefix denotes the root entity.
pub fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}{PATH_SEPARATOR}{name}")
    }
}

/// Path of a list element or map entry below `prefix`.
pub fn element(prefix: &str, key: &str) -> String {
    format!("{prefix}{PATH_SEPARATOR}{ELEMENT_OPEN}{key}{ELEMENT_CLOSE}")
}

/// Common prefix of every element path below `prefix` (`prefix.[`).
pub fn element_prefix(prefix: &str) -> String {
    format!("{prefix}{PATH_SEPARATOR}{ELEMENT_OPEN}")
}

/// Prefix shared by every entry of the subtree rooted at `path` (`path.`).
pub fn subtree_prefix(path: &str) -> String {
    format!("{path}{PATH_SEPARATOR}")
}

/// Key of the type hint for the entity at `path`.
pub fn type_hint(path: &str) -> String {
    join(path, TYPE_HINT_KEY)
}

/// Returns the element path of `key` up to and including the first `]`
/// following `element_prefix`.
///
/// Map key text containing `]` is cut at that bracket.
pub fn element_path<'a>(key: &'a str, element_prefix: &str) -> Option<&'a str> {
    let rest = key.strip_prefix(element_prefix)?;
    let close = rest.find(ELEMENT_CLOSE)?;
    Some(&key[..element_prefix.len() + close + 1])
}

/// Extracts the bracketed key text of `key` below `element_prefix`, up to
/// the first `]`.
pub fn element_key<'a>(key: &'a str, element_prefix: &str) -> Option<&'a str> {
    let rest = key.strip_prefix(element_prefix)?;
    let close = rest.find(ELEMENT_CLOSE)?;
    Some(&rest[..close])
}

/// Extracts the key text of a leaf element entry: everything between
/// `element_prefix` and the trailing `]`.
pub fn leaf_element_key<'a>(key: &'a str, element_prefix: &str) -> Option<&'a str> {
    key.strip_prefix(element_prefix)?.strip_suffix(ELEMENT_CLOSE)
}

/// Storage key of an entity hash: `keyspace:id`.
pub fn entity_key(keyspace: &str, id: &str) -> String {
    format!("{keyspace}{KEY_SEPARATOR}{id}")
}

/// Storage key of an index set: `keyspace.fragment`.
pub fn index_key(keyspace: &str, fragment: &str) -> String {
    format!("{keyspace}{PATH_SEPARATOR}{fragment}")
}

/// Index fragment for an equality match: `property:value`.
pub fn index_fragment(property: &str, value: &str) -> String {
    format!("{property}{KEY_SEPARATOR}{value}")
}

/// Prefix shared by every index key of `keyspace`.
pub fn index_prefix(keyspace: &str) -> String {
    subtree_prefix(keyspace)
}

/// Splits a reference pointer `keyspace:id` at the first `:`.
///
/// Ids may themselves contain `:`; keyspaces may not.
pub fn split_reference(pointer: &str) -> Option<(&str, &str)> {
    let (keyspace, id) = pointer.split_once(KEY_SEPARATOR)?;
    if keyspace.is_empty() || id.is_empty() {
        return None;
    }
    Some((keyspace, id))
}
