//! Dictionary keys and the extension attribute map.

use serde_json::{Map, Value};

/// Insertion-ordered string-keyed map of JSON values.
///
/// Used both for an entity's extension attributes and for its dictionary
/// (wire/storage) form.
pub type Attributes = Map<String, Value>;

/// Key naming the concrete type in the dictionary form.
pub const CLASS_KEY: &str = "__class__";
pub const ID_KEY: &str = "id";
pub const CREATED_AT_KEY: &str = "created_at";
pub const UPDATED_AT_KEY: &str = "updated_at";

/// Misspelled update key found in older stored data; read as `updated_at`.
pub const LEGACY_UPDATED_AT_KEY: &str = "update_at";

/// Keys the entity owns itself; they never live in the extension map.
pub const RESERVED_KEYS: [&str; 5] = [
    CLASS_KEY,
    ID_KEY,
    CREATED_AT_KEY,
    UPDATED_AT_KEY,
    LEGACY_UPDATED_AT_KEY,
];

pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Build an attribute map from `(key, value)` pairs.
pub fn attributes<K, V, I>(pairs: I) -> Attributes
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
