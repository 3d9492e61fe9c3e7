//! Storage registries for `hbnb-core` entities.
//!
//! - [`InMemoryRegistry`]: snapshots and call counts, nothing durable (tests/dev).
//! - [`FileStorage`]: snapshots written to a single JSON file on save.

pub mod config;
pub mod file;
pub mod memory;

pub use config::{DEFAULT_STORAGE_PATH, STORAGE_PATH_ENV, StorageConfig};
pub use file::FileStorage;
pub use memory::{InMemoryRegistry, RegistryStats};

use hbnb_core::Entity;

/// Key under which a registry tracks `entity`: `"<Class>.<id>"`.
pub fn storage_key(entity: &Entity) -> String {
    format!("{}.{}", entity.class_name(), entity.id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hbnb_core::attributes;

    #[test]
    fn key_combines_class_and_id() {
        let entity = Entity::from_dict(attributes([("__class__", "City"), ("id", "42")])).unwrap();
        assert_eq!(storage_key(&entity), "City.42");
    }
}
