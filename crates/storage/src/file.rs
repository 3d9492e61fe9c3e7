use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use hbnb_core::attributes::ID_KEY;
use hbnb_core::{Attributes, Entity, StorageError, StorageRegistry};
use tracing::{debug, warn};

use crate::config::StorageConfig;
use crate::storage_key;

/// JSON file registry.
///
/// Tracks one dictionary snapshot per entity under `"<Class>.<id>"` and writes
/// the whole map to a single JSON object on `save`. Entities read back with
/// [`FileStorage::reload`] are rebuilt from their dictionaries and are never
/// registered as new.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    objects: RwLock<BTreeMap<String, Attributes>>,
}

impl FileStorage {
    /// Empty registry writing to `path`. Does not read the file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            objects: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.file_path.clone())
    }

    /// Registry writing to `path`, preloaded with whatever the file holds.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let storage = Self::new(path);
        storage.reload()?;
        Ok(storage)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Merge the file's contents into the tracked set.
    ///
    /// A missing file is not an error. Entries without an `id` are skipped.
    /// Returns how many objects were kept.
    pub fn reload(&self) -> Result<usize, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "storage file not found, nothing to reload");
                return Ok(0);
            }
            Err(e) => return Err(e.into()),
        };

        let loaded: BTreeMap<String, Attributes> = serde_json::from_str(&raw)?;
        let loaded: Vec<_> = loaded
            .into_iter()
            .filter(|(key, dict)| {
                let keep = dict.contains_key(ID_KEY);
                if !keep {
                    warn!(key = %key, "skipping stored object without an id");
                }
                keep
            })
            .collect();
        let count = loaded.len();

        let mut objects = self.objects.write().map_err(|_| StorageError::Poisoned)?;
        objects.extend(loaded);

        debug!(path = %self.path.display(), count, "reloaded storage file");
        Ok(count)
    }

    pub fn len(&self) -> usize {
        self.objects.read().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, class_name: &str, id: &str) -> Option<Entity> {
        let objects = self.objects.read().ok()?;
        objects
            .get(&format!("{class_name}.{id}"))
            .cloned()
            .and_then(|dict| Entity::from_dict(dict).ok())
    }

    /// Every tracked entity, ordered by storage key.
    pub fn all(&self) -> Vec<Entity> {
        let objects = match self.objects.read() {
            Ok(o) => o,
            Err(_) => return vec![],
        };

        objects
            .values()
            .cloned()
            .filter_map(|dict| Entity::from_dict(dict).ok())
            .collect()
    }

    /// Stop tracking an entity. The file changes on the next `save`.
    pub fn remove(&self, class_name: &str, id: &str) -> Option<Entity> {
        let mut objects = self.objects.write().ok()?;
        objects
            .remove(&format!("{class_name}.{id}"))
            .and_then(|dict| Entity::from_dict(dict).ok())
    }

    fn upsert(&self, entity: &Entity) {
        if let Ok(mut objects) = self.objects.write() {
            objects.insert(storage_key(entity), entity.to_dict());
        }
    }
}

impl StorageRegistry for FileStorage {
    fn register_new(&self, entity: &Entity) {
        self.upsert(entity);
    }

    fn save(&self) -> Result<(), StorageError> {
        let json = {
            let objects = self.objects.read().map_err(|_| StorageError::Poisoned)?;
            serde_json::to_string(&*objects)?
        };

        fs::write(&self.path, json)?;
        debug!(path = %self.path.display(), count = self.len(), "saved storage file");
        Ok(())
    }

    fn track(&self, entity: &Entity) {
        self.upsert(entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hbnb_core::attributes;
    use serde_json::Value;

    #[test]
    fn save_then_reopen_restores_entities() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.json");

        let storage = FileStorage::new(&path);
        let mut first = Entity::new(&storage);
        first.set("name", "My First Model").unwrap();
        first.save(&storage);
        let second = Entity::construct_as("User", &storage, attributes([("email", "a@b.c")]));
        let second_id = second.id().clone();
        storage.save().unwrap();

        let first_id = first.id().clone();
        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.get("BaseModel", first_id.as_str()), Some(first));
        assert!(reopened.get("User", second_id.as_str()).is_none());
    }

    #[test]
    fn file_holds_dictionaries_keyed_by_class_and_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.json");
        let storage = FileStorage::new(&path);

        let mut entity = Entity::construct_as("Place", &storage, Attributes::new());
        entity.save(&storage);

        let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let key = format!("Place.{}", entity.id());
        assert_eq!(raw[&key]["__class__"], Value::from("Place"));
        assert_eq!(raw[&key]["id"], Value::from(entity.id().as_str()));
        assert_eq!(raw[&key], Value::Object(entity.to_dict()));
    }

    #[test]
    fn reload_of_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path().join("absent.json")).unwrap();

        assert!(storage.is_empty());
        assert_eq!(storage.reload().unwrap(), 0);
    }

    #[test]
    fn reload_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(FileStorage::open(&path), Err(StorageError::Serialization(_))));
    }

    #[test]
    fn reload_skips_objects_without_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.json");
        fs::write(
            &path,
            r#"{"BaseModel.1": {"id": "1", "__class__": "BaseModel"}, "BaseModel.x": {"name": "orphan"}}"#,
        )
        .unwrap();

        let storage = FileStorage::new(&path);
        assert_eq!(storage.reload().unwrap(), 1);
        assert_eq!(storage.len(), 1);
        assert!(storage.get("BaseModel", "1").is_some());
    }

    #[test]
    fn saved_file_keeps_attribute_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.json");
        let storage = FileStorage::new(&path);

        let mut entity = Entity::new(&storage);
        entity.set("zeta", 1).unwrap();
        entity.set("alpha", 2).unwrap();
        entity.save(&storage);

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.find("\"zeta\"").unwrap() < raw.find("\"alpha\"").unwrap(), "{raw}");

        let reopened = FileStorage::open(&path).unwrap();
        let restored = reopened.get("BaseModel", entity.id().as_str()).unwrap();
        let keys: Vec<&str> = restored.extensions().keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "alpha"]);
    }

    #[test]
    fn unwritable_path_is_swallowed_by_save_but_reported_by_try_save() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("missing-dir").join("file.json"));
        let mut entity = Entity::new(&storage);
        let before = entity.updated_at();

        entity.save(&storage);
        assert!(entity.updated_at() >= before);
        assert!(matches!(entity.try_save(&storage), Err(StorageError::Io(_))));
    }

    #[test]
    fn remove_drops_entity_from_next_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.json");
        let storage = FileStorage::new(&path);

        let keep = Entity::new(&storage);
        let gone = Entity::new(&storage);
        assert_eq!(
            storage.remove("BaseModel", gone.id().as_str()).map(|e| e.id().clone()),
            Some(gone.id().clone())
        );
        storage.save().unwrap();

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.all(), vec![keep]);
    }

    #[test]
    fn saves_with_process_logging_installed() {
        hbnb_observability::init_with_filter("hbnb_storage=debug,hbnb_core=debug");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.json");
        let storage = FileStorage::new(&path);
        let mut entity = Entity::new(&storage);
        entity.save(&storage);

        assert_eq!(FileStorage::open(&path).unwrap().len(), 1);
    }

    #[test]
    fn from_config_uses_configured_path() {
        let config = StorageConfig::with_path(Some("objects.json".to_string()));
        assert_eq!(FileStorage::from_config(&config).path(), Path::new("objects.json"));
    }
}
