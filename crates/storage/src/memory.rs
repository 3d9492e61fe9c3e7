use std::collections::BTreeMap;
use std::sync::RwLock;

use hbnb_core::{Attributes, Entity, StorageError, StorageRegistry};

use crate::storage_key;

/// Call counts observed by an [`InMemoryRegistry`].
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct RegistryStats {
    pub registrations: usize,
    pub tracks: usize,
    pub saves: usize,
}

#[derive(Debug, Default)]
struct Inner {
    objects: BTreeMap<String, Attributes>,
    stats: RegistryStats,
    fail_saves: Option<String>,
}

/// In-memory registry for tests/dev.
///
/// Keeps a dictionary snapshot per entity and counts every call. Nothing is
/// durable; `save` only succeeds or fails on demand.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    inner: RwLock<Inner>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `save` fail with `reason` (or succeed again with `None`).
    pub fn fail_saves(&self, reason: Option<&str>) {
        if let Ok(mut inner) = self.inner.write() {
            inner.fail_saves = reason.map(str::to_string);
        }
    }

    pub fn stats(&self) -> RegistryStats {
        self.inner.read().map(|i| i.stats).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|i| i.objects.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rebuilt copy of the tracked entity, if any.
    pub fn get(&self, class_name: &str, id: &str) -> Option<Entity> {
        let inner = self.inner.read().ok()?;
        inner
            .objects
            .get(&format!("{class_name}.{id}"))
            .cloned()
            .and_then(|dict| Entity::from_dict(dict).ok())
    }

    /// Every tracked entity, ordered by storage key.
    pub fn all(&self) -> Vec<Entity> {
        let inner = match self.inner.read() {
            Ok(i) => i,
            Err(_) => return vec![],
        };

        inner.objects
            .values()
            .cloned()
            .filter_map(|dict| Entity::from_dict(dict).ok())
            .collect()
    }

    fn upsert(&self, entity: &Entity, registering: bool) {
        if let Ok(mut inner) = self.inner.write() {
            if registering {
                inner.stats.registrations += 1;
            } else {
                inner.stats.tracks += 1;
            }
            inner.objects.insert(storage_key(entity), entity.to_dict());
        }
    }
}

impl StorageRegistry for InMemoryRegistry {
    fn register_new(&self, entity: &Entity) {
        self.upsert(entity, true);
    }

    fn save(&self) -> Result<(), StorageError> {
        let mut inner = self.inner.write().map_err(|_| StorageError::Poisoned)?;
        inner.stats.saves += 1;

        match &inner.fail_saves {
            Some(reason) => Err(StorageError::backend(reason.clone())),
            None => Ok(()),
        }
    }

    fn track(&self, entity: &Entity) {
        self.upsert(entity, false);
    }
}
