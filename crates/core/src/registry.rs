//! Storage registry boundary consumed by entities.

use std::sync::Arc;

use crate::entity::Entity;
use crate::error::StorageError;

/// The component that tracks entities and makes them durable.
///
/// Entities only ever talk to it through this trait: a fresh entity registers
/// itself once at construction, and `Entity::save` asks the registry to persist
/// everything it tracks. What gets written, and where, is the registry's call.
///
/// Methods take `&self`; implementations guard their own state.
pub trait StorageRegistry {
    /// Register a freshly created entity as pending persistence.
    ///
    /// Called at most once per entity, from construction, and only when no
    /// reconstruction data was supplied.
    fn register_new(&self, entity: &Entity);

    /// Persist every tracked entity.
    fn save(&self) -> Result<(), StorageError>;

    /// Refresh the registry's view of an entity that is about to be saved.
    ///
    /// Registries that keep snapshots override this; the default does nothing.
    fn track(&self, _entity: &Entity) {}
}

impl<S> StorageRegistry for &S
where
    S: StorageRegistry + ?Sized,
{
    fn register_new(&self, entity: &Entity) {
        (**self).register_new(entity)
    }

    fn save(&self) -> Result<(), StorageError> {
        (**self).save()
    }

    fn track(&self, entity: &Entity) {
        (**self).track(entity)
    }
}

impl<S> StorageRegistry for Arc<S>
where
    S: StorageRegistry + ?Sized,
{
    fn register_new(&self, entity: &Entity) {
        (**self).register_new(entity)
    }

    fn save(&self) -> Result<(), StorageError> {
        (**self).save()
    }

    fn track(&self, entity: &Entity) {
        (**self).track(entity)
    }
}
