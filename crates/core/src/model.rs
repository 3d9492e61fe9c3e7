//! Concrete entity types layered over [`Entity`].
//!
//! A model is a named wrapper around an entity. Its class name ends up in the
//! `__class__` key and in `describe()`, and its typed fields are views over the
//! entity's extension map. Use the [`model!`](crate::model!) macro to declare
//! one rather than implementing [`Model`] by hand.

use crate::attributes::Attributes;
use crate::entity::Entity;
use crate::error::StorageError;
use crate::id::EntityId;
use crate::registry::StorageRegistry;

pub trait Model: Sized {
    /// Concrete type name written to `__class__`.
    const CLASS_NAME: &'static str;

    fn from_entity(entity: Entity) -> Self;

    fn entity(&self) -> &Entity;

    fn entity_mut(&mut self) -> &mut Entity;

    /// Fresh instance, registered with `registry`.
    fn create<R>(registry: &R) -> Self
    where
        R: StorageRegistry + ?Sized,
    {
        Self::construct(registry, Attributes::new())
    }

    /// Instance from stored attributes; registers only when they are empty.
    fn construct<R>(registry: &R, attributes: Attributes) -> Self
    where
        R: StorageRegistry + ?Sized,
    {
        Self::from_entity(Entity::construct_as(Self::CLASS_NAME, registry, attributes))
    }

    fn id(&self) -> &EntityId {
        self.entity().id()
    }

    fn save<R>(&mut self, registry: &R)
    where
        R: StorageRegistry + ?Sized,
    {
        self.entity_mut().save(registry)
    }

    fn try_save<R>(&mut self, registry: &R) -> Result<(), StorageError>
    where
        R: StorageRegistry + ?Sized,
    {
        self.entity_mut().try_save(registry)
    }

    fn to_dict(&self) -> Attributes {
        self.entity().to_dict()
    }

    fn describe(&self) -> String {
        self.entity().describe()
    }
}

/// Declare a concrete model with typed accessors over its extension map.
///
/// ```ignore
/// hbnb_core::model! {
///     /// A registered guest.
///     pub struct User {
///         email: String,
///         age: u32,
///     }
/// }
///
/// let mut user = User::create(&registry);
/// user.set_email("a@b.c".to_string())?;
/// assert_eq!(user.email()?, Some("a@b.c".to_string()));
/// ```
///
/// Each field `f: T` yields `f(&self) -> ModelResult<Option<T>>` and
/// `set_f(&mut self, T) -> ModelResult<()>`. Field names must not be one of
/// the reserved dictionary keys.
#[macro_export]
macro_rules! model {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $(#[$field_meta:meta])* $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        $vis struct $name {
            entity: $crate::Entity,
        }

        impl $crate::Model for $name {
            const CLASS_NAME: &'static str = stringify!($name);

            fn from_entity(entity: $crate::Entity) -> Self {
                Self { entity }
            }

            fn entity(&self) -> &$crate::Entity {
                &self.entity
            }

            fn entity_mut(&mut self) -> &mut $crate::Entity {
                &mut self.entity
            }
        }

        $crate::__paste! {
            impl $name {
                $(
                    $(#[$field_meta])*
                    pub fn $field(&self) -> $crate::ModelResult<Option<$ty>> {
                        self.entity.get_as::<$ty>(stringify!($field))
                    }

                    pub fn [<set_ $field>](&mut self, value: $ty) -> $crate::ModelResult<()> {
                        self.entity.set_as(stringify!($field), &value).map(|_| ())
                    }
                )*
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&$crate::Model::describe(self))
            }
        }
    };
}
