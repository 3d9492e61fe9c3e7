//! The base persisted entity: identity, timestamps, extension attributes.
//!
//! An [`Entity`] is created in one of two ways:
//!
//! - **fresh**, from an empty attribute map: it gets a new id and is registered
//!   with the [`StorageRegistry`] exactly once;
//! - **reconstructed**, from a stored dictionary: stored values override the
//!   generated ones and the registry is not told about it, since storage
//!   already knows the entity.
//!
//! Construction never fails. A stored timestamp that does not parse is logged
//! and replaced by the time of construction.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::attributes::{
    Attributes, CLASS_KEY, CREATED_AT_KEY, ID_KEY, LEGACY_UPDATED_AT_KEY, UPDATED_AT_KEY,
    is_reserved,
};
use crate::error::{ModelError, ModelResult, StorageError};
use crate::id::EntityId;
use crate::registry::StorageRegistry;
use crate::timestamp::{self, Timestamp};

/// Class name of an entity that is not wrapped by a concrete model.
pub const BASE_CLASS_NAME: &str = "BaseModel";

/// Base persisted record.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    class_name: String,
    id: EntityId,
    created_at: Timestamp,
    updated_at: Timestamp,
    extensions: Attributes,
}

impl Entity {
    /// Create a fresh base entity and register it.
    pub fn new<R>(registry: &R) -> Self
    where
        R: StorageRegistry + ?Sized,
    {
        Self::construct(registry, Attributes::new())
    }

    /// Create a base entity from (possibly empty) stored attributes.
    pub fn construct<R>(registry: &R, attributes: Attributes) -> Self
    where
        R: StorageRegistry + ?Sized,
    {
        Self::construct_as(BASE_CLASS_NAME, registry, attributes)
    }

    /// Create an entity of the given concrete class.
    ///
    /// Registers with `registry` only when `attributes` is empty.
    pub fn construct_as<R>(class_name: impl Into<String>, registry: &R, attributes: Attributes) -> Self
    where
        R: StorageRegistry + ?Sized,
    {
        let fresh = attributes.is_empty();
        let entity = Self::build(class_name.into(), attributes);

        if fresh {
            debug!(class = %entity.class_name, id = %entity.id, "registering new entity");
            registry.register_new(&entity);
        }

        entity
    }

    /// Rebuild an entity from its dictionary form without touching any registry.
    ///
    /// The class name comes from `__class__` when present. The dictionary must
    /// carry an `id`: an entity that storage never saw has to go through
    /// [`Entity::construct`] so it gets registered.
    pub fn from_dict(dict: Attributes) -> ModelResult<Self> {
        if !dict.contains_key(ID_KEY) {
            return Err(ModelError::missing(ID_KEY));
        }

        let class_name = dict
            .get(CLASS_KEY)
            .and_then(Value::as_str)
            .unwrap_or(BASE_CLASS_NAME)
            .to_string();
        Ok(Self::build(class_name, dict))
    }

    fn build(class_name: String, attributes: Attributes) -> Self {
        let created = timestamp::now();
        let mut entity = Self {
            class_name,
            id: EntityId::generate(),
            created_at: created,
            updated_at: created,
            extensions: Attributes::new(),
        };
        let fallback = timestamp::now();

        for (key, value) in attributes {
            match key.as_str() {
                ID_KEY => entity.id = EntityId::from_value(&value),
                CLASS_KEY => {}
                CREATED_AT_KEY => entity.created_at = timestamp_or(&key, &value, fallback),
                UPDATED_AT_KEY => entity.updated_at = timestamp_or(&key, &value, fallback),
                LEGACY_UPDATED_AT_KEY => {
                    debug!(key = %key, "reading legacy update key as updated_at");
                    entity.updated_at = timestamp_or(&key, &value, fallback);
                }
                _ => {
                    entity.extensions.insert(key, value);
                }
            }
        }

        entity
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn extensions(&self) -> &Attributes {
        &self.extensions
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extensions.get(key)
    }

    /// Decode an extension attribute into `T`.
    ///
    /// Returns `Ok(None)` when the attribute is absent.
    pub fn get_as<T>(&self, key: &str) -> ModelResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        self.extensions
            .get(key)
            .map(|v| {
                serde_json::from_value(v.clone())
                    .map_err(|e| ModelError::attribute_type(key, e.to_string()))
            })
            .transpose()
    }

    /// Set an extension attribute, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> ModelResult<Option<Value>> {
        let key = key.into();
        if is_reserved(&key) {
            return Err(ModelError::reserved(key));
        }
        Ok(self.extensions.insert(key, value.into()))
    }

    /// Serialize `value` and store it as an extension attribute.
    pub fn set_as<T>(&mut self, key: &str, value: &T) -> ModelResult<Option<Value>>
    where
        T: Serialize + ?Sized,
    {
        let value =
            serde_json::to_value(value).map_err(|e| ModelError::attribute_type(key, e.to_string()))?;
        self.set(key, value)
    }

    /// Remove an extension attribute, keeping the order of the others.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.extensions.shift_remove(key)
    }

    /// Refresh `updated_at` and ask the registry to persist.
    ///
    /// Best effort: a persistence failure is logged and swallowed. Use
    /// [`Entity::try_save`] to observe it.
    pub fn save<R>(&mut self, registry: &R)
    where
        R: StorageRegistry + ?Sized,
    {
        if let Err(err) = self.try_save(registry) {
            error!(
                class = %self.class_name,
                id = %self.id,
                error = %err,
                "an error occurred while saving"
            );
        }
    }

    /// Like [`Entity::save`], but returns the registry's error.
    pub fn try_save<R>(&mut self, registry: &R) -> Result<(), StorageError>
    where
        R: StorageRegistry + ?Sized,
    {
        self.updated_at = timestamp::now();
        registry.track(self);
        registry.save()
    }

    /// Dictionary form: `id`, timestamps as strings, extensions in insertion
    /// order, then `__class__`.
    pub fn to_dict(&self) -> Attributes {
        let mut dict = self.attribute_map();
        dict.insert(CLASS_KEY.to_string(), Value::String(self.class_name.clone()));
        dict
    }

    /// `[<Class>] (<id>) <attributes>`, for diagnostics only.
    pub fn describe(&self) -> String {
        format!(
            "[{}] ({}) {}",
            self.class_name,
            self.id,
            Value::Object(self.attribute_map())
        )
    }

    fn attribute_map(&self) -> Attributes {
        let mut dict = Attributes::with_capacity(self.extensions.len() + 4);
        dict.insert(ID_KEY.to_string(), Value::String(self.id.to_string()));
        dict.insert(
            CREATED_AT_KEY.to_string(),
            Value::String(timestamp::format(&self.created_at)),
        );
        dict.insert(
            UPDATED_AT_KEY.to_string(),
            Value::String(timestamp::format(&self.updated_at)),
        );
        dict.extend(self.extensions.iter().map(|(k, v)| (k.clone(), v.clone())));
        dict
    }
}

fn timestamp_or(key: &str, value: &Value, fallback: Timestamp) -> Timestamp {
    let parsed = match value {
        Value::String(s) => timestamp::parse(key, s),
        other => Err(ModelError::invalid_timestamp(
            key,
            format!("expected a string, got {other}"),
        )),
    };

    parsed.unwrap_or_else(|err| {
        warn!(key = %key, error = %err, "invalid datetime format, using the current time instead");
        fallback
    })
}

impl core::fmt::Display for Entity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.describe())
    }
}

impl Serialize for Entity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_dict().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Entity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let dict = Attributes::deserialize(deserializer)?;
        Self::from_dict(dict).map_err(serde::de::Error::custom)
    }
}
