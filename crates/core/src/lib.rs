//! `hbnb-core` — the base entity contract shared by every persisted object.
//!
//! Identity, creation/update timestamps, tolerant reconstruction from stored
//! key/value data, and the dictionary form used on the wire and on disk.
//! Storage itself lives behind [`StorageRegistry`].

pub mod attributes;
pub mod entity;
pub mod error;
pub mod id;
pub mod model;
pub mod registry;
pub mod timestamp;

#[cfg(test)]
mod test_support;

pub use attributes::{Attributes, attributes};
pub use entity::{BASE_CLASS_NAME, Entity};
pub use error::{ModelError, ModelResult, StorageError};
pub use id::EntityId;
pub use model::Model;
pub use registry::StorageRegistry;
pub use timestamp::{TIMESTAMP_FORMAT, Timestamp};

#[doc(hidden)]
pub use paste::paste as __paste;
