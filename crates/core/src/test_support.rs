//! Test doubles shared by the unit tests in this crate.

use std::io;
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;

use crate::entity::Entity;
use crate::error::StorageError;
use crate::id::EntityId;
use crate::registry::StorageRegistry;

/// Registry that records every call and can be told to fail on save.
#[derive(Debug, Default)]
pub struct RecordingRegistry {
    registered: Mutex<Vec<EntityId>>,
    tracked: Mutex<Vec<EntityId>>,
    save_calls: Mutex<usize>,
    fail_saves: bool,
}

impl RecordingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    pub fn registered(&self) -> Vec<EntityId> {
        self.registered.lock().unwrap().clone()
    }

    pub fn tracked(&self) -> Vec<EntityId> {
        self.tracked.lock().unwrap().clone()
    }

    pub fn save_calls(&self) -> usize {
        *self.save_calls.lock().unwrap()
    }
}

impl StorageRegistry for RecordingRegistry {
    fn register_new(&self, entity: &Entity) {
        self.registered.lock().unwrap().push(entity.id().clone());
    }

    fn save(&self) -> Result<(), StorageError> {
        *self.save_calls.lock().unwrap() += 1;
        if self.fail_saves {
            return Err(StorageError::backend("disk full"));
        }
        Ok(())
    }

    fn track(&self, entity: &Entity) {
        self.tracked.lock().unwrap().push(entity.id().clone());
    }
}

/// Collects formatted `tracing` output emitted while running a closure.
#[derive(Debug, Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run<T>(&self, f: impl FnOnce() -> T) -> T {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
