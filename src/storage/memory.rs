//! In-process adapter whose handles behave like separate execution contexts
//! sharing one storage medium.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::core::errors::StorageError;

use super::{ChangeCallback, PersistenceAdapter, ResourceKey, Result};

#[derive(Default)]
struct Shared {
    values: HashMap<ResourceKey, String>,
    writes: HashMap<ResourceKey, usize>,
    listeners: Vec<Listener>,
    next_context: u64,
    unavailable: bool,
}

struct Listener {
    context: u64,
    key: ResourceKey,
    callback: ChangeCallback,
}

/// Memory-backed [`PersistenceAdapter`].
///
/// Every handle obtained through [`MemoryStorage::handle`] is its own context: a
/// write made through one handle notifies listeners registered on the others,
/// never the writer's own.
pub struct MemoryStorage {
    shared: Arc<Mutex<Shared>>,
    context: u64,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                next_context: 1,
                ..Shared::default()
            })),
            context: 0,
        }
    }

    /// Seeds a new medium with a raw payload, as if written by an earlier session.
    pub fn with_payload(key: ResourceKey, payload: impl Into<String>) -> Self {
        let storage = Self::new();
        storage.lock().values.insert(key, payload.into());
        storage
    }

    /// Opens another context on the same medium.
    pub fn handle(&self) -> Self {
        let mut shared = self.lock();
        let context = shared.next_context;
        shared.next_context += 1;
        Self {
            shared: Arc::clone(&self.shared),
            context,
        }
    }

    /// Raw payload currently stored for `key`.
    pub fn payload(&self, key: ResourceKey) -> Option<String> {
        self.lock().values.get(&key).cloned()
    }

    /// Number of successful writes to `key` across all contexts.
    pub fn write_count(&self, key: ResourceKey) -> usize {
        self.lock().writes.get(&key).copied().unwrap_or(0)
    }

    /// Makes every subsequent write fail until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl PersistenceAdapter for MemoryStorage {
    fn read(&self, key: ResourceKey) -> Result<Option<String>> {
        Ok(self.lock().values.get(&key).cloned())
    }

    fn write(&self, key: ResourceKey, payload: &str) -> Result<()> {
        let callbacks: Vec<ChangeCallback> = {
            let mut shared = self.lock();
            if shared.unavailable {
                return Err(StorageError::Unavailable(format!(
                    "memory storage rejected write to `{key}`"
                )));
            }
            shared.values.insert(key, payload.to_string());
            *shared.writes.entry(key).or_insert(0) += 1;
            shared
                .listeners
                .iter()
                .filter(|listener| listener.key == key && listener.context != self.context)
                .map(|listener| Arc::clone(&listener.callback))
                .collect()
        };
        // Listeners run outside the lock so they may read the medium.
        for callback in callbacks {
            callback(key);
        }
        Ok(())
    }

    fn on_external_change(&self, key: ResourceKey, callback: ChangeCallback) {
        self.lock().listeners.push(Listener {
            context: self.context,
            key,
            callback,
        });
    }
}
