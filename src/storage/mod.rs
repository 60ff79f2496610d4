//! Persistence contract consumed by the ledger store plus the bundled adapters.

pub mod json_backend;
pub mod memory;

use std::fmt;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};

use crate::core::errors::StorageError;

pub use json_backend::JsonFileStorage;
pub use memory::MemoryStorage;

pub type Result<T> = std::result::Result<T, StorageError>;

/// Callback fired when a different execution context rewrote a resource.
pub type ChangeCallback = Arc<dyn Fn(ResourceKey) + Send + Sync>;

/// The two independently stored ledger collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKey {
    Categories,
    Transactions,
}

impl ResourceKey {
    pub const ALL: [ResourceKey; 2] = [ResourceKey::Categories, ResourceKey::Transactions];

    /// Name under which the collection is kept in the storage medium.
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKey::Categories => "budget_categories",
            ResourceKey::Transactions => "budget_transactions",
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Synchronous key-value substrate holding serialized collections.
pub trait PersistenceAdapter: Send + Sync {
    /// Returns the stored payload, or `None` when nothing was written yet.
    fn read(&self, key: ResourceKey) -> Result<Option<String>>;

    /// Replaces the stored payload for `key`.
    fn write(&self, key: ResourceKey, payload: &str) -> Result<()>;

    /// Registers `callback` for writes to `key` made by another context.
    fn on_external_change(&self, key: ResourceKey, callback: ChangeCallback);

    /// Checks the medium for writes made by other contexts, firing the
    /// registered callbacks and returning the keys that changed. Adapters that
    /// push notifications as writes happen have nothing to do here.
    fn poll_external_changes(&self) -> Result<Vec<ResourceKey>> {
        Ok(Vec::new())
    }
}

/// Serializes a collection as a JSON array.
pub fn encode_collection<T: Serialize>(items: &[T]) -> Result<String> {
    Ok(serde_json::to_string(items)?)
}

/// Parses a stored JSON array, degrading to an empty collection when the payload
/// is missing, malformed, or has an unexpected shape.
pub fn decode_collection<T: DeserializeOwned>(key: ResourceKey, payload: Option<&str>) -> Vec<T> {
    let Some(raw) = payload else {
        return Vec::new();
    };
    if raw.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<T>>(raw) {
        Ok(items) => items,
        Err(err) => {
            tracing::warn!(resource = %key, error = %err, "stored collection is corrupt; starting empty");
            Vec::new()
        }
    }
}

/// Reads and decodes a collection; read failures fail closed like corrupt data.
pub fn load_collection<T: DeserializeOwned>(
    adapter: &dyn PersistenceAdapter,
    key: ResourceKey,
) -> Vec<T> {
    match adapter.read(key) {
        Ok(payload) => decode_collection(key, payload.as_deref()),
        Err(err) => {
            tracing::warn!(resource = %key, error = %err, "failed to read collection; starting empty");
            Vec::new()
        }
    }
}

/// Encodes and writes a whole collection.
pub fn save_collection<T: Serialize>(
    adapter: &dyn PersistenceAdapter,
    key: ResourceKey,
    items: &[T],
) -> Result<()> {
    let payload = encode_collection(items)?;
    adapter.write(key, &payload)
}
