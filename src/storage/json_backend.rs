use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::utils::fs::{read_optional, replace_atomic};
use crate::utils::paths;

use super::{ChangeCallback, PersistenceAdapter, ResourceKey, Result};

const FILE_EXTENSION: &str = "json";

/// Filesystem adapter keeping one JSON document per resource key.
///
/// Files are replaced atomically. Writes made by other instances pointing at the
/// same directory are detected by [`PersistenceAdapter::poll_external_changes`].
pub struct JsonFileStorage {
    root: PathBuf,
    known: Mutex<HashMap<ResourceKey, Option<String>>>,
    listeners: Mutex<Vec<(ResourceKey, ChangeCallback)>>,
}

impl JsonFileStorage {
    pub fn new(root: Option<PathBuf>) -> Result<Self> {
        let root = root.unwrap_or_else(paths::ledger_data_dir);
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            known: Mutex::new(HashMap::new()),
            listeners: Mutex::new(Vec::new()),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn resource_path(&self, key: ResourceKey) -> PathBuf {
        self.root
            .join(format!("{}.{}", key.as_str(), FILE_EXTENSION))
    }

    fn remember(&self, key: ResourceKey, content: Option<String>) {
        lock(&self.known).insert(key, content);
    }
}

impl PersistenceAdapter for JsonFileStorage {
    fn read(&self, key: ResourceKey) -> Result<Option<String>> {
        let content = read_optional(&self.resource_path(key))?;
        self.remember(key, content.clone());
        Ok(content)
    }

    fn write(&self, key: ResourceKey, payload: &str) -> Result<()> {
        replace_atomic(&self.resource_path(key), payload)?;
        self.remember(key, Some(payload.to_string()));
        Ok(())
    }

    fn on_external_change(&self, key: ResourceKey, callback: ChangeCallback) {
        lock(&self.listeners).push((key, callback));
        let mut known = lock(&self.known);
        if !known.contains_key(&key) {
            if let Ok(current) = read_optional(&self.resource_path(key)) {
                known.insert(key, current);
            }
        }
    }

    /// Re-reads every watched resource and fires listeners for the ones whose
    /// content no longer matches what this instance last read or wrote.
    fn poll_external_changes(&self) -> Result<Vec<ResourceKey>> {
        let watched: Vec<(ResourceKey, ChangeCallback)> = lock(&self.listeners).clone();
        let mut changed = Vec::new();
        for key in ResourceKey::ALL {
            if !watched.iter().any(|(watched_key, _)| *watched_key == key) {
                continue;
            }
            let current = read_optional(&self.resource_path(key))?;
            let mut known = lock(&self.known);
            match known.get(&key) {
                Some(previous) if *previous == current => {}
                Some(_) => {
                    known.insert(key, current);
                    changed.push(key);
                }
                None => {
                    known.insert(key, current);
                }
            }
        }
        for key in &changed {
            tracing::debug!(resource = %key, "external change detected");
            for (_, callback) in watched.iter().filter(|(watched_key, _)| watched_key == key) {
                callback(*key);
            }
        }
        Ok(changed)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
