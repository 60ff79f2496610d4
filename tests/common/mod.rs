#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use ledger_core::{
    config::ConfigManager, EntryKind, JsonFileStorage, LedgerStore, MemoryStorage, NewTransaction,
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates a unique base directory that outlives the calling test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// JSON-backed adapter plus a config manager sharing one isolated directory.
pub fn setup_json_env() -> (Arc<JsonFileStorage>, ConfigManager, PathBuf) {
    let base = temp_base();
    let storage = JsonFileStorage::new(Some(base.join("data"))).expect("create json storage");
    let config = ConfigManager::with_base_dir(base.clone()).expect("create config manager");
    (Arc::new(storage), config, base)
}

pub fn memory_store() -> (LedgerStore, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    let store = LedgerStore::open(storage.clone());
    (store, storage)
}

/// Groceries (limit 200), Salary and the fallback, with a handful of entries.
pub fn seed(store: &mut LedgerStore) {
    store
        .add_category("Groceries", EntryKind::Expense, Some(200.0))
        .expect("add groceries");
    store
        .add_category("Salary", EntryKind::Income, None)
        .expect("add salary");
    for draft in [
        NewTransaction::income(3000.0, "March pay", "2024-03-01", "salary"),
        NewTransaction::expense(100.0, "Market", "2024-03-04", "groceries"),
        NewTransaction::expense(70.0, "Bakery", "2024-03-18", "groceries"),
        NewTransaction::expense(45.0, "Parking", "2024-04-02", "other"),
        NewTransaction::income(3000.0, "April pay", "2024-04-01", "salary"),
    ] {
        store.add_transaction(draft).expect("seed transaction");
    }
}
