#![doc(test(attr(deny(warnings))))]

//! Ledger Core keeps a personal income and expense ledger: categories and
//! transactions persisted through a pluggable adapter, plus the aggregate and
//! spending-limit reports computed from them.

pub mod config;
pub mod core;
pub mod domain;
pub mod storage;
pub mod utils;

pub use crate::config::{ConfigManager, LedgerConfig, ReportLocale};
pub use crate::core::errors::{ConflictError, LedgerError, StorageError, ValidationError};
pub use crate::core::services::{AggregationService, Granularity, LimitService, Threshold};
pub use crate::core::LedgerStore;
pub use crate::domain::{Category, CategoryId, EntryKind, LedgerSnapshot, NewTransaction, Transaction};
pub use crate::storage::{JsonFileStorage, MemoryStorage, PersistenceAdapter, ResourceKey};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and logs the build this library came from.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        let build = utils::build_info::current();
        tracing::info!(build = %build.summary(), "ledger core initialized");
    });
}
