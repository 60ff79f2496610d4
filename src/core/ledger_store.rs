//! The canonical in-memory ledger and the only place it is mutated.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;

use crate::config::LedgerConfig;
use crate::core::errors::{ConflictError, LedgerError, Result, ValidationError};
use crate::domain::transaction::parse_entry_date;
use crate::domain::{
    Category, CategoryId, EntryKind, LedgerSnapshot, NewTransaction, Transaction, TransactionId,
};
use crate::storage::{self, JsonFileStorage, PersistenceAdapter, ResourceKey};

/// Receives the ledger state after every change.
pub type SnapshotListener = Box<dyn Fn(&LedgerSnapshot) + Send + Sync>;

/// Handle returned by [`LedgerStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Per-resource "another context wrote this" markers set from adapter callbacks.
#[derive(Default)]
struct StaleFlags {
    categories: AtomicBool,
    transactions: AtomicBool,
}

impl StaleFlags {
    fn flag(&self, key: ResourceKey) -> &AtomicBool {
        match key {
            ResourceKey::Categories => &self.categories,
            ResourceKey::Transactions => &self.transactions,
        }
    }

    fn mark(&self, key: ResourceKey) {
        self.flag(key).store(true, Ordering::SeqCst);
    }

    fn take(&self, key: ResourceKey) -> bool {
        self.flag(key).swap(false, Ordering::SeqCst)
    }

    fn any(&self) -> bool {
        ResourceKey::ALL
            .iter()
            .any(|key| self.flag(*key).load(Ordering::SeqCst))
    }
}

/// Owns the category and transaction collections and keeps them consistent.
///
/// Every successful mutation writes the affected collection once through the
/// injected [`PersistenceAdapter`], then publishes a [`LedgerSnapshot`] to
/// subscribers. Rejected operations leave both memory and storage untouched.
pub struct LedgerStore {
    storage: Arc<dyn PersistenceAdapter>,
    categories: Vec<Category>,
    transactions: Vec<Transaction>,
    next_transaction_id: u64,
    stale: Arc<StaleFlags>,
    listeners: Vec<(SubscriptionId, SnapshotListener)>,
    next_subscription: u64,
}

impl LedgerStore {
    /// Loads both collections from `storage` and starts watching them for
    /// changes made by other contexts. Unreadable data degrades to an empty
    /// ledger holding only the fallback category.
    pub fn open(storage: Arc<dyn PersistenceAdapter>) -> Self {
        let stale = Arc::new(StaleFlags::default());
        for key in ResourceKey::ALL {
            let flags = Arc::clone(&stale);
            storage.on_external_change(key, Arc::new(move |changed| flags.mark(changed)));
        }

        let mut store = Self {
            categories: load_categories(storage.as_ref()),
            transactions: storage::load_collection(storage.as_ref(), ResourceKey::Transactions),
            storage,
            next_transaction_id: 1,
            stale,
            listeners: Vec::new(),
            next_subscription: 1,
        };
        store.reconcile();
        tracing::info!(
            categories = store.categories.len(),
            transactions = store.transactions.len(),
            "ledger store opened"
        );
        store
    }

    /// Opens a store over the JSON files in the configured data directory.
    /// Writes from other instances surface through
    /// [`LedgerStore::poll_external_changes`] or the next mutation.
    pub fn open_with_config(config: &LedgerConfig) -> Result<Self> {
        let storage = JsonFileStorage::new(Some(config.resolve_data_dir()))?;
        Ok(Self::open(Arc::new(storage)))
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|category| &category.id == id)
    }

    pub fn transaction(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    /// Copies the current state for the reporting services.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot::new(self.categories.clone(), self.transactions.clone())
    }

    /// Creates a category whose id is derived from `label`.
    pub fn add_category(
        &mut self,
        label: &str,
        kind: EntryKind,
        limit: Option<f64>,
    ) -> Result<Category> {
        self.refresh();
        let category = Category::new(label, kind).with_limit(limit);
        if category.label.is_empty() || category.id.is_empty() {
            return Err(ValidationError::MissingField("label").into());
        }
        if let Some(limit) = limit {
            if !limit.is_finite() || limit <= 0.0 {
                return Err(ValidationError::InvalidLimit(limit).into());
            }
        }
        if category.id.is_legacy_reserved() {
            return Err(ConflictError::ProtectedCategory(category.id).into());
        }
        if self.category(&category.id).is_some() {
            return Err(ConflictError::DuplicateCategory(category.id).into());
        }

        let mut next = self.categories.clone();
        let fallback_at = next
            .iter()
            .position(Category::is_fallback)
            .unwrap_or(next.len());
        next.insert(fallback_at, category.clone());
        self.persist(ResourceKey::Categories, &next)?;
        self.categories = next;

        tracing::debug!(category = %category.id, kind = %category.kind, "category added");
        self.publish();
        Ok(category)
    }

    /// Deletes an unused, non-reserved category.
    pub fn remove_category(&mut self, id: &CategoryId) -> Result<()> {
        self.refresh();
        if id.is_fallback() {
            return Err(ConflictError::ProtectedCategory(id.clone()).into());
        }
        if self.category(id).is_none() {
            return Err(ValidationError::UnknownCategory(id.clone()).into());
        }
        let references = self.transactions.iter().filter(|txn| txn.belongs_to(id)).count();
        if references > 0 {
            return Err(ConflictError::CategoryInUse {
                id: id.clone(),
                references,
            }
            .into());
        }

        let next: Vec<Category> = self
            .categories
            .iter()
            .filter(|category| &category.id != id)
            .cloned()
            .collect();
        self.persist(ResourceKey::Categories, &next)?;
        self.categories = next;

        tracing::debug!(category = %id, "category removed");
        self.publish();
        Ok(())
    }

    /// Validates and records a transaction, returning the stored record.
    pub fn add_transaction(&mut self, draft: NewTransaction) -> Result<Transaction> {
        self.refresh();
        let transaction = self.validate(draft)?;

        let mut next = self.transactions.clone();
        next.push(transaction.clone());
        self.persist(ResourceKey::Transactions, &next)?;
        self.transactions = next;
        // At the top of the range the next allocation falls back to a free id.
        self.next_transaction_id = transaction.id.0.saturating_add(1);

        tracing::debug!(
            transaction = %transaction.id,
            category = %transaction.category,
            amount = transaction.amount,
            "transaction added"
        );
        self.publish();
        Ok(transaction)
    }

    /// Removes a transaction; unknown ids are ignored.
    pub fn remove_transaction(&mut self, id: TransactionId) -> Result<()> {
        self.refresh();
        if self.transaction(id).is_none() {
            tracing::debug!(transaction = %id, "remove skipped, transaction not present");
            return Ok(());
        }

        let next: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|txn| txn.id != id)
            .cloned()
            .collect();
        self.persist(ResourceKey::Transactions, &next)?;
        self.transactions = next;

        tracing::debug!(transaction = %id, "transaction removed");
        self.publish();
        Ok(())
    }

    /// Registers a listener that receives a snapshot after every change.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&LedgerSnapshot) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Whether another context has rewritten a collection since it was last read.
    pub fn is_stale(&self) -> bool {
        self.stale.any()
    }

    /// Asks the adapter to look for writes from other contexts, marking the
    /// affected collections stale. Call [`LedgerStore::refresh`] to reload them.
    pub fn poll_external_changes(&self) -> Result<Vec<ResourceKey>> {
        self.storage.poll_external_changes().map_err(LedgerError::Storage)
    }

    /// Polls the adapter, then re-reads every collection flagged stale,
    /// replacing the in-memory copy. Returns `true` when anything was reloaded.
    pub fn refresh(&mut self) -> bool {
        if let Err(err) = self.storage.poll_external_changes() {
            tracing::warn!(error = %err, "polling storage for external changes failed");
        }
        let mut reloaded = Vec::new();
        if self.stale.take(ResourceKey::Categories) {
            self.categories = load_categories(self.storage.as_ref());
            reloaded.push(ResourceKey::Categories);
        }
        if self.stale.take(ResourceKey::Transactions) {
            self.transactions =
                storage::load_collection(self.storage.as_ref(), ResourceKey::Transactions);
            reloaded.push(ResourceKey::Transactions);
        }
        if reloaded.is_empty() {
            return false;
        }
        self.reconcile();
        tracing::info!(resources = ?reloaded, "reloaded ledger after external change");
        self.publish();
        true
    }

    fn validate(&self, draft: NewTransaction) -> Result<Transaction> {
        if !draft.amount.is_finite() || draft.amount <= 0.0 {
            return Err(ValidationError::InvalidAmount(draft.amount).into());
        }
        let description = draft.description.trim();
        if description.is_empty() {
            return Err(ValidationError::MissingField("description").into());
        }
        if draft.date.trim().is_empty() {
            return Err(ValidationError::MissingField("date").into());
        }
        let date = parse_entry_date(&draft.date)
            .ok_or_else(|| ValidationError::InvalidDate(draft.date.clone()))?;
        if self.category(&draft.category).is_none() {
            return Err(ValidationError::UnknownCategory(draft.category).into());
        }

        Ok(Transaction {
            id: self.allocate_id()?,
            kind: draft.kind,
            amount: draft.amount,
            description: description.to_string(),
            date,
            category: draft.category,
            created_at: Some(Utc::now()),
        })
    }

    fn allocate_id(&self) -> Result<TransactionId> {
        let candidate = TransactionId(self.next_transaction_id);
        if self.transaction(candidate).is_none() {
            return Ok(candidate);
        }
        let used: HashSet<u64> = self.transactions.iter().map(|txn| txn.id.0).collect();
        let free = (1..=u64::MAX)
            .find(|id| !used.contains(id))
            .ok_or(ConflictError::TransactionIdsExhausted)?;
        tracing::warn!(transaction = free, "id counter exhausted; reusing a free id");
        Ok(TransactionId(free))
    }

    fn persist<T: serde::Serialize>(&self, key: ResourceKey, items: &[T]) -> Result<()> {
        storage::save_collection(self.storage.as_ref(), key, items).map_err(|err| {
            tracing::warn!(resource = %key, error = %err, "write rejected by storage");
            LedgerError::Storage(err)
        })
    }

    fn publish(&self) {
        if self.listeners.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for (_, listener) in &self.listeners {
            listener(&snapshot);
        }
    }

    /// Restores the invariants that loaded data cannot be trusted to hold.
    fn reconcile(&mut self) {
        let known: HashSet<CategoryId> = self
            .categories
            .iter()
            .map(|category| category.id.clone())
            .collect();
        let fallback = CategoryId::fallback();
        for txn in &mut self.transactions {
            if txn.category.is_legacy_fallback() {
                txn.category = fallback.clone();
            } else if !known.contains(&txn.category) {
                tracing::warn!(
                    transaction = %txn.id,
                    category = %txn.category,
                    "transaction references a missing category; moved to fallback"
                );
                txn.category = fallback.clone();
            }
        }

        let highest = self.transactions.iter().map(|txn| txn.id.0).max().unwrap_or(0);
        let after_highest = highest.checked_add(1).unwrap_or_else(|| {
            tracing::warn!("stored transaction ids reach the top of the id range");
            u64::MAX
        });
        self.next_transaction_id = self.next_transaction_id.max(after_highest);
    }
}

impl fmt::Debug for LedgerStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerStore")
            .field("categories", &self.categories.len())
            .field("transactions", &self.transactions.len())
            .field("next_transaction_id", &self.next_transaction_id)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Loads categories, dropping reserved (including legacy) and duplicate ids,
/// and appends the fallback category last.
fn load_categories(storage: &dyn PersistenceAdapter) -> Vec<Category> {
    let stored: Vec<Category> = storage::load_collection(storage, ResourceKey::Categories);
    let mut seen = HashSet::new();
    let mut categories: Vec<Category> = stored
        .into_iter()
        .filter(|category| {
            !category.id.is_empty()
                && !category.is_fallback()
                && !category.id.is_legacy_reserved()
        })
        .filter(|category| {
            let fresh = seen.insert(category.id.clone());
            if !fresh {
                tracing::warn!(category = %category.id, "dropping duplicate stored category");
            }
            fresh
        })
        .collect();
    categories.push(Category::fallback());
    categories
}
