use serde::{Deserialize, Serialize};

use crate::domain::category::{Category, CategoryId};
use crate::domain::transaction::Transaction;

/// Point-in-time copy of the ledger handed to the pure reporting services.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LedgerSnapshot {
    pub categories: Vec<Category>,
    pub transactions: Vec<Transaction>,
}

impl LedgerSnapshot {
    pub fn new(categories: Vec<Category>, transactions: Vec<Transaction>) -> Self {
        Self {
            categories,
            transactions,
        }
    }

    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|category| &category.id == id)
    }

    pub fn transactions_in<'a>(
        &'a self,
        category: &'a CategoryId,
    ) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.transactions
            .iter()
            .filter(move |txn| txn.belongs_to(category))
    }

    pub fn transaction_count(&self, category: &CategoryId) -> usize {
        self.transactions_in(category).count()
    }
}
