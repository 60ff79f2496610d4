use std::fmt;

use serde::{Deserialize, Serialize};

/// Direction of money movement shared by categories and transactions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Income,
    Expense,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntryKind::Income => "income",
            EntryKind::Expense => "expense",
        };
        f.write_str(label)
    }
}

/// Supplies a signed view over an entry's amount so aggregations can stay generic.
pub trait Amounted {
    fn kind(&self) -> EntryKind;
    fn amount(&self) -> f64;

    fn income(&self) -> f64 {
        match self.kind() {
            EntryKind::Income => self.amount(),
            EntryKind::Expense => 0.0,
        }
    }

    fn expense(&self) -> f64 {
        match self.kind() {
            EntryKind::Income => 0.0,
            EntryKind::Expense => self.amount(),
        }
    }
}
