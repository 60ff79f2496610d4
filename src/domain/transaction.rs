//! Ledger transactions and the unvalidated input shape accepted by the store.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::category::CategoryId;
use crate::domain::common::{Amounted, EntryKind};

/// Unique transaction identifier handed out by the store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TransactionId(pub u64);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A recorded income or expense entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub amount: f64,
    pub description: String,
    #[serde(deserialize_with = "deserialize_entry_date")]
    pub date: NaiveDate,
    pub category: CategoryId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn belongs_to(&self, category: &CategoryId) -> bool {
        &self.category == category
    }
}

impl Amounted for Transaction {
    fn kind(&self) -> EntryKind {
        self.kind
    }

    fn amount(&self) -> f64 {
        self.amount
    }
}

/// Transaction fields as submitted by a caller, validated by the store on write.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewTransaction {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub amount: f64,
    pub description: String,
    /// ISO calendar date (`YYYY-MM-DD`); a trailing time component is ignored.
    pub date: String,
    pub category: CategoryId,
}

impl NewTransaction {
    pub fn new(
        kind: EntryKind,
        amount: f64,
        description: impl Into<String>,
        date: impl Into<String>,
        category: impl Into<CategoryId>,
    ) -> Self {
        Self {
            kind,
            amount,
            description: description.into(),
            date: date.into(),
            category: category.into(),
        }
    }

    pub fn income(
        amount: f64,
        description: impl Into<String>,
        date: impl Into<String>,
        category: impl Into<CategoryId>,
    ) -> Self {
        Self::new(EntryKind::Income, amount, description, date, category)
    }

    pub fn expense(
        amount: f64,
        description: impl Into<String>,
        date: impl Into<String>,
        category: impl Into<CategoryId>,
    ) -> Self {
        Self::new(EntryKind::Expense, amount, description, date, category)
    }
}

/// Parses an ISO calendar date, or the date of a full ISO date-time.
/// Anything after the date must itself be a valid time.
pub(crate) fn parse_entry_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(stamp.naive_local().date());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|stamp| stamp.date())
}

fn deserialize_entry_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_entry_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid entry date `{raw}`")))
}
