pub mod category;
pub mod common;
pub mod snapshot;
pub mod transaction;

pub use category::{Category, CategoryId, FALLBACK_CATEGORY_ID};
pub use common::{Amounted, EntryKind};
pub use snapshot::LedgerSnapshot;
pub use transaction::{NewTransaction, Transaction, TransactionId};
