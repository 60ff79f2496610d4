//! Domain types representing ledger categories.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::common::EntryKind;

/// Identifier of the reserved category that always exists and sorts last.
pub const FALLBACK_CATEGORY_ID: &str = "other";
const FALLBACK_CATEGORY_LABEL: &str = "Other";

/// Pseudo-category written by older front-ends to mean "every category".
pub(crate) const LEGACY_ALL_CATEGORY_ID: &str = "all";
/// Fallback id written by older front-ends ("Diğer").
pub(crate) const LEGACY_FALLBACK_CATEGORY_ID: &str = "diger";

/// Stable slug identifying a category, derived once from its label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct CategoryId(String);

impl CategoryId {
    /// Wraps an already-derived identifier without normalizing it.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Derives the slug for a user supplied label.
    ///
    /// Accented Latin letters are folded to ASCII, a handful of punctuation marks
    /// are dropped, the result is lowercased and every whitespace run becomes a
    /// single `-`.
    pub fn from_label(label: &str) -> Self {
        let mut slug = String::with_capacity(label.len());
        let mut pending_separator = false;
        for ch in label.trim().chars() {
            if ch.is_whitespace() {
                pending_separator = true;
                continue;
            }
            if is_dropped(ch) {
                continue;
            }
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            push_folded(&mut slug, ch);
        }
        Self(slug.trim_matches('-').to_string())
    }

    pub fn fallback() -> Self {
        Self(FALLBACK_CATEGORY_ID.to_string())
    }

    pub fn is_fallback(&self) -> bool {
        self.0 == FALLBACK_CATEGORY_ID
    }

    /// Stands in for the fallback in files written by older front-ends.
    pub(crate) fn is_legacy_fallback(&self) -> bool {
        self.0 == LEGACY_FALLBACK_CATEGORY_ID
    }

    /// Ids older front-ends reserved; never kept as user categories.
    pub(crate) fn is_legacy_reserved(&self) -> bool {
        self.0 == LEGACY_ALL_CATEGORY_ID || self.is_legacy_fallback()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CategoryId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

fn is_dropped(ch: char) -> bool {
    matches!(ch, ',' | '!' | '?' | '*' | '.' | '\'' | '’' | '/')
}

fn push_folded(slug: &mut String, ch: char) {
    // Dotted capital I lowercases to `i` plus a combining dot, so fold it first.
    if ch == 'İ' {
        slug.push('i');
        return;
    }
    for lower in ch.to_lowercase() {
        match fold_lowercase(lower) {
            Some(replacement) => slug.push_str(replacement),
            None => slug.push(lower),
        }
    }
}

fn fold_lowercase(ch: char) -> Option<&'static str> {
    let folded = match ch {
        'ı' | 'ï' | 'î' | 'í' | 'ì' | 'ỉ' | 'ị' => "i",
        'ş' => "s",
        'ç' => "c",
        'ğ' => "g",
        'ñ' => "n",
        'ö' | 'ô' | 'ó' | 'ò' | 'õ' | 'ọ' | 'ồ' | 'ố' | 'ớ' | 'ợ' => "o",
        'ü' | 'û' | 'ú' | 'ù' | 'ũ' | 'ủ' | 'ư' | 'ứ' | 'ự' => "u",
        'é' | 'è' | 'ê' | 'ë' | 'ẹ' | 'ẽ' | 'ế' | 'ề' | 'ể' | 'ễ' => "e",
        'à' | 'â' | 'ä' | 'á' | 'ã' | 'ạ' | 'ả' | 'ă' | 'ắ' | 'ặ' | 'ằ' | 'ẵ' | 'ậ' => "a",
        'ÿ' | 'ý' | 'ỳ' | 'ỵ' | 'ỷ' | 'ỹ' => "y",
        'œ' => "ae",
        _ => return None,
    };
    Some(folded)
}

/// Groups ledger activity for reporting and optional spending limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    pub label: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: EntryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<f64>,
}

fn default_kind() -> EntryKind {
    EntryKind::Expense
}

impl Category {
    pub fn new(label: impl Into<String>, kind: EntryKind) -> Self {
        let label = label.into();
        Self {
            id: CategoryId::from_label(&label),
            label: label.trim().to_string(),
            kind,
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: Option<f64>) -> Self {
        self.limit = limit;
        self
    }

    /// The reserved catch-all category.
    pub fn fallback() -> Self {
        Self {
            id: CategoryId::fallback(),
            label: FALLBACK_CATEGORY_LABEL.to_string(),
            kind: EntryKind::Expense,
            limit: None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.id.is_fallback()
    }

    /// Limit that applies to spending, present only for expense categories.
    pub fn spending_limit(&self) -> Option<f64> {
        match (self.kind, self.limit) {
            (EntryKind::Expense, Some(limit)) if limit > 0.0 => Some(limit),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_collapses_whitespace_and_case() {
        assert_eq!(CategoryId::from_label("  Eating   Out ").as_str(), "eating-out");
        assert_eq!(CategoryId::from_label("Rent").as_str(), "rent");
    }

    #[test]
    fn slug_folds_diacritics_and_drops_punctuation() {
        assert_eq!(CategoryId::from_label("Eğitim").as_str(), "egitim");
        assert_eq!(CategoryId::from_label("Ulaşım").as_str(), "ulasim");
        assert_eq!(CategoryId::from_label("İçecek").as_str(), "icecek");
        assert_eq!(CategoryId::from_label("Café, Bar!").as_str(), "cafe-bar");
        assert_eq!(CategoryId::from_label("Kids' toys / games").as_str(), "kids-toys-games");
    }

    #[test]
    fn punctuation_only_label_yields_empty_slug() {
        assert!(CategoryId::from_label(" ?! ").is_empty());
    }

    #[test]
    fn spending_limit_ignores_income_categories() {
        let salary = Category::new("Salary", EntryKind::Income).with_limit(Some(500.0));
        assert_eq!(salary.spending_limit(), None);

        let food = Category::new("Food", EntryKind::Expense).with_limit(Some(300.0));
        assert_eq!(food.spending_limit(), Some(300.0));
    }

    #[test]
    fn category_serializes_type_field() {
        let category = Category::new("Food", EntryKind::Expense).with_limit(Some(250.0));
        let json = serde_json::to_value(&category).expect("serialize");
        assert_eq!(json["id"], "food");
        assert_eq!(json["type"], "expense");
        assert_eq!(json["limit"], 250.0);

        let restored: Category = serde_json::from_value(json).expect("deserialize");
        assert_eq!(restored, category);
    }
}
