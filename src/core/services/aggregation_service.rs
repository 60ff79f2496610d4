//! Chart-ready aggregates computed from ledger snapshots.

use std::collections::BTreeMap;
use std::fmt;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::config::ReportLocale;
use crate::domain::{Amounted, Category, CategoryId, LedgerSnapshot, Transaction};

/// Time bucket size for [`AggregationService::time_series`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Monthly,
    Yearly,
}

/// Sortable bucket identity kept next to its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BucketKey {
    Year(i32),
    Month { year: i32, month: u32 },
}

impl BucketKey {
    fn for_entry(txn: &Transaction, granularity: Granularity) -> Self {
        match granularity {
            Granularity::Yearly => BucketKey::Year(txn.date.year()),
            Granularity::Monthly => BucketKey::Month {
                year: txn.date.year(),
                month: txn.date.month(),
            },
        }
    }

    pub fn label(&self, locale: ReportLocale) -> String {
        match self {
            BucketKey::Year(year) => year.to_string(),
            BucketKey::Month { year, month } => {
                format!("{} {}", locale.month_name(*month), year)
            }
        }
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label(ReportLocale::En))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub income: f64,
    pub expense: f64,
    pub net: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotals {
    pub category_id: CategoryId,
    pub category_label: String,
    pub income: f64,
    pub expense: f64,
    pub net: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDetail {
    pub id: CategoryId,
    pub label: String,
    pub income: f64,
    pub expense: f64,
    pub net: f64,
    pub count: usize,
    pub avg_amount: f64,
    /// Share of the limit consumed by expenses; unclamped, `None` without a limit.
    pub limit_usage_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub bucket_label: String,
    pub key: BucketKey,
    pub income: f64,
    pub expense: f64,
    pub net: f64,
}

/// Pure reporting helpers over [`LedgerSnapshot`]s and transaction slices.
pub struct AggregationService;

impl AggregationService {
    /// Income, expense and net across every transaction.
    pub fn totals(transactions: &[Transaction]) -> Totals {
        Accumulator::collect(transactions).totals()
    }

    /// One row per category in category order, zero rows included.
    pub fn category_totals(snapshot: &LedgerSnapshot) -> Vec<CategoryTotals> {
        snapshot
            .categories
            .iter()
            .map(|category| {
                let totals = Accumulator::collect(snapshot.transactions_in(&category.id)).totals();
                CategoryTotals {
                    category_id: category.id.clone(),
                    category_label: category.label.clone(),
                    income: totals.income,
                    expense: totals.expense,
                    net: totals.net,
                }
            })
            .collect()
    }

    /// Per-category statistics ranked by transaction count, busiest first.
    pub fn category_details(snapshot: &LedgerSnapshot) -> Vec<CategoryDetail> {
        let mut rows: Vec<CategoryDetail> = snapshot
            .categories
            .iter()
            .map(|category| Self::detail_for(category, snapshot))
            .collect();
        // `sort_by` is stable, so ties keep category order.
        rows.sort_by(|a, b| b.count.cmp(&a.count));
        rows
    }

    /// Monthly or yearly series with English month labels.
    pub fn time_series(transactions: &[Transaction], granularity: Granularity) -> Vec<SeriesPoint> {
        Self::time_series_localized(transactions, granularity, ReportLocale::En)
    }

    /// Monthly or yearly series, chronologically ordered by bucket key.
    pub fn time_series_localized(
        transactions: &[Transaction],
        granularity: Granularity,
        locale: ReportLocale,
    ) -> Vec<SeriesPoint> {
        Self::bucketize(transactions, granularity, locale)
    }

    /// Series restricted to the transactions of one category.
    pub fn category_time_series(
        snapshot: &LedgerSnapshot,
        category: &CategoryId,
        granularity: Granularity,
        locale: ReportLocale,
    ) -> Vec<SeriesPoint> {
        Self::bucketize(snapshot.transactions_in(category), granularity, locale)
    }

    fn detail_for(category: &Category, snapshot: &LedgerSnapshot) -> CategoryDetail {
        let acc = Accumulator::collect(snapshot.transactions_in(&category.id));
        let avg_amount = if acc.count > 0 {
            (acc.income + acc.expense) / acc.count as f64
        } else {
            0.0
        };
        CategoryDetail {
            id: category.id.clone(),
            label: category.label.clone(),
            income: acc.income,
            expense: acc.expense,
            net: acc.net(),
            count: acc.count,
            avg_amount,
            limit_usage_percent: category
                .limit
                .filter(|limit| *limit > 0.0)
                .map(|limit| acc.expense / limit * 100.0),
        }
    }

    fn bucketize<'a>(
        transactions: impl IntoIterator<Item = &'a Transaction>,
        granularity: Granularity,
        locale: ReportLocale,
    ) -> Vec<SeriesPoint> {
        let mut buckets: BTreeMap<BucketKey, Accumulator> = BTreeMap::new();
        for txn in transactions {
            buckets
                .entry(BucketKey::for_entry(txn, granularity))
                .or_default()
                .add(txn);
        }
        buckets
            .into_iter()
            .map(|(key, acc)| SeriesPoint {
                bucket_label: key.label(locale),
                key,
                income: acc.income,
                expense: acc.expense,
                net: acc.net(),
            })
            .collect()
    }
}

#[derive(Default)]
struct Accumulator {
    income: f64,
    expense: f64,
    count: usize,
}

impl Accumulator {
    fn collect<'a, T>(entries: impl IntoIterator<Item = &'a T>) -> Self
    where
        T: Amounted + 'a,
    {
        let mut acc = Self::default();
        for entry in entries {
            acc.add(entry);
        }
        acc
    }

    fn add(&mut self, entry: &impl Amounted) {
        self.income += entry.income();
        self.expense += entry.expense();
        self.count += 1;
    }

    fn net(&self) -> f64 {
        self.income - self.expense
    }

    fn totals(&self) -> Totals {
        Totals {
            income: self.income,
            expense: self.expense,
            net: self.net(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EntryKind, TransactionId};
    use chrono::NaiveDate;

    fn txn(id: u64, kind: EntryKind, amount: f64, category: &str, date: (i32, u32, u32)) -> Transaction {
        Transaction {
            id: TransactionId(id),
            kind,
            amount,
            description: format!("entry {id}"),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            category: CategoryId::new(category),
            created_at: None,
        }
    }

    #[test]
    fn empty_input_yields_empty_series_and_zero_totals() {
        assert!(AggregationService::time_series(&[], Granularity::Monthly).is_empty());
        assert_eq!(AggregationService::totals(&[]), Totals::default());
    }

    #[test]
    fn yearly_buckets_sort_numerically() {
        let txns = vec![
            txn(1, EntryKind::Income, 10.0, "a", (2025, 3, 1)),
            txn(2, EntryKind::Expense, 4.0, "a", (999, 6, 1)),
            txn(3, EntryKind::Expense, 1.0, "a", (2024, 1, 1)),
        ];
        let labels: Vec<String> = AggregationService::time_series(&txns, Granularity::Yearly)
            .into_iter()
            .map(|point| point.bucket_label)
            .collect();
        assert_eq!(labels, vec!["999", "2024", "2025"]);
    }

    #[test]
    fn monthly_buckets_ignore_label_order() {
        // Lexically "April 2024" < "December 2023" < "March 2024".
        let txns = vec![
            txn(1, EntryKind::Expense, 5.0, "a", (2024, 4, 2)),
            txn(2, EntryKind::Expense, 5.0, "a", (2024, 3, 9)),
            txn(3, EntryKind::Income, 8.0, "a", (2023, 12, 31)),
            txn(4, EntryKind::Income, 2.0, "a", (2024, 3, 20)),
        ];
        let series = AggregationService::time_series(&txns, Granularity::Monthly);
        let labels: Vec<&str> = series.iter().map(|p| p.bucket_label.as_str()).collect();
        assert_eq!(labels, vec!["December 2023", "March 2024", "April 2024"]);
        assert_eq!(series[1].net, -3.0);
        assert_eq!(series[1].income, 2.0);
        assert_eq!(series[1].expense, 5.0);
    }

    #[test]
    fn localized_labels_use_locale_month_names() {
        let txns = vec![txn(1, EntryKind::Expense, 5.0, "a", (2024, 2, 2))];
        let series =
            AggregationService::time_series_localized(&txns, Granularity::Monthly, ReportLocale::Tr);
        assert_eq!(series[0].bucket_label, "Şubat 2024");
        assert_eq!(series[0].key, BucketKey::Month { year: 2024, month: 2 });
    }

    #[test]
    fn details_rank_by_count_with_stable_ties() {
        let snapshot = LedgerSnapshot::new(
            vec![
                Category::new("A", EntryKind::Expense),
                Category::new("B", EntryKind::Expense).with_limit(Some(50.0)),
                Category::new("C", EntryKind::Expense),
                Category::fallback(),
            ],
            vec![
                txn(1, EntryKind::Expense, 30.0, "b", (2024, 1, 1)),
                txn(2, EntryKind::Expense, 45.0, "b", (2024, 1, 2)),
                txn(3, EntryKind::Income, 10.0, "c", (2024, 1, 3)),
                txn(4, EntryKind::Expense, 20.0, "a", (2024, 1, 4)),
            ],
        );
        let details = AggregationService::category_details(&snapshot);
        let order: Vec<&str> = details.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c", "other"]);

        let b = &details[0];
        assert_eq!(b.count, 2);
        assert_eq!(b.avg_amount, 37.5);
        assert_eq!(b.limit_usage_percent, Some(150.0));

        let other = &details[3];
        assert_eq!(other.count, 0);
        assert_eq!(other.avg_amount, 0.0);
        assert_eq!(other.limit_usage_percent, None);
    }

    #[test]
    fn category_series_filters_to_one_category() {
        let snapshot = LedgerSnapshot::new(
            vec![Category::new("A", EntryKind::Expense), Category::fallback()],
            vec![
                txn(1, EntryKind::Expense, 30.0, "a", (2024, 1, 1)),
                txn(2, EntryKind::Expense, 45.0, "other", (2024, 2, 2)),
            ],
        );
        let series = AggregationService::category_time_series(
            &snapshot,
            &CategoryId::new("a"),
            Granularity::Monthly,
            ReportLocale::En,
        );
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].bucket_label, "January 2024");
        assert_eq!(series[0].net, -30.0);
    }
}
