mod common;

use std::cell::RefCell;

use common::{memory_store, seed};
use ledger_core::{
    core::services::{BucketKey, LimitState, LimitWarning},
    AggregationService, CategoryId, EntryKind, Granularity, LedgerConfig, LimitService, NewTransaction,
    ReportLocale, Threshold,
};

#[test]
fn two_category_example_totals_and_months() {
    let (mut store, _storage) = memory_store();
    store.add_category("catA", EntryKind::Expense, None).unwrap();
    store.add_category("catB", EntryKind::Expense, None).unwrap();
    for draft in [
        NewTransaction::expense(100.0, "first", "2024-01-05", "cata"),
        NewTransaction::income(50.0, "second", "2024-01-20", "cata"),
        NewTransaction::expense(30.0, "third", "2024-02-01", "catb"),
    ] {
        store.add_transaction(draft).unwrap();
    }
    let snapshot = store.snapshot();

    let rows = AggregationService::category_totals(&snapshot);
    let cat_a = &rows[0];
    assert_eq!((cat_a.income, cat_a.expense, cat_a.net), (50.0, 100.0, -50.0));
    let cat_b = &rows[1];
    assert_eq!((cat_b.income, cat_b.expense, cat_b.net), (0.0, 30.0, -30.0));

    let series = AggregationService::time_series(&snapshot.transactions, Granularity::Monthly);
    let points: Vec<(&str, f64)> = series
        .iter()
        .map(|p| (p.bucket_label.as_str(), p.net))
        .collect();
    assert_eq!(points, vec![("January 2024", -50.0), ("February 2024", -30.0)]);
}

#[test]
fn totals_and_category_rows_follow_the_store() {
    let (mut store, _storage) = memory_store();
    seed(&mut store);
    let snapshot = store.snapshot();

    let totals = AggregationService::totals(&snapshot.transactions);
    assert_eq!(totals.income, 6000.0);
    assert_eq!(totals.expense, 215.0);
    assert_eq!(totals.net, 5785.0);

    let rows = AggregationService::category_totals(&snapshot);
    let ids: Vec<&str> = rows.iter().map(|row| row.category_id.as_str()).collect();
    assert_eq!(ids, vec!["groceries", "salary", "other"]);
    assert_eq!(rows[0].expense, 170.0);
    assert_eq!(rows[1].net, 6000.0);
    assert_eq!(rows[2].net, -45.0);
}

#[test]
fn monthly_series_is_chronological_and_localized() {
    let (mut store, _storage) = memory_store();
    seed(&mut store);
    store
        .add_transaction(NewTransaction::expense(12.0, "Old receipt", "2023-12-30", "other"))
        .unwrap();
    let snapshot = store.snapshot();

    let english = AggregationService::time_series(&snapshot.transactions, Granularity::Monthly);
    let labels: Vec<&str> = english.iter().map(|p| p.bucket_label.as_str()).collect();
    assert_eq!(labels, vec!["December 2023", "March 2024", "April 2024"]);
    assert_eq!(english[1].income, 3000.0);
    assert_eq!(english[1].expense, 170.0);

    let config = LedgerConfig {
        locale: ReportLocale::Tr,
        ..LedgerConfig::default()
    };
    let turkish = AggregationService::time_series_localized(
        &snapshot.transactions,
        Granularity::Monthly,
        config.locale,
    );
    assert_eq!(turkish[1].bucket_label, "Mart 2024");
    assert_eq!(turkish[1].key, english[1].key);

    let yearly = AggregationService::time_series(&snapshot.transactions, Granularity::Yearly);
    let keys: Vec<BucketKey> = yearly.iter().map(|p| p.key).collect();
    assert_eq!(keys, vec![BucketKey::Year(2023), BucketKey::Year(2024)]);
}

#[test]
fn category_details_rank_busiest_first() {
    let (mut store, _storage) = memory_store();
    seed(&mut store);
    let details = AggregationService::category_details(&store.snapshot());

    let order: Vec<(&str, usize)> = details
        .iter()
        .map(|d| (d.id.as_str(), d.count))
        .collect();
    assert_eq!(order, vec![("groceries", 2), ("salary", 2), ("other", 1)]);
    assert_eq!(details[0].avg_amount, 85.0);
    let usage = details[0].limit_usage_percent.unwrap();
    assert!((usage - 85.0).abs() < 1e-9);
    assert_eq!(details[1].limit_usage_percent, None);
}

#[test]
fn limit_state_tracks_configured_threshold() {
    let (mut store, _storage) = memory_store();
    seed(&mut store);
    let snapshot = store.snapshot();
    let groceries = snapshot.category(&CategoryId::new("groceries")).unwrap();

    let default = LedgerConfig::default();
    let result = LimitService::evaluate(&snapshot.transactions, groceries, default.threshold());
    assert_eq!(result.state, LimitState::Warning);
    assert!((result.percentage - 85.0).abs() < 1e-9);

    let relaxed = Threshold::new(90.0).unwrap();
    let result = LimitService::evaluate(&snapshot.transactions, groceries, relaxed);
    assert_eq!(result.state, LimitState::Ok);
}

#[test]
fn warnings_report_overspent_categories() {
    let (mut store, _storage) = memory_store();
    seed(&mut store);
    store
        .add_transaction(NewTransaction::expense(40.0, "Party", "2024-04-20", "groceries"))
        .unwrap();
    let snapshot = store.snapshot();

    let warnings = LimitService::warnings(&snapshot, Threshold::DEFAULT);
    assert_eq!(warnings.len(), 1);
    let warning = &warnings[0];
    assert_eq!(warning.category_id, CategoryId::new("groceries"));
    assert!((warning.percentage - 105.0).abs() < 1e-9);
    assert!((warning.remaining + 10.0).abs() < 1e-9);

    let statuses = LimitService::evaluate_all(&snapshot, Threshold::DEFAULT);
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].spent, 210.0);
}

#[test]
fn notifier_is_called_on_each_warning_evaluation() {
    let (mut store, _storage) = memory_store();
    seed(&mut store);
    let snapshot = store.snapshot();
    let groceries = snapshot.category(&CategoryId::new("groceries")).unwrap();
    let salary = snapshot.category(&CategoryId::new("salary")).unwrap();

    let received: RefCell<Vec<String>> = RefCell::new(Vec::new());
    let notifier = |warning: &LimitWarning| received.borrow_mut().push(warning.category_label.clone());

    for _ in 0..2 {
        LimitService::notify_if_warning(&snapshot.transactions, groceries, Threshold::DEFAULT, &notifier);
        LimitService::notify_if_warning(&snapshot.transactions, salary, Threshold::DEFAULT, &notifier);
    }
    assert_eq!(*received.borrow(), vec!["Groceries", "Groceries"]);
}
