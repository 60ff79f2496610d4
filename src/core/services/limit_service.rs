//! Spending-limit evaluation for expense categories.

use serde::{Deserialize, Serialize};

use crate::domain::{Amounted, Category, CategoryId, LedgerSnapshot, Transaction};

/// Usage percentage at or above which a category is in warning.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Threshold(f64);

impl Threshold {
    pub const DEFAULT: Threshold = Threshold(80.0);

    /// Accepts finite, strictly positive percentages.
    pub fn new(percent: f64) -> Option<Self> {
        (percent.is_finite() && percent > 0.0).then_some(Self(percent))
    }

    pub fn percent(self) -> f64 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LimitState {
    Ok,
    Warning,
}

/// Outcome of evaluating one category against its limit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LimitEvaluation {
    pub state: LimitState,
    pub percentage: f64,
}

impl LimitEvaluation {
    const UNLIMITED: LimitEvaluation = LimitEvaluation {
        state: LimitState::Ok,
        percentage: 0.0,
    };

    pub fn is_warning(&self) -> bool {
        self.state == LimitState::Warning
    }
}

/// Payload handed to a [`LimitNotifier`] when a category crosses its threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitWarning {
    pub category_id: CategoryId,
    pub category_label: String,
    pub percentage: f64,
    pub limit: f64,
    pub spent: f64,
    /// `limit - spent`; negative once the limit is exceeded.
    pub remaining: f64,
}

/// Evaluation row produced for every limited expense category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryLimitStatus {
    pub category_id: CategoryId,
    pub category_label: String,
    pub limit: f64,
    pub spent: f64,
    pub evaluation: LimitEvaluation,
}

/// Receives one-shot limit warnings, typically the presentation layer.
pub trait LimitNotifier {
    fn limit_warning(&self, warning: &LimitWarning);
}

impl<F> LimitNotifier for F
where
    F: Fn(&LimitWarning),
{
    fn limit_warning(&self, warning: &LimitWarning) {
        self(warning)
    }
}

/// Stateless limit checks; nothing about previous warnings is remembered.
pub struct LimitService;

impl LimitService {
    /// Computes the usage percentage and state for `category`.
    pub fn evaluate(
        transactions: &[Transaction],
        category: &Category,
        threshold: Threshold,
    ) -> LimitEvaluation {
        match category.spending_limit() {
            Some(limit) => {
                let spent = Self::spent(transactions, &category.id);
                Self::classify(spent, limit, threshold)
            }
            None => LimitEvaluation::UNLIMITED,
        }
    }

    /// Same as [`LimitService::evaluate`], additionally notifying once when the
    /// category is in warning. Repeated calls notify again.
    pub fn notify_if_warning(
        transactions: &[Transaction],
        category: &Category,
        threshold: Threshold,
        notifier: &dyn LimitNotifier,
    ) -> LimitEvaluation {
        let Some(limit) = category.spending_limit() else {
            return LimitEvaluation::UNLIMITED;
        };
        let spent = Self::spent(transactions, &category.id);
        let evaluation = Self::classify(spent, limit, threshold);
        if evaluation.is_warning() {
            let warning = LimitWarning {
                category_id: category.id.clone(),
                category_label: category.label.clone(),
                percentage: evaluation.percentage,
                limit,
                spent,
                remaining: limit - spent,
            };
            tracing::debug!(
                category = %warning.category_id,
                percentage = warning.percentage,
                "limit threshold reached"
            );
            notifier.limit_warning(&warning);
        }
        evaluation
    }

    /// Evaluates every expense category that has a limit, in category order.
    pub fn evaluate_all(snapshot: &LedgerSnapshot, threshold: Threshold) -> Vec<CategoryLimitStatus> {
        snapshot
            .categories
            .iter()
            .filter_map(|category| {
                let limit = category.spending_limit()?;
                let spent = Self::spent(&snapshot.transactions, &category.id);
                Some(CategoryLimitStatus {
                    category_id: category.id.clone(),
                    category_label: category.label.clone(),
                    limit,
                    spent,
                    evaluation: Self::classify(spent, limit, threshold),
                })
            })
            .collect()
    }

    /// Categories currently at or above the threshold.
    pub fn warnings(snapshot: &LedgerSnapshot, threshold: Threshold) -> Vec<LimitWarning> {
        Self::evaluate_all(snapshot, threshold)
            .into_iter()
            .filter(|status| status.evaluation.is_warning())
            .map(|status| LimitWarning {
                percentage: status.evaluation.percentage,
                remaining: status.limit - status.spent,
                category_id: status.category_id,
                category_label: status.category_label,
                limit: status.limit,
                spent: status.spent,
            })
            .collect()
    }

    fn spent(transactions: &[Transaction], category: &CategoryId) -> f64 {
        transactions
            .iter()
            .filter(|txn| txn.belongs_to(category))
            .map(|txn| txn.expense())
            .sum()
    }

    fn classify(spent: f64, limit: f64, threshold: Threshold) -> LimitEvaluation {
        let percentage = spent / limit * 100.0;
        let state = if percentage >= threshold.percent() {
            LimitState::Warning
        } else {
            LimitState::Ok
        };
        LimitEvaluation { state, percentage }
    }
}
