pub mod aggregation_service;
pub mod limit_service;

pub use aggregation_service::{
    AggregationService, BucketKey, CategoryDetail, CategoryTotals, Granularity, SeriesPoint,
    Totals,
};
pub use limit_service::{
    CategoryLimitStatus, LimitEvaluation, LimitNotifier, LimitService, LimitState, LimitWarning,
    Threshold,
};
