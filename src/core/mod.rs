//! Aggregation engine - pure functions over record slices

mod cancellations;
mod customers;
mod group;
mod leads;
mod period;
mod rank;
mod ratio;
mod sales;
mod sessions;
mod trend;
mod types;

pub use cancellations::{
    CancellationDimension, CancellationPeaks, CancellationSummary, RepeatCanceller,
    cancellation_peaks, repeat_cancellers, summarize_cancellations,
};
pub use customers::{
    CustomerIndex, CustomerMix, MemberProfile, Segment, SegmentThresholds, active_members,
    build_member_profiles, classify_customers, classify_segment, segment_counts,
};
pub use group::{Group, RecordFilter, Scoped, Tally, group_by, group_key};
pub use leads::{LeadDimension, LeadSummary, summarize_leads};
pub use period::{
    FunnelMonth, MetricDelta, MonthKey, MonthlyMetrics, PeriodComparison, SalesMonth,
    SessionMonth, compare, growth_rate, month_over_month, monthly_funnel, monthly_sales,
    monthly_sessions, trailing_months, year_over_year,
};
pub use rank::{
    Quadrant, QuadrantAssignment, QuadrantMatrix, SortMetric, bottom_n, classify_quadrants,
    format_quadrants, lower_median, rank_sessions, sort_desc_by, top_n,
};
pub use ratio::{compare_f64, pct, safe_div};
pub use sales::{SalesDimension, SalesSummary, summarize_sales};
pub use sessions::{
    SessionDimension, SessionQuery, SessionSummary, apply_efficiency_scores, efficiency_score,
    summarize_group, summarize_sessions,
};
pub use trend::{
    MemberTrend, TrendDirection, TrendReport, TrendThresholds, booking_cancellation_correlation,
    churn_risk, member_trends, pearson, trend_between_windows,
};
pub use types::{
    CancellationRecord, CheckinRecord, DateFilter, LeadRecord, SaleRecord, SessionRecord,
    weekday_name,
};
