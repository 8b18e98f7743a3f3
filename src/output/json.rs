//! JSON report builders
//!
//! Every report is one pretty-printed object on stdout; diagnostics stay on
//! stderr so the output can be piped straight into other tools.

use chrono::NaiveDate;
use serde_json::{Value, json};

use studiostats::core::{
    CancellationPeaks, CancellationSummary, FunnelMonth, LeadSummary, PeriodComparison,
    QuadrantMatrix, RepeatCanceller, SalesMonth, SalesSummary, Segment, SessionMonth,
    SessionSummary,
};

use crate::cli::SortOrder;
use crate::output::format::to_json;
use crate::output::members::MemberRow;
use crate::output::period::ordered;

pub(crate) fn classes_json(rows: &[SessionSummary], dimension: &str, sort: &str) -> String {
    to_json(&json!({
        "dimension": dimension,
        "sort": sort,
        "groups": rows,
    }))
}

pub(crate) fn formats_json(matrix: &QuadrantMatrix, rows: &[SessionSummary]) -> String {
    to_json(&json!({
        "x_axis": "avg_revenue_per_session",
        "y_axis": "avg_attendance",
        "x_median": matrix.x_median,
        "y_median": matrix.y_median,
        "quadrants": matrix.assignments,
        "formats": rows,
    }))
}

pub(crate) fn sales_json(rows: &[SalesSummary], dimension: &str) -> String {
    let revenue: f64 = rows.iter().map(|r| r.revenue).sum();
    let transactions: usize = rows.iter().map(|r| r.transactions).sum();
    to_json(&json!({
        "dimension": dimension,
        "groups": rows,
        "totals": {
            "transactions": transactions,
            "revenue": revenue,
        },
    }))
}

pub(crate) struct TrendsJson<'a> {
    pub(crate) sessions: &'a [SessionMonth],
    pub(crate) sales: &'a [SalesMonth],
    pub(crate) session_changes: &'a [PeriodComparison],
    pub(crate) sales_changes: &'a [PeriodComparison],
    pub(crate) year_over_year: bool,
    pub(crate) active_members: usize,
    pub(crate) as_of: NaiveDate,
}

pub(crate) fn trends_json(data: &TrendsJson<'_>, order: SortOrder) -> String {
    let comparison = if data.year_over_year {
        "year_over_year"
    } else {
        "month_over_month"
    };
    to_json(&json!({
        "as_of": data.as_of,
        "months": data.sessions.len(),
        "comparison": comparison,
        "active_members": data.active_members,
        "sessions": ordered(data.sessions, order),
        "sales": ordered(data.sales, order),
        "session_changes": ordered(data.session_changes, order),
        "sales_changes": ordered(data.sales_changes, order),
    }))
}

pub(crate) fn funnel_json(
    rows: &[LeadSummary],
    dimension: &str,
    months: &[FunnelMonth],
    changes: &[PeriodComparison],
    order: SortOrder,
) -> String {
    to_json(&json!({
        "dimension": dimension,
        "groups": rows,
        "months": ordered(months, order),
        "changes": ordered(changes, order),
    }))
}

pub(crate) fn cancellations_json(
    groups: &[CancellationSummary],
    dimension: &str,
    peaks: &CancellationPeaks,
    repeaters: &[RepeatCanceller],
    correlation: Option<f64>,
) -> String {
    let total: usize = groups.iter().map(|g| g.cancellations).sum();
    to_json(&json!({
        "dimension": dimension,
        "total": total,
        "groups": groups,
        "peaks": peaks,
        "repeat_cancellers": repeaters,
        "booking_cancellation_correlation": correlation,
    }))
}

pub(crate) fn members_json(
    rows: &[MemberRow],
    counts: &[(Segment, usize)],
    as_of: NaiveDate,
) -> String {
    let segments: serde_json::Map<String, Value> = counts
        .iter()
        .map(|(segment, n)| (segment.label().to_string(), json!(n)))
        .collect();
    to_json(&json!({
        "as_of": as_of,
        "segments": segments,
        "members": rows,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use studiostats::core::{MonthKey, month_over_month};

    fn month(y: i32, m: u32, revenue: f64) -> SessionMonth {
        SessionMonth {
            month: MonthKey::new(y, m).unwrap(),
            sessions: 1,
            capacity: 10,
            checked_in: 5,
            booked: 6,
            revenue,
            fill_rate: 50.0,
            avg_attendance: 5.0,
            revenue_per_session: revenue,
        }
    }

    #[test]
    fn trends_json_orders_months() {
        let sessions = vec![month(2025, 1, 100.0), month(2025, 2, 150.0)];
        let changes = month_over_month(&sessions);
        let data = TrendsJson {
            sessions: &sessions,
            sales: &[],
            session_changes: &changes,
            sales_changes: &[],
            year_over_year: false,
            active_members: 3,
            as_of: NaiveDate::from_ymd_opt(2025, 2, 20).unwrap(),
        };

        let value: Value = serde_json::from_str(&trends_json(&data, SortOrder::Desc)).unwrap();
        assert_eq!(value["as_of"], "2025-02-20");
        assert_eq!(value["comparison"], "month_over_month");
        assert_eq!(value["sessions"][0]["month"], "Feb 2025");
        assert_eq!(value["session_changes"][0]["current"], "Feb 2025");
        assert_eq!(value["session_changes"][0]["deltas"][0]["metric"], "sessions");
    }

    #[test]
    fn sales_json_totals() {
        let value: Value = serde_json::from_str(&sales_json(&[], "product")).unwrap();
        assert_eq!(value["dimension"], "product");
        assert_eq!(value["totals"]["transactions"], 0);
        assert!(value["groups"].as_array().unwrap().is_empty());
    }

    #[test]
    fn members_json_lists_every_segment() {
        let counts = vec![(Segment::HighValue, 2), (Segment::AtRisk, 1)];
        let as_of = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let value: Value = serde_json::from_str(&members_json(&[], &counts, as_of)).unwrap();
        assert_eq!(value["segments"]["high-value"], 2);
        assert_eq!(value["segments"]["at-risk"], 1);
    }
}
