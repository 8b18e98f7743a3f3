//! Per-dimension class session metrics
//!
//! Every ratio is aggregate-then-divide: sums are taken over the group first
//! and divided once, so "fill rate" means total checked-in over total
//! capacity everywhere in the crate.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::core::group::{Group, RecordFilter, Tally, group_by};
use crate::core::period::MonthKey;
use crate::core::ratio::{pct, safe_div};
use crate::core::types::SessionRecord;

/// Dimension to group session records by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionDimension {
    #[default]
    Format,
    Class,
    Trainer,
    Location,
    DayOfWeek,
    TimeSlot,
    Month,
}

impl SessionDimension {
    pub fn label(self) -> &'static str {
        match self {
            SessionDimension::Format => "Format",
            SessionDimension::Class => "Class",
            SessionDimension::Trainer => "Trainer",
            SessionDimension::Location => "Location",
            SessionDimension::DayOfWeek => "Day",
            SessionDimension::TimeSlot => "Time",
            SessionDimension::Month => "Month",
        }
    }

    pub fn key(self, record: &SessionRecord) -> String {
        match self {
            SessionDimension::Format => record.class_format.clone(),
            SessionDimension::Class => record.cleaned_class.clone(),
            SessionDimension::Trainer => record.trainer.clone(),
            SessionDimension::Location => record.location.clone(),
            SessionDimension::DayOfWeek => record.day_of_week.clone(),
            SessionDimension::TimeSlot => record.time.clone(),
            SessionDimension::Month => record
                .date
                .map(|d| MonthKey::from_date(d).label())
                .unwrap_or_default(),
        }
    }
}

/// Parameters for [`summarize_sessions`]
#[derive(Debug, Clone, Default)]
pub struct SessionQuery {
    pub dimension: SessionDimension,
    pub filter: RecordFilter,
    /// Groups with fewer sessions are dropped after grouping
    pub min_sessions: usize,
    /// Groups with fewer total check-ins are dropped after grouping
    pub min_checked_in: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionSummary {
    pub key: String,
    pub sessions: usize,
    pub empty_sessions: usize,
    pub total_capacity: u64,
    pub total_checked_in: u64,
    pub total_booked: u64,
    pub total_late_cancelled: u64,
    pub total_non_paid: u64,
    pub total_revenue: f64,
    pub unique_trainers: usize,
    pub unique_classes: usize,
    pub fill_rate: f64,
    pub avg_attendance: f64,
    pub avg_capacity: f64,
    pub avg_revenue_per_session: f64,
    pub revenue_per_attendee: f64,
    pub revenue_per_seat: f64,
    pub booking_to_attendance_rate: f64,
    pub no_show_rate: f64,
    pub late_cancel_rate: f64,
    pub growth_potential: f64,
    pub membership_pct: f64,
    pub package_pct: f64,
    pub intro_offer_pct: f64,
    pub single_class_pct: f64,
    pub peak_day: Option<String>,
    pub peak_time: Option<String>,
    /// Relative to the other groups of the same result set
    pub efficiency_score: f64,
}

#[derive(Debug, Default)]
struct SessionAccumulator {
    sessions: usize,
    empty_sessions: usize,
    capacity: u64,
    checked_in: u64,
    booked: u64,
    late_cancelled: u64,
    non_paid: u64,
    revenue: f64,
    memberships: u64,
    packages: u64,
    intro_offers: u64,
    single_classes: u64,
    trainers: HashSet<String>,
    classes: HashSet<String>,
    by_day: Tally,
    by_time: Tally,
}

impl SessionAccumulator {
    fn add(&mut self, record: &SessionRecord) {
        self.sessions += 1;
        if record.checked_in == 0 {
            self.empty_sessions += 1;
        }
        self.capacity += u64::from(record.capacity);
        self.checked_in += u64::from(record.checked_in);
        self.booked += u64::from(record.booked);
        self.late_cancelled += u64::from(record.late_cancelled);
        self.non_paid += u64::from(record.non_paid);
        self.revenue += record.revenue;
        self.memberships += u64::from(record.memberships_used);
        self.packages += u64::from(record.packages_used);
        self.intro_offers += u64::from(record.intro_offers_used);
        self.single_classes += u64::from(record.single_classes_used);

        let trainer = record.trainer.trim();
        if !trainer.is_empty() {
            self.trainers.insert(trainer.to_string());
        }
        let class = record.cleaned_class.trim();
        if !class.is_empty() {
            self.classes.insert(class.to_string());
        }

        let attendance = f64::from(record.checked_in);
        self.by_day.add(&record.day_of_week, attendance);
        self.by_time.add(&record.time, attendance);
    }

    fn into_summary(self, key: String) -> SessionSummary {
        let sessions = self.sessions as f64;
        let capacity = self.capacity as f64;
        let checked_in = self.checked_in as f64;
        let booked = self.booked as f64;
        let avg_attendance = safe_div(checked_in, sessions);
        let avg_capacity = safe_div(capacity, sessions);
        let no_shows = (booked - checked_in).max(0.0);

        SessionSummary {
            key,
            sessions: self.sessions,
            empty_sessions: self.empty_sessions,
            total_capacity: self.capacity,
            total_checked_in: self.checked_in,
            total_booked: self.booked,
            total_late_cancelled: self.late_cancelled,
            total_non_paid: self.non_paid,
            total_revenue: self.revenue,
            unique_trainers: self.trainers.len(),
            unique_classes: self.classes.len(),
            fill_rate: pct(checked_in, capacity),
            avg_attendance,
            avg_capacity,
            avg_revenue_per_session: safe_div(self.revenue, sessions),
            revenue_per_attendee: safe_div(self.revenue, checked_in),
            revenue_per_seat: safe_div(self.revenue, capacity),
            booking_to_attendance_rate: pct(checked_in, booked),
            no_show_rate: pct(no_shows, booked),
            late_cancel_rate: pct(self.late_cancelled as f64, booked),
            growth_potential: pct(avg_capacity - avg_attendance, avg_capacity),
            membership_pct: pct(self.memberships as f64, checked_in),
            package_pct: pct(self.packages as f64, checked_in),
            intro_offer_pct: pct(self.intro_offers as f64, checked_in),
            single_class_pct: pct(self.single_classes as f64, checked_in),
            peak_day: self
                .by_day
                .peak()
                .filter(|(_, total)| *total > 0.0)
                .map(|(day, _)| day.to_string()),
            peak_time: self
                .by_time
                .peak()
                .filter(|(_, total)| *total > 0.0)
                .map(|(time, _)| time.to_string()),
            efficiency_score: 0.0,
        }
    }
}

/// Summarize one group of records (efficiency score left at 0)
pub fn summarize_group(group: &Group<'_, SessionRecord>) -> SessionSummary {
    let mut acc = SessionAccumulator::default();
    for record in &group.records {
        acc.add(record);
    }
    acc.into_summary(group.key.clone())
}

/// `fill × 0.4 + normalized revenue × 0.3 + booking rate × 0.3`
pub fn efficiency_score(fill_rate: f64, revenue_norm: f64, booking_rate: f64) -> f64 {
    fill_rate * 0.4 + revenue_norm * 0.3 + booking_rate * 0.3
}

/// Score every row against the best average revenue per session among them
pub fn apply_efficiency_scores(rows: &mut [SessionSummary]) {
    let max_revenue = rows
        .iter()
        .map(|r| r.avg_revenue_per_session)
        .fold(0.0_f64, f64::max);

    for row in rows.iter_mut() {
        let revenue_norm = pct(row.avg_revenue_per_session, max_revenue);
        row.efficiency_score =
            efficiency_score(row.fill_rate, revenue_norm, row.booking_to_attendance_rate);
    }
}

/// Group, summarize and score session records.
///
/// Rows come back in first-occurrence order of their key; sort them with
/// [`crate::core::rank_sessions`].
pub fn summarize_sessions(records: &[SessionRecord], query: &SessionQuery) -> Vec<SessionSummary> {
    let scoped = query.filter.apply(records);
    let dimension = query.dimension;

    let mut rows: Vec<SessionSummary> = group_by(&scoped, |r| dimension.key(r))
        .iter()
        .map(summarize_group)
        .filter(|s| s.sessions >= query.min_sessions && s.total_checked_in >= query.min_checked_in)
        .collect();

    apply_efficiency_scores(&mut rows);
    rows
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn session(format: &str, capacity: u32, checked_in: u32, booked: u32, revenue: f64) -> SessionRecord {
        SessionRecord {
            class_format: format.into(),
            capacity,
            checked_in,
            booked,
            revenue,
            ..Default::default()
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn zero_capacity_group_reports_zero_fill_rate() {
        let records = vec![session("Barre", 0, 0, 0, 0.0)];
        let rows = summarize_sessions(&records, &SessionQuery::default());
        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert_eq!(r.fill_rate, 0.0);
        assert_eq!(r.revenue_per_attendee, 0.0);
        assert_eq!(r.booking_to_attendance_rate, 0.0);
        assert_eq!(r.no_show_rate, 0.0);
        assert_eq!(r.growth_potential, 0.0);
        assert_eq!(r.membership_pct, 0.0);
        assert_eq!(r.efficiency_score, 0.0);
        assert!(r.revenue_per_seat.is_finite());
    }

    #[test]
    fn ratios_are_aggregate_then_divide() {
        let records = vec![
            session("Cycle", 10, 10, 12, 100.0),
            session("Cycle", 30, 6, 8, 20.0),
        ];
        let r = &summarize_sessions(&records, &SessionQuery::default())[0];
        assert_eq!(r.sessions, 2);
        assert_eq!(r.total_capacity, 40);
        assert_eq!(r.total_checked_in, 16);
        assert_eq!(r.fill_rate, 40.0);
        assert_eq!(r.avg_revenue_per_session, 60.0);
        assert_eq!(r.revenue_per_attendee, 7.5);
        assert_eq!(r.revenue_per_seat, 3.0);
        assert_eq!(r.booking_to_attendance_rate, 80.0);
        assert_eq!(r.no_show_rate, 20.0);
        assert_eq!(r.avg_attendance, 8.0);
        assert_eq!(r.avg_capacity, 20.0);
        assert_eq!(r.growth_potential, 60.0);
    }

    #[test]
    fn payment_mix_percentages() {
        let mut rec = session("Mat", 20, 10, 10, 0.0);
        rec.memberships_used = 5;
        rec.packages_used = 2;
        rec.intro_offers_used = 2;
        rec.single_classes_used = 1;
        let r = &summarize_sessions(&[rec], &SessionQuery::default())[0];
        assert_eq!(r.membership_pct, 50.0);
        assert_eq!(r.package_pct, 20.0);
        assert_eq!(r.intro_offer_pct, 20.0);
        assert_eq!(r.single_class_pct, 10.0);
    }

    #[test]
    fn efficiency_score_example() {
        assert!(approx(efficiency_score(80.0, 100.0, 90.0), 89.0));
    }

    #[test]
    fn efficiency_score_single_group_uses_itself_as_max() {
        // fill 80, booking rate 90, revenue is the dataset max
        let records = vec![session("HIIT", 90, 72, 80, 500.0)];
        let rows = summarize_sessions(&records, &SessionQuery::default());
        assert!(approx(rows[0].efficiency_score, 89.0));
    }

    #[test]
    fn efficiency_is_relative_to_result_set() {
        let records = vec![
            session("A", 10, 10, 10, 200.0),
            session("B", 10, 10, 10, 100.0),
        ];
        let rows = summarize_sessions(&records, &SessionQuery::default());
        assert!(approx(rows[0].efficiency_score, 100.0));
        assert!(approx(rows[1].efficiency_score, 40.0 + 15.0 + 30.0));

        let only_b = summarize_sessions(&records[1..], &SessionQuery::default());
        assert!(approx(only_b[0].efficiency_score, 100.0));
    }

    #[test]
    fn min_sessions_filter_applies_before_scoring() {
        let records = vec![
            session("A", 10, 10, 10, 900.0),
            session("B", 10, 5, 10, 100.0),
            session("B", 10, 5, 10, 100.0),
        ];
        let query = SessionQuery {
            min_sessions: 2,
            ..Default::default()
        };
        let rows = summarize_sessions(&records, &query);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, "B");
        // B is now the revenue max: 50*0.4 + 100*0.3 + 50*0.3
        assert!(approx(rows[0].efficiency_score, 65.0));
    }

    #[test]
    fn min_checked_in_filter() {
        let records = vec![session("A", 10, 1, 1, 0.0), session("B", 10, 9, 9, 0.0)];
        let query = SessionQuery {
            min_checked_in: 5,
            ..Default::default()
        };
        let rows = summarize_sessions(&records, &query);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, "B");
    }

    #[test]
    fn blank_dimension_goes_to_unknown_and_counts_match() {
        let records = vec![
            session("A", 10, 1, 1, 0.0),
            session("", 10, 1, 1, 0.0),
            session("A", 10, 1, 1, 0.0),
        ];
        let rows = summarize_sessions(&records, &SessionQuery::default());
        let total: usize = rows.iter().map(|r| r.sessions).sum();
        assert_eq!(total, 3);
        assert!(rows.iter().any(|r| r.key == "Unknown" && r.sessions == 1));
    }

    #[test]
    fn peaks_and_empty_sessions() {
        let mut mon = session("A", 10, 4, 4, 0.0);
        mon.day_of_week = "Monday".into();
        mon.time = "07:00".into();
        let mut tue = session("A", 10, 9, 9, 0.0);
        tue.day_of_week = "Tuesday".into();
        tue.time = "18:00".into();
        let mut empty = session("A", 10, 0, 2, 0.0);
        empty.day_of_week = "Monday".into();
        empty.time = "18:00".into();
        let r = &summarize_sessions(&[mon, tue, empty], &SessionQuery::default())[0];
        assert_eq!(r.peak_day.as_deref(), Some("Tuesday"));
        assert_eq!(r.peak_time.as_deref(), Some("18:00"));
        assert_eq!(r.empty_sessions, 1);
    }

    #[test]
    fn group_by_month_dimension() {
        let mut jan = session("A", 10, 5, 5, 0.0);
        jan.date = NaiveDate::from_ymd_opt(2025, 1, 10);
        let mut feb = session("A", 10, 5, 5, 0.0);
        feb.date = NaiveDate::from_ymd_opt(2025, 2, 10);
        let undated = session("A", 10, 5, 5, 0.0);
        let query = SessionQuery {
            dimension: SessionDimension::Month,
            ..Default::default()
        };
        let rows = summarize_sessions(&[jan, feb, undated], &query);
        let keys: Vec<_> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, ["Jan 2025", "Feb 2025", "Unknown"]);
    }

    #[test]
    fn record_filter_narrows_before_grouping() {
        let mut a = session("A", 10, 5, 5, 0.0);
        a.trainer = "Zoe".into();
        let mut b = session("A", 10, 5, 5, 0.0);
        b.trainer = "Max".into();
        let query = SessionQuery {
            dimension: SessionDimension::Trainer,
            filter: RecordFilter {
                trainers: vec!["zoe".into()],
                ..Default::default()
            },
            ..Default::default()
        };
        let rows = summarize_sessions(&[a, b], &query);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, "Zoe");
        assert_eq!(rows[0].unique_trainers, 1);
    }
}
