//! Trend direction, churn risk and metric correlation

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::consts::{MAX_TREND_WINDOW_MONTHS, TREND_WINDOW_MONTHS};
use crate::core::period::{MonthKey, growth_rate, trailing_months};
use crate::core::ratio::compare_f64;
use crate::core::types::{CheckinRecord, SessionRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Stable,
    Declining,
}

impl TrendDirection {
    pub fn label(self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Stable => "stable",
            TrendDirection::Declining => "declining",
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct TrendThresholds {
    /// Percent change beyond which a trend is flagged (both directions)
    pub change_threshold: f64,
    pub window_months: usize,
}

impl TrendThresholds {
    /// Window length in months, kept within `1..=MAX_TREND_WINDOW_MONTHS`
    pub fn window(&self) -> usize {
        self.window_months.clamp(1, MAX_TREND_WINDOW_MONTHS)
    }

    /// Bring a deserialized window back into range
    pub fn clamped(self) -> Self {
        Self {
            window_months: self.window(),
            ..self
        }
    }
}

impl Default for TrendThresholds {
    fn default() -> Self {
        Self {
            change_threshold: 15.0,
            window_months: TREND_WINDOW_MONTHS,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendReport {
    pub previous_total: f64,
    pub recent_total: f64,
    pub change_pct: f64,
    pub direction: TrendDirection,
    pub churn_risk: f64,
}

/// `min(100, max(0, decline × 2))` where decline is the negated change
pub fn churn_risk(change_pct: f64) -> f64 {
    let decline = -change_pct;
    (decline * 2.0).clamp(0.0, 100.0)
}

/// Compare the last window of `history` against the window right before it.
///
/// `history` is one value per month, oldest first; months missing from the
/// front count as zero.
pub fn trend_between_windows(history: &[f64], thresholds: &TrendThresholds) -> TrendReport {
    let window = thresholds.window();
    let take = history.len().min(window * 2);
    let tail = &history[history.len() - take..];
    let recent_len = tail.len().min(window);
    let (previous, recent) = tail.split_at(tail.len() - recent_len);

    let previous_total: f64 = previous.iter().sum();
    let recent_total: f64 = recent.iter().sum();
    let change_pct = growth_rate(previous_total, recent_total);

    let direction = if change_pct < -thresholds.change_threshold {
        TrendDirection::Declining
    } else if change_pct > thresholds.change_threshold {
        TrendDirection::Increasing
    } else {
        TrendDirection::Stable
    };

    TrendReport {
        previous_total,
        recent_total,
        change_pct,
        direction,
        churn_risk: churn_risk(change_pct),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberTrend {
    pub member_id: String,
    pub months: Vec<MonthKey>,
    pub visits: Vec<u32>,
    pub report: TrendReport,
}

/// Visit trend per member over the two windows ending at `anchor`'s month,
/// highest churn risk first
pub fn member_trends(
    checkins: &[CheckinRecord],
    anchor: NaiveDate,
    thresholds: &TrendThresholds,
) -> Vec<MemberTrend> {
    let months = trailing_months(anchor, thresholds.window() * 2);
    let position: HashMap<MonthKey, usize> =
        months.iter().enumerate().map(|(i, m)| (*m, i)).collect();

    let mut visits: HashMap<String, Vec<u32>> = HashMap::new();
    for checkin in checkins {
        let id = checkin.member_id.trim();
        let Some(date) = checkin.date else { continue };
        let Some(&slot) = position.get(&MonthKey::from_date(date)) else {
            continue;
        };
        if id.is_empty() {
            continue;
        }
        let series = visits
            .entry(id.to_string())
            .or_insert_with(|| vec![0; months.len()]);
        if checkin.checked_in {
            series[slot] += 1;
        }
    }

    let mut trends: Vec<MemberTrend> = visits
        .into_iter()
        .map(|(member_id, series)| {
            let history: Vec<f64> = series.iter().map(|v| f64::from(*v)).collect();
            MemberTrend {
                member_id,
                months: months.clone(),
                report: trend_between_windows(&history, thresholds),
                visits: series,
            }
        })
        .collect();

    trends.sort_by(|a, b| {
        compare_f64(b.report.churn_risk, a.report.churn_risk)
            .then_with(|| a.member_id.cmp(&b.member_id))
    });
    trends
}

/// Pearson correlation coefficient; 0 for empty, mismatched or constant input
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.is_empty() || xs.len() != ys.len() {
        return 0.0;
    }
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denominator = (var_x * var_y).sqrt();
    if denominator > 0.0 {
        cov / denominator
    } else {
        0.0
    }
}

/// Correlation between bookings and late cancellations across sessions
pub fn booking_cancellation_correlation(sessions: &[SessionRecord]) -> f64 {
    let booked: Vec<f64> = sessions.iter().map(|s| f64::from(s.booked)).collect();
    let cancelled: Vec<f64> = sessions
        .iter()
        .map(|s| f64::from(s.late_cancelled))
        .collect();
    pearson(&booked, &cancelled)
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn oversized_window_is_capped() {
        let thresholds = TrendThresholds {
            window_months: usize::MAX,
            ..TrendThresholds::default()
        };
        assert_eq!(thresholds.window(), 12);
        let checkins = vec![CheckinRecord {
            member_id: "m1".into(),
            date: Some(d(2025, 6, 2)),
            checked_in: true,
            ..Default::default()
        }];
        let trends = member_trends(&checkins, d(2025, 6, 15), &thresholds);
        assert_eq!(trends[0].months.len(), 24);
    }

    #[test]
    fn declining_trend_sets_churn_risk() {
        let history = [10.0, 10.0, 10.0, 6.0, 6.0, 6.0];
        let report = trend_between_windows(&history, &TrendThresholds::default());
        assert_eq!(report.previous_total, 30.0);
        assert_eq!(report.recent_total, 18.0);
        assert_eq!(report.change_pct, -40.0);
        assert_eq!(report.direction, TrendDirection::Declining);
        assert_eq!(report.churn_risk, 80.0);
    }

    #[test]
    fn increasing_trend_has_no_churn_risk() {
        let history = [5.0, 5.0, 0.0, 6.0, 6.0, 6.0];
        let report = trend_between_windows(&history, &TrendThresholds::default());
        assert_eq!(report.direction, TrendDirection::Increasing);
        assert_eq!(report.churn_risk, 0.0);
    }

    #[test]
    fn small_change_is_stable() {
        let history = [10.0, 10.0, 10.0, 9.0, 9.0, 9.0];
        let report = trend_between_windows(&history, &TrendThresholds::default());
        assert_eq!(report.change_pct, -10.0);
        assert_eq!(report.direction, TrendDirection::Stable);
        assert_eq!(report.churn_risk, 20.0);
    }

    #[test]
    fn churn_risk_is_clamped() {
        assert_eq!(churn_risk(-75.0), 100.0);
        assert_eq!(churn_risk(-100.0), 100.0);
        assert_eq!(churn_risk(30.0), 0.0);
    }

    #[test]
    fn only_last_two_windows_count() {
        let history = [100.0, 100.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0];
        let report = trend_between_windows(&history, &TrendThresholds::default());
        assert_eq!(report.previous_total, 3.0);
        assert_eq!(report.direction, TrendDirection::Stable);
    }

    #[test]
    fn short_history_fills_previous_with_zero() {
        let report = trend_between_windows(&[4.0, 4.0], &TrendThresholds::default());
        assert_eq!(report.previous_total, 0.0);
        assert_eq!(report.recent_total, 8.0);
        assert_eq!(report.change_pct, 100.0);
        let empty = trend_between_windows(&[], &TrendThresholds::default());
        assert_eq!(empty.change_pct, 0.0);
        assert_eq!(empty.direction, TrendDirection::Stable);
    }

    #[test]
    fn member_trends_bucket_visits_by_month() {
        let visit = |member: &str, date: NaiveDate| CheckinRecord {
            member_id: member.into(),
            date: Some(date),
            checked_in: true,
            ..Default::default()
        };
        let mut checkins = Vec::new();
        for month in 1..=3 {
            checkins.push(visit("fading", d(2025, month, 5)));
            checkins.push(visit("fading", d(2025, month, 12)));
        }
        checkins.push(visit("fading", d(2025, 5, 5)));
        checkins.push(visit("steady", d(2025, 2, 1)));
        checkins.push(visit("steady", d(2025, 5, 1)));
        // outside the window
        checkins.push(visit("steady", d(2024, 6, 1)));

        let trends = member_trends(&checkins, d(2025, 6, 15), &TrendThresholds::default());
        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].member_id, "fading");
        assert_eq!(trends[0].visits, vec![2, 2, 2, 0, 1, 0]);
        assert_eq!(trends[0].months.len(), 6);
        assert_eq!(trends[0].report.direction, TrendDirection::Declining);
        assert_eq!(trends[1].member_id, "steady");
        assert_eq!(trends[1].report.direction, TrendDirection::Stable);
    }

    #[test]
    fn pearson_perfect_and_inverse() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert!((pearson(&xs, &[2.0, 4.0, 6.0, 8.0]) - 1.0).abs() < 1e-12);
        assert!((pearson(&xs, &[8.0, 6.0, 4.0, 2.0]) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_zero_denominator() {
        assert_eq!(pearson(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]), 0.0);
        assert_eq!(pearson(&[], &[]), 0.0);
        assert_eq!(pearson(&[1.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn booking_cancellation_correlation_from_sessions() {
        let s = |booked: u32, late: u32| SessionRecord {
            booked,
            late_cancelled: late,
            ..Default::default()
        };
        let r = booking_cancellation_correlation(&[s(10, 1), s(20, 2), s(30, 3)]);
        assert!((r - 1.0).abs() < 1e-12);
    }
}
