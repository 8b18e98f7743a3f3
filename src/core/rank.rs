//! Ranking, top/bottom selection and median quadrant classification

use serde::{Deserialize, Serialize};

use crate::core::ratio::compare_f64;
use crate::core::sessions::SessionSummary;

/// Numeric field a session ranking is ordered by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMetric {
    #[default]
    Revenue,
    Sessions,
    FillRate,
    RevenuePerSeat,
    RevenuePerSession,
    EmptySessions,
    Attendance,
    Efficiency,
}

impl SortMetric {
    pub fn value(self, row: &SessionSummary) -> f64 {
        match self {
            SortMetric::Revenue => row.total_revenue,
            SortMetric::Sessions => row.sessions as f64,
            SortMetric::FillRate => row.fill_rate,
            SortMetric::RevenuePerSeat => row.revenue_per_seat,
            SortMetric::RevenuePerSession => row.avg_revenue_per_session,
            SortMetric::EmptySessions => row.empty_sessions as f64,
            SortMetric::Attendance => row.total_checked_in as f64,
            SortMetric::Efficiency => row.efficiency_score,
        }
    }
}

/// Stable descending sort by any numeric key; input order breaks ties
pub fn sort_desc_by<T, F>(rows: &mut [T], key: F)
where
    F: Fn(&T) -> f64,
{
    rows.sort_by(|a, b| compare_f64(key(b), key(a)));
}

/// Stable descending sort of session summaries by `metric`
pub fn rank_sessions(rows: &mut [SessionSummary], metric: SortMetric) {
    sort_desc_by(rows, |r| metric.value(r));
}

/// First `n` rows of an already sorted list
pub fn top_n<T>(rows: &[T], n: usize) -> &[T] {
    &rows[..n.min(rows.len())]
}

/// Last `n` rows of an already sorted list; may overlap [`top_n`]
pub fn bottom_n<T>(rows: &[T], n: usize) -> &[T] {
    &rows[rows.len().saturating_sub(n)..]
}

/// Lower-middle element of the ascending order; no interpolation, 0 when empty
pub fn lower_median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| compare_f64(*a, *b));
    sorted[(sorted.len() - 1) / 2]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    /// High on both axes
    HighHigh,
    /// High on the first axis only
    HighLow,
    /// High on the second axis only
    LowHigh,
    LowLow,
}

impl Quadrant {
    pub fn from_axes(x_high: bool, y_high: bool) -> Self {
        match (x_high, y_high) {
            (true, true) => Quadrant::HighHigh,
            (true, false) => Quadrant::HighLow,
            (false, true) => Quadrant::LowHigh,
            (false, false) => Quadrant::LowLow,
        }
    }

    /// Label in profitability/popularity terms
    pub fn label(self) -> &'static str {
        match self {
            Quadrant::HighHigh => "Stars",
            Quadrant::HighLow => "Premium niche",
            Quadrant::LowHigh => "Crowd pleasers",
            Quadrant::LowLow => "Underperformers",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuadrantAssignment {
    pub key: String,
    pub x: f64,
    pub y: f64,
    pub quadrant: Quadrant,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuadrantMatrix {
    pub x_median: f64,
    pub y_median: f64,
    pub assignments: Vec<QuadrantAssignment>,
}

impl QuadrantMatrix {
    pub fn in_quadrant(&self, quadrant: Quadrant) -> impl Iterator<Item = &QuadrantAssignment> {
        self.assignments.iter().filter(move |a| a.quadrant == quadrant)
    }
}

/// Assign each item a quadrant by comparing both axes to their medians
/// (a value equal to the median counts as high)
pub fn classify_quadrants<T, K, X, Y>(items: &[T], key: K, x: X, y: Y) -> QuadrantMatrix
where
    K: Fn(&T) -> String,
    X: Fn(&T) -> f64,
    Y: Fn(&T) -> f64,
{
    let xs: Vec<f64> = items.iter().map(&x).collect();
    let ys: Vec<f64> = items.iter().map(&y).collect();
    let x_median = lower_median(&xs);
    let y_median = lower_median(&ys);

    let assignments = items
        .iter()
        .zip(xs.iter().zip(ys.iter()))
        .map(|(item, (&xv, &yv))| QuadrantAssignment {
            key: key(item),
            x: xv,
            y: yv,
            quadrant: Quadrant::from_axes(xv >= x_median, yv >= y_median),
        })
        .collect();

    QuadrantMatrix {
        x_median,
        y_median,
        assignments,
    }
}

/// Format profitability (avg revenue per session) vs popularity (avg attendance)
pub fn format_quadrants(rows: &[SessionSummary]) -> QuadrantMatrix {
    classify_quadrants(
        rows,
        |r| r.key.clone(),
        |r| r.avg_revenue_per_session,
        |r| r.avg_attendance,
    )
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn row(key: &str, revenue: f64, sessions: usize) -> SessionSummary {
        SessionSummary {
            key: key.into(),
            total_revenue: revenue,
            sessions,
            ..Default::default()
        }
    }

    #[test]
    fn rank_descending_stable() {
        let mut rows = vec![
            row("a", 10.0, 1),
            row("b", 30.0, 1),
            row("c", 10.0, 1),
            row("d", 20.0, 1),
        ];
        rank_sessions(&mut rows, SortMetric::Revenue);
        let keys: Vec<_> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, ["b", "d", "a", "c"]);
    }

    #[test]
    fn rank_by_session_count() {
        let mut rows = vec![row("a", 0.0, 2), row("b", 0.0, 5)];
        rank_sessions(&mut rows, SortMetric::Sessions);
        assert_eq!(rows[0].key, "b");
    }

    #[test]
    fn top_and_bottom_may_overlap() {
        let rows = [1, 2, 3];
        assert_eq!(top_n(&rows, 2), &[1, 2]);
        assert_eq!(bottom_n(&rows, 2), &[2, 3]);
        assert_eq!(top_n(&rows, 10), &[1, 2, 3]);
        assert_eq!(bottom_n(&rows, 10), &[1, 2, 3]);
        let empty: [i32; 0] = [];
        assert!(top_n(&empty, 3).is_empty());
        assert!(bottom_n(&empty, 3).is_empty());
    }

    #[test]
    fn lower_median_odd_and_even() {
        assert_eq!(lower_median(&[30.0, 10.0, 20.0]), 20.0);
        assert_eq!(lower_median(&[40.0, 10.0, 30.0, 20.0]), 20.0);
        assert_eq!(lower_median(&[7.0]), 7.0);
        assert_eq!(lower_median(&[]), 0.0);
    }

    #[test]
    fn quadrant_classification_is_deterministic() {
        let items = [
            ("a", 10.0, 5.0),
            ("b", 20.0, 15.0),
            ("c", 30.0, 25.0),
            ("edge", 25.0, 20.0),
        ];
        // medians come from the three reference groups only
        let matrix = classify_quadrants(&items[..3], |i| i.0.to_string(), |i| i.1, |i| i.2);
        assert_eq!(matrix.x_median, 20.0);
        assert_eq!(matrix.y_median, 15.0);

        let edge = items[3];
        let quadrant = Quadrant::from_axes(edge.1 >= matrix.x_median, edge.2 >= matrix.y_median);
        assert_eq!(quadrant, Quadrant::HighHigh);
    }

    #[test]
    fn quadrant_median_counts_as_high() {
        let items = [(10.0, 5.0), (20.0, 15.0), (30.0, 25.0)];
        let matrix = classify_quadrants(&items, |i| i.0.to_string(), |i| i.0, |i| i.1);
        let quadrants: Vec<_> = matrix.assignments.iter().map(|a| a.quadrant).collect();
        assert_eq!(
            quadrants,
            [Quadrant::LowLow, Quadrant::HighHigh, Quadrant::HighHigh]
        );
        assert_eq!(matrix.in_quadrant(Quadrant::HighHigh).count(), 2);
    }

    #[test]
    fn format_quadrants_uses_revenue_and_attendance() {
        let mut premium = row("Strength", 0.0, 1);
        premium.avg_revenue_per_session = 900.0;
        premium.avg_attendance = 2.0;
        let mut popular = row("Cycle", 0.0, 1);
        popular.avg_revenue_per_session = 100.0;
        popular.avg_attendance = 20.0;
        let mut middle = row("Barre", 0.0, 1);
        middle.avg_revenue_per_session = 500.0;
        middle.avg_attendance = 10.0;
        let matrix = format_quadrants(&[premium, popular, middle]);
        assert_eq!(matrix.x_median, 500.0);
        assert_eq!(matrix.y_median, 10.0);
        assert_eq!(matrix.assignments[0].quadrant, Quadrant::HighLow);
        assert_eq!(matrix.assignments[1].quadrant, Quadrant::LowHigh);
    }
}
