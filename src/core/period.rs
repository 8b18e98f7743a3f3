//! Calendar-month buckets and period-over-period comparison
//!
//! Every comparison table is built from a trailing window of calendar months
//! that is generated unconditionally, so months without records still show up
//! as zero rows. Growth between two months follows one policy everywhere,
//! see [`growth_rate`].

use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::consts::MONTH_LABEL_FORMAT;
use crate::core::customers::CustomerIndex;
use crate::core::ratio::{pct, safe_div};
use crate::core::types::{LeadRecord, SaleRecord, SessionRecord};

/// A calendar month; orders chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Shift by a signed number of months
    pub fn offset(self, months: i32) -> Self {
        let total = self.year * 12 + (self.month as i32 - 1) + months;
        Self {
            year: total.div_euclid(12),
            month: total.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn prev(self) -> Self {
        self.offset(-1)
    }

    pub fn next(self) -> Self {
        self.offset(1)
    }

    /// "Jan 2025"
    pub fn label(self) -> String {
        match self.first_day() {
            Some(day) => day.format(MONTH_LABEL_FORMAT).to_string(),
            None => format!("{:04}-{:02}", self.year, self.month),
        }
    }

    /// Accepts "Jan 2025", "January 2025" and "2025-01"
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if let Ok(day) = NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d") {
            return Some(Self::from_date(day));
        }
        for fmt in ["%d %b %Y", "%d %B %Y"] {
            if let Ok(day) = NaiveDate::parse_from_str(&format!("01 {trimmed}"), fmt) {
                return Some(Self::from_date(day));
            }
        }
        None
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

/// Exactly `count` consecutive months ending at the anchor's month, oldest first
pub fn trailing_months(anchor: NaiveDate, count: usize) -> Vec<MonthKey> {
    let end = MonthKey::from_date(anchor);
    (0..count)
        .rev()
        .map(|back| end.offset(-(back as i32)))
        .collect()
}

/// Percentage change from `previous` to `current`.
///
/// A move off zero counts as 100% growth rather than infinity; zero to zero
/// (or to a negative value) is reported as 0.
pub fn growth_rate(previous: f64, current: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else if current > 0.0 {
        100.0
    } else {
        0.0
    }
}

/// A monthly row that can be compared against another month of the same kind
pub trait MonthlyMetrics {
    fn month(&self) -> MonthKey;

    /// Named metric values, in display order
    fn metric_values(&self) -> Vec<(&'static str, f64)>;
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricDelta {
    pub metric: &'static str,
    pub previous: f64,
    pub current: f64,
    pub change: f64,
    pub growth: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeriodComparison {
    pub previous: MonthKey,
    pub current: MonthKey,
    pub deltas: Vec<MetricDelta>,
}

impl PeriodComparison {
    pub fn delta(&self, metric: &str) -> Option<&MetricDelta> {
        self.deltas.iter().find(|d| d.metric == metric)
    }
}

pub fn compare<T: MonthlyMetrics>(previous: &T, current: &T) -> PeriodComparison {
    let before: HashMap<&'static str, f64> = previous.metric_values().into_iter().collect();
    let deltas = current
        .metric_values()
        .into_iter()
        .map(|(metric, now)| {
            let then = before.get(metric).copied().unwrap_or(0.0);
            MetricDelta {
                metric,
                previous: then,
                current: now,
                change: now - then,
                growth: growth_rate(then, now),
            }
        })
        .collect();

    PeriodComparison {
        previous: previous.month(),
        current: current.month(),
        deltas,
    }
}

/// Compare each row with the row before it
pub fn month_over_month<T: MonthlyMetrics>(rows: &[T]) -> Vec<PeriodComparison> {
    rows.windows(2).map(|pair| compare(&pair[0], &pair[1])).collect()
}

/// Compare each row with the same month one year earlier, when that month is present
pub fn year_over_year<T: MonthlyMetrics>(rows: &[T]) -> Vec<PeriodComparison> {
    let by_month: HashMap<MonthKey, &T> = rows.iter().map(|r| (r.month(), r)).collect();
    rows.iter()
        .filter_map(|current| {
            let previous = by_month.get(&current.month().offset(-12))?;
            Some(compare(*previous, current))
        })
        .collect()
}

// ============================================================================
// Monthly rows
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SessionMonth {
    pub month: MonthKey,
    pub sessions: usize,
    pub capacity: u64,
    pub checked_in: u64,
    pub booked: u64,
    pub revenue: f64,
    pub fill_rate: f64,
    pub avg_attendance: f64,
    pub revenue_per_session: f64,
}

impl MonthlyMetrics for SessionMonth {
    fn month(&self) -> MonthKey {
        self.month
    }

    fn metric_values(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("sessions", self.sessions as f64),
            ("checked_in", self.checked_in as f64),
            ("fill_rate", self.fill_rate),
            ("revenue", self.revenue),
            ("revenue_per_session", self.revenue_per_session),
        ]
    }
}

pub fn monthly_sessions(records: &[SessionRecord], months: &[MonthKey]) -> Vec<SessionMonth> {
    #[derive(Default)]
    struct Acc {
        sessions: usize,
        capacity: u64,
        checked_in: u64,
        booked: u64,
        revenue: f64,
    }

    let wanted: HashSet<MonthKey> = months.iter().copied().collect();
    let mut buckets: HashMap<MonthKey, Acc> = HashMap::new();
    for record in records {
        let Some(date) = record.date else { continue };
        let key = MonthKey::from_date(date);
        if !wanted.contains(&key) {
            continue;
        }
        let acc = buckets.entry(key).or_default();
        acc.sessions += 1;
        acc.capacity += u64::from(record.capacity);
        acc.checked_in += u64::from(record.checked_in);
        acc.booked += u64::from(record.booked);
        acc.revenue += record.revenue;
    }

    months
        .iter()
        .map(|&month| {
            let acc = buckets.remove(&month).unwrap_or_default();
            SessionMonth {
                month,
                sessions: acc.sessions,
                capacity: acc.capacity,
                checked_in: acc.checked_in,
                booked: acc.booked,
                revenue: acc.revenue,
                fill_rate: pct(acc.checked_in as f64, acc.capacity as f64),
                avg_attendance: safe_div(acc.checked_in as f64, acc.sessions as f64),
                revenue_per_session: safe_div(acc.revenue, acc.sessions as f64),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct SalesMonth {
    pub month: MonthKey,
    pub transactions: usize,
    pub succeeded: usize,
    pub revenue: f64,
    pub unique_customers: usize,
    pub new_customers: usize,
    pub existing_customers: usize,
    pub avg_transaction_value: f64,
    pub discount_total: f64,
    pub discounted_transactions: usize,
    pub discount_rate: f64,
    pub avg_discount_percent: f64,
}

impl MonthlyMetrics for SalesMonth {
    fn month(&self) -> MonthKey {
        self.month
    }

    fn metric_values(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("revenue", self.revenue),
            ("transactions", self.transactions as f64),
            ("unique_customers", self.unique_customers as f64),
            ("new_customers", self.new_customers as f64),
            ("avg_transaction_value", self.avg_transaction_value),
            ("discount_total", self.discount_total),
            ("discount_rate", self.discount_rate),
        ]
    }
}

/// Monthly sales rows for `sales` (the current view).
///
/// New vs existing customers come from `index`, which must be built from the
/// full unfiltered history.
pub fn monthly_sales(
    sales: &[SaleRecord],
    index: &CustomerIndex,
    months: &[MonthKey],
) -> Vec<SalesMonth> {
    #[derive(Default)]
    struct Acc {
        transactions: usize,
        succeeded: usize,
        revenue: f64,
        customers: HashSet<String>,
        discount_total: f64,
        discounted: usize,
        discount_percent_sum: f64,
    }

    let wanted: HashSet<MonthKey> = months.iter().copied().collect();
    let mut buckets: HashMap<MonthKey, Acc> = HashMap::new();
    for sale in sales {
        let Some(date) = sale.payment_date else { continue };
        let key = MonthKey::from_date(date);
        if !wanted.contains(&key) {
            continue;
        }
        let acc = buckets.entry(key).or_default();
        acc.transactions += 1;
        if sale.is_succeeded() {
            acc.succeeded += 1;
            acc.revenue += sale.amount;
        }
        if let Some(customer) = sale.customer_key() {
            acc.customers.insert(customer);
        }
        if sale.is_discounted() {
            acc.discounted += 1;
            acc.discount_total += sale.discount_amount;
            acc.discount_percent_sum += sale.discount_percent;
        }
    }

    months
        .iter()
        .map(|&month| {
            let acc = buckets.remove(&month).unwrap_or_default();
            let new_customers = acc
                .customers
                .iter()
                .filter(|c| index.is_new_in(c, month).unwrap_or(true))
                .count();
            SalesMonth {
                month,
                transactions: acc.transactions,
                succeeded: acc.succeeded,
                revenue: acc.revenue,
                unique_customers: acc.customers.len(),
                new_customers,
                existing_customers: acc.customers.len() - new_customers,
                avg_transaction_value: safe_div(acc.revenue, acc.succeeded as f64),
                discount_total: acc.discount_total,
                discounted_transactions: acc.discounted,
                discount_rate: pct(acc.discounted as f64, acc.transactions as f64),
                avg_discount_percent: safe_div(acc.discount_percent_sum, acc.discounted as f64),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct FunnelMonth {
    pub month: MonthKey,
    pub leads: usize,
    pub trials: usize,
    pub conversions: usize,
    pub retained: usize,
    pub trial_rate: f64,
    pub conversion_rate: f64,
    pub retention_rate: f64,
    pub avg_ltv: f64,
}

impl MonthlyMetrics for FunnelMonth {
    fn month(&self) -> MonthKey {
        self.month
    }

    fn metric_values(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("leads", self.leads as f64),
            ("trials", self.trials as f64),
            ("conversions", self.conversions as f64),
            ("conversion_rate", self.conversion_rate),
            ("retention_rate", self.retention_rate),
            ("avg_ltv", self.avg_ltv),
        ]
    }
}

/// Monthly funnel rows keyed by each lead's creation month
pub fn monthly_funnel(leads: &[LeadRecord], months: &[MonthKey]) -> Vec<FunnelMonth> {
    #[derive(Default)]
    struct Acc {
        leads: usize,
        trials: usize,
        conversions: usize,
        retained: usize,
        ltv: f64,
    }

    let wanted: HashSet<MonthKey> = months.iter().copied().collect();
    let mut buckets: HashMap<MonthKey, Acc> = HashMap::new();
    for lead in leads {
        let Some(created) = lead.created_at else { continue };
        let key = MonthKey::from_date(created);
        if !wanted.contains(&key) {
            continue;
        }
        let acc = buckets.entry(key).or_default();
        acc.leads += 1;
        acc.ltv += lead.ltv;
        if lead.has_trial() {
            acc.trials += 1;
        }
        if lead.is_converted() {
            acc.conversions += 1;
            if lead.is_retained() {
                acc.retained += 1;
            }
        }
    }

    months
        .iter()
        .map(|&month| {
            let acc = buckets.remove(&month).unwrap_or_default();
            FunnelMonth {
                month,
                leads: acc.leads,
                trials: acc.trials,
                conversions: acc.conversions,
                retained: acc.retained,
                trial_rate: pct(acc.trials as f64, acc.leads as f64),
                conversion_rate: pct(acc.conversions as f64, acc.leads as f64),
                retention_rate: pct(acc.retained as f64, acc.conversions as f64),
                avg_ltv: safe_div(acc.ltv, acc.leads as f64),
            }
        })
        .collect()
}
