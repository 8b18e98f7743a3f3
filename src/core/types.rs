//! Core record types shared by every aggregation
//!
//! Records are produced once by the loader (which coerces raw cells) and are
//! read-only afterwards. Every field has a documented default so the
//! aggregations never need to guard against missing values.

use chrono::{NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

/// One scheduled class occurrence
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub date: Option<NaiveDate>,
    /// "Monday", "Tuesday", ...
    pub day_of_week: String,
    /// Start time as shown on the schedule, e.g. "07:30"
    pub time: String,
    pub class_format: String,
    pub cleaned_class: String,
    pub trainer: String,
    pub location: String,
    pub capacity: u32,
    pub checked_in: u32,
    pub booked: u32,
    pub late_cancelled: u32,
    pub non_paid: u32,
    pub revenue: f64,
    pub memberships_used: u32,
    pub packages_used: u32,
    pub intro_offers_used: u32,
    pub single_classes_used: u32,
}

/// One payment event
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SaleRecord {
    pub transaction_id: String,
    pub member_id: String,
    pub email: String,
    pub product: String,
    pub category: String,
    pub location: String,
    pub sold_by: String,
    pub payment_date: Option<NaiveDate>,
    pub amount: f64,
    pub discount_amount: f64,
    pub discount_percent: f64,
    pub membership_end: Option<NaiveDate>,
    pub status: String,
}

impl SaleRecord {
    /// Dedup key: member id, falling back to the lower-cased email
    pub fn customer_key(&self) -> Option<String> {
        let id = self.member_id.trim();
        if !id.is_empty() {
            return Some(id.to_string());
        }
        let email = self.email.trim();
        if !email.is_empty() {
            return Some(email.to_lowercase());
        }
        None
    }

    /// Only succeeded payments count toward revenue
    pub fn is_succeeded(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case("succeeded")
    }

    pub fn is_discounted(&self) -> bool {
        self.discount_amount > 0.0 || self.discount_percent > 0.0
    }
}

/// One sales-funnel prospect
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct LeadRecord {
    pub lead_id: String,
    pub source: String,
    pub stage: String,
    pub trial_status: String,
    pub conversion_status: String,
    pub retention_status: String,
    pub center: String,
    pub associate: String,
    /// Lifetime value estimate
    pub ltv: f64,
    pub visits: u32,
    pub created_at: Option<NaiveDate>,
    pub converted_at: Option<NaiveDate>,
}

impl LeadRecord {
    pub fn is_converted(&self) -> bool {
        self.conversion_status.trim().eq_ignore_ascii_case("converted")
    }

    pub fn has_trial(&self) -> bool {
        let status = self.trial_status.trim().to_lowercase();
        status.contains("trial") && !status.starts_with("no ")
    }

    pub fn is_retained(&self) -> bool {
        self.retention_status.trim().eq_ignore_ascii_case("retained")
    }
}

/// One member booking of one session
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CheckinRecord {
    pub member_id: String,
    pub session_id: String,
    pub date: Option<NaiveDate>,
    pub checked_in: bool,
    pub late_cancelled: bool,
    pub paid: f64,
    pub location: String,
    pub cleaned_class: String,
    pub trainer: String,
}

/// One late-cancellation event
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CancellationRecord {
    pub member_id: String,
    pub location: String,
    pub trainer: String,
    pub cleaned_class: String,
    pub paid_amount: f64,
    pub cancelled_at: Option<NaiveDateTime>,
}

/// Full English weekday name, as session schedules spell it
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Date filter for queries
#[derive(Debug, Clone, Copy, Default)]
pub struct DateFilter {
    pub since: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
}

impl DateFilter {
    pub fn new(since: Option<NaiveDate>, until: Option<NaiveDate>) -> Self {
        Self { since, until }
    }

    pub fn is_bounded(&self) -> bool {
        self.since.is_some() || self.until.is_some()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        if let Some(s) = self.since
            && date < s
        {
            return false;
        }
        if let Some(u) = self.until
            && date > u
        {
            return false;
        }
        true
    }

    /// Undated records only pass an unbounded filter
    pub fn matches(&self, date: Option<NaiveDate>) -> bool {
        match date {
            Some(d) => self.contains(d),
            None => !self.is_bounded(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    // --- SaleRecord ---

    #[test]
    fn customer_key_prefers_member_id() {
        let sale = SaleRecord {
            member_id: "M-1".into(),
            email: "a@b.com".into(),
            ..Default::default()
        };
        assert_eq!(sale.customer_key().as_deref(), Some("M-1"));
    }

    #[test]
    fn customer_key_falls_back_to_lowercased_email() {
        let sale = SaleRecord {
            member_id: "  ".into(),
            email: "Jane@Studio.COM".into(),
            ..Default::default()
        };
        assert_eq!(sale.customer_key().as_deref(), Some("jane@studio.com"));
    }

    #[test]
    fn customer_key_none_when_blank() {
        assert!(SaleRecord::default().customer_key().is_none());
    }

    #[test]
    fn succeeded_status_is_case_insensitive() {
        let mut sale = SaleRecord {
            status: "Succeeded".into(),
            ..Default::default()
        };
        assert!(sale.is_succeeded());
        sale.status = "failed".into();
        assert!(!sale.is_succeeded());
    }

    // --- LeadRecord ---

    #[test]
    fn lead_status_helpers() {
        let lead = LeadRecord {
            trial_status: "Trial Completed".into(),
            conversion_status: "converted".into(),
            retention_status: "Retained".into(),
            ..Default::default()
        };
        assert!(lead.has_trial());
        assert!(lead.is_converted());
        assert!(lead.is_retained());

        let cold = LeadRecord {
            trial_status: "No Trial".into(),
            conversion_status: "Not Converted".into(),
            ..Default::default()
        };
        assert!(!cold.has_trial());
        assert!(!cold.is_converted());
        assert!(!cold.is_retained());
    }

    // --- DateFilter ---

    #[test]
    fn date_filter_no_bounds() {
        let f = DateFilter::new(None, None);
        assert!(f.contains(d(2020, 1, 1)));
        assert!(f.matches(None));
    }

    #[test]
    fn date_filter_both_bounds_inclusive() {
        let f = DateFilter::new(Some(d(2025, 3, 1)), Some(d(2025, 3, 31)));
        assert!(!f.contains(d(2025, 2, 28)));
        assert!(f.contains(d(2025, 3, 1)));
        assert!(f.contains(d(2025, 3, 31)));
        assert!(!f.contains(d(2025, 4, 1)));
    }

    #[test]
    fn bounded_filter_excludes_undated_records() {
        let f = DateFilter::new(Some(d(2025, 3, 1)), None);
        assert!(!f.matches(None));
        assert!(f.matches(Some(d(2025, 3, 2))));
    }
}
