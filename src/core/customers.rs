//! Customer deduplication and behavioral segmentation

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::core::period::MonthKey;
use crate::core::ratio::pct;
use crate::core::types::{CheckinRecord, SaleRecord};

/// Earliest transaction date per customer, built from the full history.
///
/// Build this from unfiltered sales: a customer is "new" in a month only if
/// their first transaction ever falls in it, not merely their first one
/// inside a filtered view.
#[derive(Debug, Clone, Default)]
pub struct CustomerIndex {
    first_seen: HashMap<String, NaiveDate>,
}

impl CustomerIndex {
    pub fn build(all_sales: &[SaleRecord]) -> Self {
        let mut first_seen: HashMap<String, NaiveDate> = HashMap::new();
        for sale in all_sales {
            let (Some(key), Some(date)) = (sale.customer_key(), sale.payment_date) else {
                continue;
            };
            first_seen
                .entry(key)
                .and_modify(|earliest| {
                    if date < *earliest {
                        *earliest = date;
                    }
                })
                .or_insert(date);
        }
        Self { first_seen }
    }

    pub fn first_seen(&self, customer: &str) -> Option<NaiveDate> {
        self.first_seen.get(customer).copied()
    }

    /// `None` when the customer has no dated transaction in the history
    pub fn is_new_in(&self, customer: &str, month: MonthKey) -> Option<bool> {
        self.first_seen(customer).map(|first| month.contains(first))
    }

    pub fn len(&self) -> usize {
        self.first_seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first_seen.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CustomerMix {
    pub month: MonthKey,
    pub new_customers: usize,
    pub existing_customers: usize,
}

/// Unique customers of `sales` paying in `month`, split into new and existing
pub fn classify_customers(
    sales: &[SaleRecord],
    index: &CustomerIndex,
    month: MonthKey,
) -> CustomerMix {
    let customers: HashSet<String> = sales
        .iter()
        .filter(|s| s.payment_date.is_some_and(|d| month.contains(d)))
        .filter_map(SaleRecord::customer_key)
        .collect();

    let new_customers = customers
        .iter()
        .filter(|c| index.is_new_in(c, month).unwrap_or(true))
        .count();

    CustomerMix {
        month,
        new_customers,
        existing_customers: customers.len() - new_customers,
    }
}

/// Unique customers holding a membership that has not ended by `as_of`
pub fn active_members(sales: &[SaleRecord], as_of: NaiveDate) -> usize {
    sales
        .iter()
        .filter(|s| s.membership_end.is_some_and(|end| end >= as_of))
        .filter_map(SaleRecord::customer_key)
        .collect::<HashSet<_>>()
        .len()
}

// ============================================================================
// Segmentation
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Segment {
    HighValue,
    Engaged,
    Unreliable,
    Reliable,
    Inactive,
    AtRisk,
}

impl Segment {
    /// Evaluation order of [`classify_segment`]
    pub const ALL: [Segment; 6] = [
        Segment::HighValue,
        Segment::Engaged,
        Segment::Unreliable,
        Segment::Reliable,
        Segment::Inactive,
        Segment::AtRisk,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Segment::HighValue => "high-value",
            Segment::Engaged => "engaged",
            Segment::Unreliable => "unreliable",
            Segment::Reliable => "reliable",
            Segment::Inactive => "inactive",
            Segment::AtRisk => "at-risk",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        let wanted = input.trim().to_lowercase().replace([' ', '_'], "-");
        Self::ALL.into_iter().find(|s| s.label() == wanted)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SegmentThresholds {
    /// Lifetime paid strictly above this is high-value
    pub high_value_paid: f64,
    pub engaged_min_visits: usize,
    pub engaged_min_show_up: f64,
    /// Cancellation rate strictly above this is unreliable
    pub unreliable_cancel_rate: f64,
    /// Payment compliance strictly below this is unreliable
    pub unreliable_min_compliance: f64,
    pub reliable_min_visits: usize,
    pub reliable_min_show_up: f64,
    /// Fewer visits than this is inactive
    pub inactive_max_visits: usize,
    /// No visit within this many days is inactive
    pub inactive_days: i64,
}

impl Default for SegmentThresholds {
    fn default() -> Self {
        Self {
            high_value_paid: 5000.0,
            engaged_min_visits: 20,
            engaged_min_show_up: 80.0,
            unreliable_cancel_rate: 20.0,
            unreliable_min_compliance: 70.0,
            reliable_min_visits: 5,
            reliable_min_show_up: 60.0,
            inactive_max_visits: 3,
            inactive_days: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberProfile {
    pub member_id: String,
    pub bookings: usize,
    pub visits: usize,
    pub late_cancels: usize,
    pub show_up_rate: f64,
    pub cancellation_rate: f64,
    pub transactions: usize,
    pub lifetime_paid: f64,
    pub payment_compliance: f64,
    pub last_visit: Option<NaiveDate>,
    pub days_since_last_visit: Option<i64>,
}

/// First matching rule wins; the order is part of the contract
pub fn classify_segment(profile: &MemberProfile, t: &SegmentThresholds) -> Segment {
    if profile.lifetime_paid > t.high_value_paid {
        return Segment::HighValue;
    }
    if profile.visits >= t.engaged_min_visits && profile.show_up_rate >= t.engaged_min_show_up {
        return Segment::Engaged;
    }
    if profile.cancellation_rate > t.unreliable_cancel_rate
        || profile.payment_compliance < t.unreliable_min_compliance
    {
        return Segment::Unreliable;
    }
    if profile.visits >= t.reliable_min_visits && profile.show_up_rate >= t.reliable_min_show_up {
        return Segment::Reliable;
    }
    let stale = profile
        .days_since_last_visit
        .is_none_or(|days| days > t.inactive_days);
    if profile.visits < t.inactive_max_visits || stale {
        return Segment::Inactive;
    }
    Segment::AtRisk
}

#[derive(Default)]
struct MemberAccumulator {
    bookings: usize,
    visits: usize,
    late_cancels: usize,
    transactions: usize,
    succeeded: usize,
    lifetime_paid: f64,
    last_visit: Option<NaiveDate>,
}

/// One profile per member seen in check-ins or sales, ordered by member id
pub fn build_member_profiles(
    checkins: &[CheckinRecord],
    sales: &[SaleRecord],
    as_of: NaiveDate,
) -> Vec<MemberProfile> {
    let mut members: HashMap<String, MemberAccumulator> = HashMap::new();

    for checkin in checkins {
        let id = checkin.member_id.trim();
        if id.is_empty() {
            continue;
        }
        let acc = members.entry(id.to_string()).or_default();
        acc.bookings += 1;
        if checkin.checked_in {
            acc.visits += 1;
            if let Some(date) = checkin.date
                && acc.last_visit.is_none_or(|last| date > last)
            {
                acc.last_visit = Some(date);
            }
        }
        if checkin.late_cancelled {
            acc.late_cancels += 1;
        }
    }

    for sale in sales {
        let Some(key) = sale.customer_key() else { continue };
        let acc = members.entry(key).or_default();
        acc.transactions += 1;
        if sale.is_succeeded() {
            acc.succeeded += 1;
            acc.lifetime_paid += sale.amount;
        }
    }

    let mut profiles: Vec<MemberProfile> = members
        .into_iter()
        .map(|(member_id, acc)| MemberProfile {
            member_id,
            bookings: acc.bookings,
            visits: acc.visits,
            late_cancels: acc.late_cancels,
            show_up_rate: pct(acc.visits as f64, acc.bookings as f64),
            cancellation_rate: pct(acc.late_cancels as f64, acc.bookings as f64),
            transactions: acc.transactions,
            lifetime_paid: acc.lifetime_paid,
            payment_compliance: if acc.transactions == 0 {
                100.0
            } else {
                pct(acc.succeeded as f64, acc.transactions as f64)
            },
            last_visit: acc.last_visit,
            days_since_last_visit: acc.last_visit.map(|d| (as_of - d).num_days()),
        })
        .collect();

    profiles.sort_by(|a, b| a.member_id.cmp(&b.member_id));
    profiles
}

/// Member count per segment, in [`Segment::ALL`] order (zeros included)
pub fn segment_counts(
    profiles: &[MemberProfile],
    thresholds: &SegmentThresholds,
) -> Vec<(Segment, usize)> {
    let mut counts: HashMap<Segment, usize> = HashMap::new();
    for profile in profiles {
        *counts.entry(classify_segment(profile, thresholds)).or_default() += 1;
    }
    Segment::ALL
        .into_iter()
        .map(|s| (s, counts.get(&s).copied().unwrap_or(0)))
        .collect()
}
