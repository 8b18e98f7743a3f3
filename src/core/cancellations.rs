//! Late-cancellation summaries, peaks and repeat offenders

use chrono::{Datelike, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::core::group::{Tally, group_by};
use crate::core::rank::sort_desc_by;
use crate::core::ratio::pct;
use crate::core::types::{CancellationRecord, weekday_name};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellationDimension {
    #[default]
    Location,
    Trainer,
    Class,
    Member,
}

impl CancellationDimension {
    pub fn label(self) -> &'static str {
        match self {
            CancellationDimension::Location => "Location",
            CancellationDimension::Trainer => "Trainer",
            CancellationDimension::Class => "Class",
            CancellationDimension::Member => "Member",
        }
    }

    pub fn key(self, record: &CancellationRecord) -> &str {
        match self {
            CancellationDimension::Location => &record.location,
            CancellationDimension::Trainer => &record.trainer,
            CancellationDimension::Class => &record.cleaned_class,
            CancellationDimension::Member => &record.member_id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CancellationSummary {
    pub key: String,
    pub cancellations: usize,
    pub unique_members: usize,
    pub total_paid: f64,
    /// Share of all cancellations in the input
    pub share: f64,
}

/// Count per group, most cancellations first
pub fn summarize_cancellations(
    records: &[CancellationRecord],
    dimension: CancellationDimension,
) -> Vec<CancellationSummary> {
    let total = records.len() as f64;
    let mut rows: Vec<CancellationSummary> = group_by(records, |r| dimension.key(r))
        .into_iter()
        .map(|group| {
            let members: HashSet<&str> = group
                .records
                .iter()
                .map(|r| r.member_id.trim())
                .filter(|id| !id.is_empty())
                .collect();
            let total_paid = group.records.iter().map(|r| r.paid_amount).sum();
            let count = group.len();
            CancellationSummary {
                key: group.key,
                cancellations: count,
                unique_members: members.len(),
                total_paid,
                share: pct(count as f64, total),
            }
        })
        .collect();

    sort_desc_by(&mut rows, |r| r.cancellations as f64);
    rows
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CancellationPeaks {
    pub weekday: Option<String>,
    pub weekday_count: usize,
    /// Hour of day, 0-23
    pub hour: Option<u32>,
    pub hour_count: usize,
}

/// Busiest weekday and hour among timestamped cancellations.
///
/// Ties go to the earlier weekday (Monday first) and the earlier hour.
pub fn cancellation_peaks(records: &[CancellationRecord]) -> CancellationPeaks {
    let mut weekdays = [0usize; 7];
    let mut hours = [0usize; 24];
    for stamp in records.iter().filter_map(|r| r.cancelled_at) {
        weekdays[stamp.weekday().num_days_from_monday() as usize] += 1;
        hours[stamp.hour() as usize] += 1;
    }

    let mut peaks = CancellationPeaks::default();
    let mut day = Weekday::Mon;
    for count in weekdays {
        if count > peaks.weekday_count {
            peaks.weekday_count = count;
            peaks.weekday = Some(weekday_name(day).to_string());
        }
        day = day.succ();
    }
    for (hour, count) in hours.into_iter().enumerate() {
        if count > peaks.hour_count {
            peaks.hour_count = count;
            peaks.hour = Some(hour as u32);
        }
    }
    peaks
}

#[derive(Debug, Clone, Serialize)]
pub struct RepeatCanceller {
    pub member_id: String,
    pub cancellations: usize,
    pub total_paid: f64,
    /// Class cancelled most often
    pub top_class: Option<String>,
}

/// Members with at least `min` cancellations, most first (ties by member id)
pub fn repeat_cancellers(records: &[CancellationRecord], min: usize) -> Vec<RepeatCanceller> {
    let mut by_member: HashMap<&str, (usize, f64, Tally)> = HashMap::new();
    for record in records {
        let id = record.member_id.trim();
        if id.is_empty() {
            continue;
        }
        let entry = by_member
            .entry(id)
            .or_insert_with(|| (0, 0.0, Tally::new()));
        entry.0 += 1;
        entry.1 += record.paid_amount;
        entry.2.add(&record.cleaned_class, 1.0);
    }

    let mut rows: Vec<RepeatCanceller> = by_member
        .into_iter()
        .filter(|(_, (count, _, _))| *count >= min.max(1))
        .map(|(id, (count, paid, classes))| RepeatCanceller {
            member_id: id.to_string(),
            cancellations: count,
            total_paid: paid,
            top_class: classes.peak().map(|(class, _)| class.to_string()),
        })
        .collect();

    rows.sort_by(|a, b| {
        b.cancellations
            .cmp(&a.cancellations)
            .then_with(|| a.member_id.cmp(&b.member_id))
    });
    rows
}
