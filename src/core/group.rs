//! Grouping and record filtering primitives
//!
//! Every summary in the engine starts here: records are narrowed by a
//! [`RecordFilter`] and partitioned with [`group_by`]. Blank keys are kept in
//! the `"Unknown"` bucket so no record is silently dropped.

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::consts::UNKNOWN;
use crate::core::types::{
    CancellationRecord, CheckinRecord, DateFilter, LeadRecord, SaleRecord, SessionRecord,
};

/// Normalize a raw grouping value; blank values map to `"Unknown"`
pub fn group_key(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        UNKNOWN.to_string()
    } else {
        trimmed.to_string()
    }
}

/// One partition produced by [`group_by`]
#[derive(Debug, Clone)]
pub struct Group<'a, T> {
    pub key: String,
    pub records: Vec<&'a T>,
}

impl<T> Group<'_, T> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Partition records by key, keeping groups in first-occurrence order
pub fn group_by<'a, T, K, F>(records: &'a [T], key_fn: F) -> Vec<Group<'a, T>>
where
    F: Fn(&'a T) -> K,
    K: AsRef<str>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Group<'a, T>> = Vec::new();

    for record in records {
        let key = group_key(key_fn(record).as_ref());
        match index.get(&key) {
            Some(&pos) => groups[pos].records.push(record),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(Group {
                    key,
                    records: vec![record],
                });
            }
        }
    }

    groups
}

/// Running totals per key, remembering first-seen order for tie breaks
#[derive(Debug, Clone, Default)]
pub struct Tally {
    index: HashMap<String, usize>,
    totals: Vec<(String, f64)>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: &str, amount: f64) {
        let key = group_key(key);
        match self.index.get(&key) {
            Some(&pos) => self.totals[pos].1 += amount,
            None => {
                self.index.insert(key.clone(), self.totals.len());
                self.totals.push((key, amount));
            }
        }
    }

    /// Key with the highest total; the earliest key wins ties
    pub fn peak(&self) -> Option<(&str, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for (key, total) in &self.totals {
            match best {
                Some((_, b)) if *total <= b => {}
                _ => best = Some((key.as_str(), *total)),
            }
        }
        best
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

/// Dimensions a record can be scoped by.
///
/// `None` means the dimension does not exist for that record kind, so an
/// allow-list on it never excludes the record.
pub trait Scoped {
    fn scope_date(&self) -> Option<NaiveDate>;

    fn scope_location(&self) -> Option<&str> {
        None
    }

    fn scope_trainer(&self) -> Option<&str> {
        None
    }

    fn scope_class(&self) -> Option<&str> {
        None
    }
}

impl Scoped for SessionRecord {
    fn scope_date(&self) -> Option<NaiveDate> {
        self.date
    }

    fn scope_location(&self) -> Option<&str> {
        Some(&self.location)
    }

    fn scope_trainer(&self) -> Option<&str> {
        Some(&self.trainer)
    }

    fn scope_class(&self) -> Option<&str> {
        Some(&self.cleaned_class)
    }
}

impl Scoped for SaleRecord {
    fn scope_date(&self) -> Option<NaiveDate> {
        self.payment_date
    }

    fn scope_location(&self) -> Option<&str> {
        Some(&self.location)
    }
}

impl Scoped for LeadRecord {
    fn scope_date(&self) -> Option<NaiveDate> {
        self.created_at
    }

    fn scope_location(&self) -> Option<&str> {
        Some(&self.center)
    }
}

impl Scoped for CheckinRecord {
    fn scope_date(&self) -> Option<NaiveDate> {
        self.date
    }

    fn scope_location(&self) -> Option<&str> {
        Some(&self.location)
    }

    fn scope_trainer(&self) -> Option<&str> {
        Some(&self.trainer)
    }

    fn scope_class(&self) -> Option<&str> {
        Some(&self.cleaned_class)
    }
}

impl Scoped for CancellationRecord {
    fn scope_date(&self) -> Option<NaiveDate> {
        self.cancelled_at.map(|dt| dt.date())
    }

    fn scope_location(&self) -> Option<&str> {
        Some(&self.location)
    }

    fn scope_trainer(&self) -> Option<&str> {
        Some(&self.trainer)
    }

    fn scope_class(&self) -> Option<&str> {
        Some(&self.cleaned_class)
    }
}

/// Pre-grouping restrictions: date range plus location/trainer/class allow-lists
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub dates: DateFilter,
    pub locations: Vec<String>,
    pub trainers: Vec<String>,
    pub classes: Vec<String>,
}

fn allowed(list: &[String], value: Option<&str>) -> bool {
    match value {
        Some(v) if !list.is_empty() => {
            let v = v.trim();
            list.iter().any(|item| item.trim().eq_ignore_ascii_case(v))
        }
        _ => true,
    }
}

impl RecordFilter {
    pub fn is_empty(&self) -> bool {
        !self.dates.is_bounded()
            && self.locations.is_empty()
            && self.trainers.is_empty()
            && self.classes.is_empty()
    }

    pub fn accepts<T: Scoped>(&self, record: &T) -> bool {
        self.dates.matches(record.scope_date())
            && allowed(&self.locations, record.scope_location())
            && allowed(&self.trainers, record.scope_trainer())
            && allowed(&self.classes, record.scope_class())
    }

    /// Same scope with the date bounds lifted, for lifetime figures
    pub fn without_dates(&self) -> Self {
        Self {
            dates: DateFilter::default(),
            ..self.clone()
        }
    }

    /// Copy out the records this filter accepts, in input order
    pub fn apply<T: Scoped + Clone>(&self, records: &[T]) -> Vec<T> {
        if self.is_empty() {
            return records.to_vec();
        }
        records
            .iter()
            .filter(|r| self.accepts(*r))
            .cloned()
            .collect()
    }
}
