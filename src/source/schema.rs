//! Snapshot rows and cell coercion
//!
//! Snapshots are exported from spreadsheets, so any cell may arrive as a
//! number, a numeric string, a bool or a yes/no string, and the same column
//! may be spelled several ways (`checked_in`, `checkedIn`, `checkins`). Each
//! row is read as a JSON object and every field takes the first spelling
//! present, so an export carrying both a raw and a cleaned column still loads.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::core::{
    CancellationRecord, CheckinRecord, LeadRecord, SaleRecord, SessionRecord, weekday_name,
};
use crate::error::LoadError;
use crate::utils::{parse_date_cell, parse_datetime_cell, parse_debug_enabled};

// ============================================================================
// Cells
// ============================================================================

#[derive(Debug, Clone)]
pub(crate) enum Cell {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Cell {
    /// Scalar JSON values only; null, arrays and objects count as absent
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Cell::Bool(*b)),
            Value::Number(n) => n.as_f64().map(Cell::Number),
            Value::String(s) => Some(Cell::Text(s.clone())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    fn number(&self) -> f64 {
        let n = match self {
            Cell::Bool(_) => 0.0,
            Cell::Number(n) => *n,
            Cell::Text(s) => {
                let cleaned: String = s
                    .trim()
                    .chars()
                    .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | 'e' | 'E'))
                    .collect();
                cleaned.parse().unwrap_or(0.0)
            }
        };
        if n.is_finite() { n } else { 0.0 }
    }

    fn flag(&self) -> bool {
        match self {
            Cell::Bool(b) => *b,
            Cell::Number(n) => *n != 0.0,
            Cell::Text(s) => matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "true" | "yes" | "y" | "1" | "checked in"
            ),
        }
    }

    fn text(&self) -> String {
        match self {
            Cell::Bool(b) => b.to_string(),
            Cell::Number(n) => n.to_string(),
            Cell::Text(s) => s.trim().to_string(),
        }
    }
}

// ============================================================================
// Rows
// ============================================================================

/// One snapshot row, looked up by an ordered list of column spellings
pub(crate) struct Row<'a>(&'a Map<String, Value>);

impl<'a> Row<'a> {
    pub(crate) fn new(object: &'a Map<String, Value>) -> Self {
        Row(object)
    }

    /// First key that holds a scalar value
    fn cell(&self, keys: &[&str]) -> Option<Cell> {
        keys.iter()
            .filter_map(|k| self.0.get(*k))
            .find_map(Cell::from_value)
    }

    fn num(&self, keys: &[&str]) -> f64 {
        self.cell(keys).map_or(0.0, |c| c.number())
    }

    /// Non-negative whole count; fractions round, negatives become 0
    fn count(&self, keys: &[&str]) -> u32 {
        let n = self.num(keys).round();
        if n <= 0.0 {
            0
        } else if n >= f64::from(u32::MAX) {
            u32::MAX
        } else {
            n as u32
        }
    }

    fn flag(&self, keys: &[&str]) -> bool {
        self.cell(keys).is_some_and(|c| c.flag())
    }

    fn text(&self, keys: &[&str]) -> String {
        self.cell(keys).map(|c| c.text()).unwrap_or_default()
    }

    fn date(&self, keys: &[&str]) -> Option<NaiveDate> {
        match self.cell(keys)? {
            Cell::Text(s) => parse_date_cell(&s),
            _ => None,
        }
    }

    fn datetime(&self, keys: &[&str]) -> Option<NaiveDateTime> {
        match self.cell(keys)? {
            Cell::Text(s) => parse_datetime_cell(&s),
            _ => None,
        }
    }
}

/// Conversion from a loosely typed snapshot row into a record
pub(crate) trait FromRow {
    fn from_row(row: &Row<'_>) -> Self;
}

impl FromRow for SessionRecord {
    fn from_row(row: &Row<'_>) -> Self {
        let date = row.date(&["date", "sessionDate"]);
        let mut day_of_week = row.text(&["day_of_week", "dayOfWeek", "day"]);
        if day_of_week.is_empty()
            && let Some(d) = date
        {
            day_of_week = weekday_name(d.weekday()).to_string();
        }
        SessionRecord {
            session_id: row.text(&["session_id", "sessionId", "id"]),
            date,
            day_of_week,
            time: row.text(&["time", "startTime"]),
            class_format: row.text(&["class_format", "classFormat", "format"]),
            cleaned_class: row.text(&["cleaned_class", "cleanedClass", "className", "class"]),
            trainer: row.text(&["trainer", "trainerName", "teacher"]),
            location: row.text(&["location"]),
            capacity: row.count(&["capacity"]),
            checked_in: row.count(&["checked_in", "checkedIn", "checkins"]),
            booked: row.count(&["booked", "bookings"]),
            late_cancelled: row.count(&["late_cancelled", "lateCancelled", "lateCancellations"]),
            non_paid: row.count(&["non_paid", "nonPaid"]),
            revenue: row.num(&["revenue", "totalRevenue", "totalPaid"]),
            memberships_used: row.count(&["memberships_used", "membershipsUsed", "memberships"]),
            packages_used: row.count(&["packages_used", "packagesUsed", "packages"]),
            intro_offers_used: row.count(&["intro_offers_used", "introOffersUsed", "introOffers"]),
            single_classes_used: row.count(&[
                "single_classes_used",
                "singleClassesUsed",
                "singleClasses",
            ]),
        }
    }
}

impl FromRow for SaleRecord {
    fn from_row(row: &Row<'_>) -> Self {
        SaleRecord {
            transaction_id: row.text(&[
                "transaction_id",
                "transactionId",
                "paymentTransactionId",
            ]),
            member_id: row.text(&["member_id", "memberId", "customerId"]),
            email: row.text(&["email", "customerEmail"]),
            product: row.text(&["product", "paymentItem", "item"]),
            category: row.text(&["category", "cleanedCategory"]),
            location: row.text(&["location", "calculatedLocation"]),
            sold_by: row.text(&["sold_by", "soldBy"]),
            payment_date: row.date(&["payment_date", "paymentDate", "date"]),
            amount: row.num(&["amount", "paymentValue", "value"]),
            discount_amount: row.num(&["discount_amount", "discountAmount"]),
            discount_percent: row.num(&[
                "discount_percent",
                "discountPercentage",
                "discountPercent",
            ]),
            membership_end: row.date(&["membership_end", "membershipEnd", "endDate"]),
            status: row.text(&["status", "paymentStatus"]),
        }
    }
}

impl FromRow for LeadRecord {
    fn from_row(row: &Row<'_>) -> Self {
        LeadRecord {
            lead_id: row.text(&["lead_id", "leadId", "id"]),
            source: row.text(&["source"]),
            stage: row.text(&["stage"]),
            trial_status: row.text(&["trial_status", "trialStatus"]),
            conversion_status: row.text(&["conversion_status", "conversionStatus"]),
            retention_status: row.text(&["retention_status", "retentionStatus"]),
            center: row.text(&["center", "centre", "location"]),
            associate: row.text(&["associate"]),
            ltv: row.num(&["ltv"]),
            visits: row.count(&["visits", "visitCount"]),
            created_at: row.date(&["created_at", "createdAt"]),
            converted_at: row.date(&["converted_at", "convertedAt", "conversionDate"]),
        }
    }
}

impl FromRow for CheckinRecord {
    fn from_row(row: &Row<'_>) -> Self {
        CheckinRecord {
            member_id: row.text(&["member_id", "memberId"]),
            session_id: row.text(&["session_id", "sessionId"]),
            date: row.date(&["date", "sessionDate"]),
            checked_in: row.flag(&["checked_in", "checkedIn"]),
            late_cancelled: row.flag(&["late_cancelled", "lateCancelled", "isLateCancelled"]),
            paid: row.num(&["paid", "paidAmount"]),
            location: row.text(&["location"]),
            cleaned_class: row.text(&["cleaned_class", "cleanedClass", "class"]),
            trainer: row.text(&["trainer", "teacher"]),
        }
    }
}

impl FromRow for CancellationRecord {
    fn from_row(row: &Row<'_>) -> Self {
        CancellationRecord {
            member_id: row.text(&["member_id", "memberId"]),
            location: row.text(&["location"]),
            trainer: row.text(&["trainer", "teacher"]),
            cleaned_class: row.text(&["cleaned_class", "cleanedClass", "class"]),
            paid_amount: row.num(&["paid_amount", "paidAmount", "paid"]),
            cancelled_at: row.datetime(&["cancelled_at", "cancelledAt", "cancelledTime", "date"]),
        }
    }
}

// ============================================================================
// File parsing
// ============================================================================

/// Records of one snapshot file plus the number of rows that were not objects
#[derive(Debug)]
pub struct ParsedFile<T> {
    pub records: Vec<T>,
    pub rejected: usize,
}

/// Parse a JSON array file row by row.
///
/// The file must be a JSON array; a row that is not an object is counted in
/// `rejected` and skipped.
pub(crate) fn parse_rows<T: FromRow>(path: &Path) -> Result<ParsedFile<T>, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let rows: Vec<Value> = serde_json::from_str(&content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut records = Vec::with_capacity(rows.len());
    let mut rejected = 0;
    for (i, row) in rows.iter().enumerate() {
        match row.as_object() {
            Some(object) => records.push(T::from_row(&Row::new(object))),
            None => {
                rejected += 1;
                if parse_debug_enabled() {
                    eprintln!("[DEBUG] {} row {}: not an object", path.display(), i);
                }
            }
        }
    }

    Ok(ParsedFile { records, rejected })
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn record<T: FromRow>(json: &str) -> T {
        let value: Value = serde_json::from_str(json).unwrap();
        T::from_row(&Row::new(value.as_object().unwrap()))
    }

    fn session(json: &str) -> SessionRecord {
        record(json)
    }

    #[test]
    fn numbers_from_numbers_and_strings() {
        let s = session(
            r#"{"capacity": 20, "checkedIn": "15", "revenue": "₹1,250.50", "booked": null}"#,
        );
        assert_eq!(s.capacity, 20);
        assert_eq!(s.checked_in, 15);
        assert_eq!(s.revenue, 1250.5);
        assert_eq!(s.booked, 0);
    }

    #[test]
    fn malformed_numbers_become_zero() {
        let s = session(r#"{"capacity": "lots", "checked_in": -4, "revenue": true}"#);
        assert_eq!(s.capacity, 0);
        assert_eq!(s.checked_in, 0);
        assert_eq!(s.revenue, 0.0);
    }

    #[test]
    fn snake_and_camel_keys_both_accepted() {
        let camel = session(r#"{"classFormat": "HIIT", "cleanedClass": "Burn"}"#);
        let snake = session(r#"{"class_format": "HIIT", "cleaned_class": "Burn"}"#);
        assert_eq!(camel.class_format, snake.class_format);
        assert_eq!(camel.cleaned_class, "Burn");
    }

    #[test]
    fn weekday_derived_from_date_when_blank() {
        let s = session(r#"{"date": "2025-06-02"}"#);
        assert_eq!(s.day_of_week, "Monday");
        let s = session(r#"{"date": "2025-06-02", "dayOfWeek": "Tue"}"#);
        assert_eq!(s.day_of_week, "Tue");
    }

    #[test]
    fn unparseable_date_is_none() {
        let s = session(r#"{"date": "next week"}"#);
        assert!(s.date.is_none());
        assert!(s.day_of_week.is_empty());
    }

    #[test]
    fn checkin_flags_from_strings() {
        let c: CheckinRecord =
            record(r#"{"memberId": 42, "checkedIn": "Yes", "isLateCancelled": "No"}"#);
        assert_eq!(c.member_id, "42");
        assert!(c.checked_in);
        assert!(!c.late_cancelled);
    }

    #[test]
    fn cancellation_date_only_becomes_midnight() {
        let c: CancellationRecord = record(r#"{"cancelledAt": "2025-06-02"}"#);
        let at = c.cancelled_at.unwrap();
        assert_eq!(at.format("%Y-%m-%d %H:%M").to_string(), "2025-06-02 00:00");
    }

    #[test]
    fn parse_rows_skips_non_object_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.json");
        fs::write(&path, r#"[{"memberId": "a", "paymentValue": 10}, 7, "x"]"#).unwrap();
        let parsed = parse_rows::<SaleRecord>(&path).unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.rejected, 2);
        assert_eq!(parsed.records[0].amount, 10.0);
    }

    #[test]
    fn parse_rows_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leads.json");
        fs::write(&path, "{not json").unwrap();
        let err = parse_rows::<LeadRecord>(&path).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn parse_rows_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_rows::<LeadRecord>(&dir.path().join("none.json")).unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
    }

    #[test]
    fn raw_and_cleaned_columns_in_one_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.json");
        fs::write(
            &path,
            r#"[
                {"sessionId": "s1", "id": "row-7", "capacity": 10, "checkedIn": 8},
                {"class": "Barre 57", "cleanedClass": "Barre", "capacity": 20}
            ]"#,
        )
        .unwrap();
        let parsed = parse_rows::<SessionRecord>(&path).unwrap();
        assert_eq!(parsed.rejected, 0);
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[0].session_id, "s1");
        assert_eq!(parsed.records[0].checked_in, 8);
        assert_eq!(parsed.records[1].cleaned_class, "Barre");
    }

    #[test]
    fn sale_and_lead_with_duplicate_spellings_load() {
        let sale: SaleRecord = record(
            r#"{"date": "2025-01-01", "paymentDate": "2025-02-03", "value": 5, "paymentValue": 40}"#,
        );
        assert_eq!(sale.payment_date, NaiveDate::from_ymd_opt(2025, 2, 3));
        assert_eq!(sale.amount, 40.0);

        let lead: LeadRecord = record(r#"{"center": "Kwality House", "location": "Bandra"}"#);
        assert_eq!(lead.center, "Kwality House");
    }

    #[test]
    fn null_cell_falls_through_to_next_spelling() {
        let s = session(r#"{"checked_in": null, "checkedIn": 6, "capacity": [1, 2]}"#);
        assert_eq!(s.checked_in, 6);
        assert_eq!(s.capacity, 0);
    }
}
