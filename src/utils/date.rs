use chrono::{NaiveDate, NaiveDateTime};

use crate::consts::DATE_FORMAT;
use crate::error::AppError;

/// Parse a CLI date argument: YYYYMMDD or YYYY-MM-DD
pub fn parse_date(s: &str) -> Result<NaiveDate, AppError> {
    let s = s.trim();
    if s.len() == 8
        && let Ok(d) = NaiveDate::parse_from_str(s, "%Y%m%d")
    {
        return Ok(d);
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| AppError::InvalidDate {
        input: s.to_string(),
    })
}

const DATE_FORMATS: &[&str] = &[DATE_FORMAT, "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d", "%d %b %Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d/%m/%Y, %H:%M:%S",
];

/// Lenient timestamp parsing for snapshot cells.
///
/// Accepts RFC 3339, the common spreadsheet datetime layouts, and plain
/// dates (which become midnight).
pub fn parse_datetime_cell(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| parse_plain_date(s).and_then(|d| d.and_hms_opt(0, 0, 0)))
}

fn parse_plain_date(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Lenient date parsing for snapshot cells; datetimes keep their date part
pub fn parse_date_cell(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    parse_plain_date(s).or_else(|| {
        if s.len() > 10 {
            parse_datetime_cell(s).map(|dt| dt.date())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parse_date_compact_and_dashed() {
        assert_eq!(parse_date("20250301").unwrap(), d(2025, 3, 1));
        assert_eq!(parse_date("2025-03-01").unwrap(), d(2025, 3, 1));
    }

    #[test]
    fn parse_date_rejects_garbage() {
        let err = parse_date("March").unwrap_err();
        assert!(matches!(err, AppError::InvalidDate { .. }));
        assert!(parse_date("20251301").is_err());
    }

    #[test]
    fn date_cell_formats() {
        assert_eq!(parse_date_cell("2025-03-01"), Some(d(2025, 3, 1)));
        assert_eq!(parse_date_cell("01/03/2025"), Some(d(2025, 3, 1)));
        assert_eq!(parse_date_cell("1 Mar 2025"), Some(d(2025, 3, 1)));
        assert_eq!(parse_date_cell("2025-03-01 18:30:00"), Some(d(2025, 3, 1)));
        assert_eq!(parse_date_cell(""), None);
        assert_eq!(parse_date_cell("soon"), None);
    }

    #[test]
    fn datetime_cell_formats() {
        let dt = parse_datetime_cell("2025-03-01T18:30:00Z").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2025-03-01 18:30");
        let dt = parse_datetime_cell("01/03/2025 07:15").unwrap();
        assert_eq!(dt.format("%H:%M").to_string(), "07:15");
        let midnight = parse_datetime_cell("2025-03-01").unwrap();
        assert_eq!(midnight.format("%H:%M:%S").to_string(), "00:00:00");
        assert!(parse_datetime_cell("later").is_none());
    }
}
