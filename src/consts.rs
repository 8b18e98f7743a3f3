/// Standard date format used throughout the codebase: "2025-01-15"
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Month label shown in comparison tables: "Jan 2025"
pub const MONTH_LABEL_FORMAT: &str = "%b %Y";

/// Fallback bucket for blank grouping keys (trainer, location, class, ...)
pub const UNKNOWN: &str = "Unknown";

/// Size of the "recent" and "previous" windows used by trend scoring, in months
pub const TREND_WINDOW_MONTHS: usize = 3;

/// Largest trend window a config file may ask for
pub const MAX_TREND_WINDOW_MONTHS: usize = 12;

/// Default trailing window for monthly comparison tables
pub const DEFAULT_TRAILING_MONTHS: usize = 6;
