use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid date \"{input}\" (expected YYYYMMDD or YYYY-MM-DD)")]
    InvalidDate { input: String },

    #[error("Invalid timezone: {input}")]
    InvalidTimezone { input: String },

    #[error("Unsupported locale: {input}")]
    UnsupportedLocale { input: String },

    #[error("Unknown segment \"{input}\" (expected one of: {expected})")]
    UnknownSegment { input: String, expected: String },

    #[error("Data directory not found: {}", path.display())]
    DataDirNotFound { path: PathBuf },
}

/// Failure to turn one snapshot file into records
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl LoadError {
    pub fn path(&self) -> &PathBuf {
        match self {
            LoadError::Read { path, .. } | LoadError::Parse { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_error_display_date() {
        let e = AppError::InvalidDate {
            input: "abc".to_string(),
        };
        assert_eq!(
            e.to_string(),
            r#"Invalid date "abc" (expected YYYYMMDD or YYYY-MM-DD)"#
        );
    }

    #[test]
    fn app_error_display_timezone() {
        let e = AppError::InvalidTimezone {
            input: "Mars/Olympus".to_string(),
        };
        assert_eq!(e.to_string(), "Invalid timezone: Mars/Olympus");
    }

    #[test]
    fn app_error_display_locale() {
        let e = AppError::UnsupportedLocale {
            input: "xx".to_string(),
        };
        assert_eq!(e.to_string(), "Unsupported locale: xx");
    }

    #[test]
    fn app_error_display_segment() {
        let e = AppError::UnknownSegment {
            input: "vip".to_string(),
            expected: "high-value, engaged".to_string(),
        };
        assert_eq!(
            e.to_string(),
            r#"Unknown segment "vip" (expected one of: high-value, engaged)"#
        );
    }

    #[test]
    fn app_error_display_data_dir() {
        let e = AppError::DataDirNotFound {
            path: PathBuf::from("/nope"),
        };
        assert_eq!(e.to_string(), "Data directory not found: /nope");
    }

    #[test]
    fn load_error_parse_names_file() {
        let source = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let e = LoadError::Parse {
            path: PathBuf::from("sessions.json"),
            source,
        };
        assert!(e.to_string().starts_with("Failed to parse sessions.json: "));
        assert_eq!(e.path(), &PathBuf::from("sessions.json"));
    }

    #[test]
    fn load_error_read_names_file() {
        let e = LoadError::Read {
            path: PathBuf::from("sales.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(e.to_string(), "Failed to read sales.json: missing");
    }
}
