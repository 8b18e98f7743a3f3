//! Snapshot data access layer
//!
//! Each record kind (sessions, sales, ...) implements the Source trait to
//! provide a unified interface for discovering and parsing its snapshot files.

pub mod loader;
mod schema;

use std::path::{Path, PathBuf};

use crate::core::{CancellationRecord, CheckinRecord, LeadRecord, SaleRecord, SessionRecord};
use crate::error::LoadError;

pub use loader::{KindLoad, LoadOptions, Snapshot, SnapshotKind, load_kind, load_snapshot};
pub use schema::ParsedFile;

use schema::parse_rows;

/// One kind of snapshot file inside the data directory
pub trait Source: Send + Sync {
    type Record: Send;

    /// File name prefix: `<data-dir>/<name>*.json`
    fn name(&self) -> &'static str;

    /// Display name for progress output
    fn display_name(&self) -> &'static str {
        self.name()
    }

    /// All snapshot files of this kind, in path order
    fn find_files(&self, dir: &Path) -> Vec<PathBuf> {
        let pattern = format!(
            "{}/{}*.json",
            glob::Pattern::escape(&dir.to_string_lossy()),
            self.name()
        );
        let mut files: Vec<PathBuf> = match glob::glob(&pattern) {
            Ok(entries) => entries.flatten().filter(|p| p.is_file()).collect(),
            Err(_) => Vec::new(),
        };
        files.sort();
        files
    }

    /// Parse a single snapshot file
    fn parse_file(&self, path: &Path) -> Result<ParsedFile<Self::Record>, LoadError>;
}

pub struct SessionsSource;

impl Source for SessionsSource {
    type Record = SessionRecord;

    fn name(&self) -> &'static str {
        "sessions"
    }

    fn parse_file(&self, path: &Path) -> Result<ParsedFile<SessionRecord>, LoadError> {
        parse_rows::<SessionRecord>(path)
    }
}

pub struct SalesSource;

impl Source for SalesSource {
    type Record = SaleRecord;

    fn name(&self) -> &'static str {
        "sales"
    }

    fn parse_file(&self, path: &Path) -> Result<ParsedFile<SaleRecord>, LoadError> {
        parse_rows::<SaleRecord>(path)
    }
}

pub struct LeadsSource;

impl Source for LeadsSource {
    type Record = LeadRecord;

    fn name(&self) -> &'static str {
        "leads"
    }

    fn parse_file(&self, path: &Path) -> Result<ParsedFile<LeadRecord>, LoadError> {
        parse_rows::<LeadRecord>(path)
    }
}

pub struct CheckinsSource;

impl Source for CheckinsSource {
    type Record = CheckinRecord;

    fn name(&self) -> &'static str {
        "checkins"
    }

    fn display_name(&self) -> &'static str {
        "check-in"
    }

    fn parse_file(&self, path: &Path) -> Result<ParsedFile<CheckinRecord>, LoadError> {
        parse_rows::<CheckinRecord>(path)
    }
}

pub struct CancellationsSource;

impl Source for CancellationsSource {
    type Record = CancellationRecord;

    fn name(&self) -> &'static str {
        "cancellations"
    }

    fn display_name(&self) -> &'static str {
        "cancellation"
    }

    fn parse_file(&self, path: &Path) -> Result<ParsedFile<CancellationRecord>, LoadError> {
        parse_rows::<CancellationRecord>(path)
    }
}
