//! Parallel snapshot loader for all record kinds

use rayon::prelude::*;
use std::path::Path;
use std::time::Instant;

use crate::core::{CancellationRecord, CheckinRecord, LeadRecord, SaleRecord, SessionRecord};
use crate::error::{AppError, LoadError};
use crate::source::{
    CancellationsSource, CheckinsSource, LeadsSource, ParsedFile, SalesSource, SessionsSource,
    Source,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    pub quiet: bool,
    pub debug: bool,
}

/// Which record kinds a report needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    Sessions,
    Sales,
    Leads,
    Checkins,
    Cancellations,
}

/// Every record loaded from one data directory; kinds not requested stay empty
#[derive(Debug, Default)]
pub struct Snapshot {
    pub sessions: Vec<SessionRecord>,
    pub sales: Vec<SaleRecord>,
    pub leads: Vec<LeadRecord>,
    pub checkins: Vec<CheckinRecord>,
    pub cancellations: Vec<CancellationRecord>,
    /// Files that could not be read or parsed
    pub failed_files: usize,
    /// Rows that were not JSON objects
    pub rejected_rows: usize,
    pub elapsed_ms: f64,
}

/// Per-kind result of one load
#[derive(Debug)]
pub struct KindLoad<T> {
    pub records: Vec<T>,
    pub files: usize,
    pub failed_files: usize,
    pub rejected_rows: usize,
}

impl<T> Default for KindLoad<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            files: 0,
            failed_files: 0,
            rejected_rows: 0,
        }
    }
}

struct DataLoader<'a> {
    dir: &'a Path,
    options: LoadOptions,
}

impl<'a> DataLoader<'a> {
    fn new(dir: &'a Path, options: LoadOptions) -> Self {
        Self { dir, options }
    }

    /// Parallel file pipeline: discover → parse → merge in path order.
    /// A file that fails is reported and skipped.
    fn par_process<S: Source>(&self, source: &S) -> KindLoad<S::Record> {
        let discovery_start = Instant::now();
        let files = source.find_files(self.dir);
        let discovery_ms = discovery_start.elapsed().as_secs_f64() * 1000.0;

        if files.is_empty() {
            if self.options.debug && !self.options.quiet {
                eprintln!("[DEBUG] No {} files in {}", source.name(), self.dir.display());
            }
            return KindLoad::default();
        }

        if !self.options.quiet {
            eprintln!(
                "Scanning {} {} files... ({:.2}ms)",
                files.len(),
                source.display_name(),
                discovery_ms
            );
        }

        let parse_start = Instant::now();
        let parsed: Vec<Result<ParsedFile<S::Record>, LoadError>> =
            files.par_iter().map(|path| source.parse_file(path)).collect();
        let parse_ms = parse_start.elapsed().as_secs_f64() * 1000.0;

        let mut load = KindLoad {
            files: files.len(),
            ..KindLoad::default()
        };
        for result in parsed {
            match result {
                Ok(file) => {
                    load.rejected_rows += file.rejected;
                    load.records.extend(file.records);
                }
                Err(e) => {
                    load.failed_files += 1;
                    if !self.options.quiet {
                        eprintln!("Warning: {e}");
                    }
                }
            }
        }

        if !self.options.quiet {
            eprintln!(
                "Parsed {} {} records ({:.2}ms)",
                load.records.len(),
                source.display_name(),
                parse_ms
            );
        }
        if self.options.debug && !self.options.quiet && load.rejected_rows > 0 {
            eprintln!(
                "[DEBUG] Skipped {} malformed {} rows",
                load.rejected_rows,
                source.name()
            );
        }

        load
    }
}

/// Load one record kind from `dir`
pub fn load_kind<S: Source>(source: &S, dir: &Path, options: LoadOptions) -> KindLoad<S::Record> {
    DataLoader::new(dir, options).par_process(source)
}

/// Load the requested record kinds from a data directory
pub fn load_snapshot(
    dir: &Path,
    kinds: &[SnapshotKind],
    options: LoadOptions,
) -> Result<Snapshot, AppError> {
    if !dir.is_dir() {
        return Err(AppError::DataDirNotFound {
            path: dir.to_path_buf(),
        });
    }

    let start = Instant::now();
    let loader = DataLoader::new(dir, options);
    let mut snapshot = Snapshot::default();

    fn absorb<T>(load: KindLoad<T>, snapshot: &mut Snapshot) -> Vec<T> {
        snapshot.failed_files += load.failed_files;
        snapshot.rejected_rows += load.rejected_rows;
        load.records
    }

    for kind in kinds {
        match kind {
            SnapshotKind::Sessions => {
                let load = loader.par_process(&SessionsSource);
                snapshot.sessions = absorb(load, &mut snapshot);
            }
            SnapshotKind::Sales => {
                let load = loader.par_process(&SalesSource);
                snapshot.sales = absorb(load, &mut snapshot);
            }
            SnapshotKind::Leads => {
                let load = loader.par_process(&LeadsSource);
                snapshot.leads = absorb(load, &mut snapshot);
            }
            SnapshotKind::Checkins => {
                let load = loader.par_process(&CheckinsSource);
                snapshot.checkins = absorb(load, &mut snapshot);
            }
            SnapshotKind::Cancellations => {
                let load = loader.par_process(&CancellationsSource);
                snapshot.cancellations = absorb(load, &mut snapshot);
            }
        }
    }

    snapshot.elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    Ok(snapshot)
}
