use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use polars::prelude::*;
use prwatch_core::{parse_date, Coverage, DateRecord, Diagnostics, Measure, MergedTable};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::table::{column_named, read_text_frame};

/// CSV files found under one source root.
#[derive(Debug, Clone, Default)]
pub struct SourceScan {
    pub root: PathBuf,
    pub exists: bool,
    /// Sorted by full path.
    pub files: Vec<PathBuf>,
}

/// Result of folding both source trees into one table.
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    pub table: MergedTable,
    pub diagnostics: Diagnostics,
    pub pr_scan: SourceScan,
    pub ghi_scan: SourceScan,
    pub files_read: usize,
    pub files_skipped: usize,
    pub rows_skipped: usize,
}

impl MergeOutcome {
    pub fn coverage(&self) -> Coverage {
        self.table.coverage()
    }
}

/// One data row of a source file. `line` is the 1-based line in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    pub line: usize,
    pub date: Option<String>,
    pub value: Option<f64>,
}

/// Recursively collect `*.csv` files under `root`.
///
/// A missing root is recorded as a warning and yields no files.
pub fn discover_csv_files(root: &Path, diagnostics: &mut Diagnostics) -> SourceScan {
    let entity = root.display().to_string();
    if !root.is_dir() {
        warn!("source directory {} not found; treating it as empty", entity);
        diagnostics.missing_source(&entity);
        return SourceScan {
            root: root.to_path_buf(),
            exists: false,
            files: Vec::new(),
        };
    }

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("skipping unreadable entry under {}: {}", entity, err);
                diagnostics.unreadable_entry(&entity, &err.to_string());
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_csv(entry.path()))
        .map(|entry| entry.into_path())
        .collect();
    files.sort();

    SourceScan {
        root: root.to_path_buf(),
        exists: true,
        files,
    }
}

pub fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"))
}

/// Read the `Date` column and the measure's column from one source file.
pub fn read_source_file(path: &Path, measure: Measure) -> Result<Vec<SourceRow>> {
    let df = read_text_frame(path)?;

    let date_series = column_named(&df, "Date")
        .context("missing Date column")?
        .cast(&DataType::Utf8)
        .context("casting Date column to text")?;
    let value_series = column_named(&df, measure.column())
        .with_context(|| format!("missing {} column", measure.column()))?
        .cast(&DataType::Float64)
        .with_context(|| format!("casting {} column to Float64", measure.column()))?;

    let dates = date_series.utf8()?;
    let values = value_series.f64()?;

    Ok(dates
        .into_iter()
        .zip(values.into_iter())
        .enumerate()
        .map(|(idx, (date, value))| SourceRow {
            // header occupies line 1
            line: idx + 2,
            date: date.map(str::to_owned),
            value,
        })
        .collect())
}

/// Fold the PR tree and then the GHI tree into one table keyed by date.
///
/// Files are visited in sorted path order and the last write wins per
/// (date, field), so repeated runs over the same trees give the same table.
/// Unreadable files and rows with unparseable dates are recorded in the
/// outcome's diagnostics and skipped.
pub fn merge_sources(pr_root: &Path, ghi_root: &Path) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();
    let mut by_date: BTreeMap<NaiveDate, DateRecord> = BTreeMap::new();

    outcome.pr_scan = discover_csv_files(pr_root, &mut outcome.diagnostics);
    info!("Found {} PR files", outcome.pr_scan.files.len());
    let pr_files = outcome.pr_scan.files.clone();
    fold_files(&pr_files, Measure::Pr, &mut by_date, &mut outcome);
    info!("Loaded PR data for {} dates", by_date.len());

    outcome.ghi_scan = discover_csv_files(ghi_root, &mut outcome.diagnostics);
    info!("Found {} GHI files", outcome.ghi_scan.files.len());
    let ghi_files = outcome.ghi_scan.files.clone();
    fold_files(&ghi_files, Measure::Ghi, &mut by_date, &mut outcome);

    outcome.table = MergedTable::from(by_date);
    info!(
        "Merged {} dates from {} files ({} skipped)",
        outcome.table.len(),
        outcome.files_read,
        outcome.files_skipped
    );
    outcome
}

fn fold_files(
    files: &[PathBuf],
    measure: Measure,
    by_date: &mut BTreeMap<NaiveDate, DateRecord>,
    outcome: &mut MergeOutcome,
) {
    for path in files {
        let entity = path.display().to_string();
        let rows = match read_source_file(path, measure) {
            Ok(rows) => rows,
            Err(err) => {
                warn!("Error processing {}: {:#}", entity, err);
                outcome.diagnostics.skipped_file(&entity, &format!("{err:#}"));
                outcome.files_skipped += 1;
                continue;
            }
        };
        debug!("{}: {} rows of {}", entity, rows.len(), measure);
        outcome.files_read += 1;
        outcome.rows_skipped +=
            fold_rows(&rows, measure, &entity, by_date, &mut outcome.diagnostics);
    }
}

/// Apply rows to the date map, returning how many were skipped.
pub fn fold_rows(
    rows: &[SourceRow],
    measure: Measure,
    entity: &str,
    by_date: &mut BTreeMap<NaiveDate, DateRecord>,
    diagnostics: &mut Diagnostics,
) -> usize {
    let mut skipped = 0;
    for row in rows {
        let parsed = match row.date.as_deref() {
            Some(raw) => parse_date(raw).map_err(|err| err.to_string()),
            None => Err("empty date".to_string()),
        };
        let date = match parsed {
            Ok(date) => date,
            Err(reason) => {
                debug!("{}:{} skipped: {}", entity, row.line, reason);
                diagnostics.skipped_row(entity, row.line, &reason);
                skipped += 1;
                continue;
            }
        };
        by_date
            .entry(date)
            .or_insert_with(|| DateRecord::new(date))
            .set(measure, row.value);
    }
    skipped
}
