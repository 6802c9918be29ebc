//! Persistence of the merged table as a flat `Date,GHI,PR` CSV.

use std::{
    fs::{self, File},
    path::Path,
};

use anyhow::{anyhow, Context, Result};
use polars::prelude::*;
use prwatch_core::{parse_date, DateRecord, Measure, MergedTable, PrError, DATE_FORMAT};

/// Header of the merged file, in column order.
pub const MERGED_COLUMNS: [&str; 3] = ["Date", "GHI", "PR"];

pub fn table_to_frame(table: &MergedTable) -> Result<DataFrame> {
    let dates: Vec<String> = table
        .iter()
        .map(|r| r.date.format(DATE_FORMAT).to_string())
        .collect();
    let ghi = table.values(Measure::Ghi);
    let pr = table.values(Measure::Pr);

    DataFrame::new(vec![
        Series::new(MERGED_COLUMNS[0], dates),
        Series::new(MERGED_COLUMNS[1], ghi),
        Series::new(MERGED_COLUMNS[2], pr),
    ])
    .context("building merged frame")
}

/// Write the table; missing values become empty cells.
pub fn write_table(table: &MergedTable, path: &Path) -> Result<()> {
    let mut df = table_to_frame(table)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)
        .with_context(|| format!("writing CSV file {}", path.display()))
}

/// Load a table previously written by [`write_table`].
pub fn read_table(path: &Path) -> Result<MergedTable> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("opening {}", path.display()))?;
    if contents.lines().skip(1).all(|line| line.trim().is_empty()) {
        return Ok(MergedTable::new());
    }
    let df = read_text_frame(path)?;
    frame_to_table(&df)
}

/// Read a CSV with every column as text; callers cast the columns they use.
///
/// No schema is inferred, so integral leading rows cannot reject a later
/// decimal value.
pub fn read_text_frame(path: &Path) -> Result<DataFrame> {
    let mut file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    CsvReader::new(&mut file)
        .has_header(true)
        .infer_schema(Some(0))
        .finish()
        .with_context(|| format!("reading CSV file {}", path.display()))
}

/// Column whose header equals `name` once a byte-order mark and blanks are stripped.
pub fn column_named<'a>(df: &'a DataFrame, name: &str) -> Option<&'a Series> {
    df.get_columns()
        .iter()
        .find(|series| series.name().trim_start_matches('\u{feff}').trim() == name)
}

fn missing_column(name: &str) -> anyhow::Error {
    PrError::Frame(format!("missing {name} column")).into()
}

pub fn frame_to_table(df: &DataFrame) -> Result<MergedTable> {
    let date_series = column_named(df, MERGED_COLUMNS[0])
        .ok_or_else(|| missing_column(MERGED_COLUMNS[0]))?
        .cast(&DataType::Utf8)
        .context("casting Date column to text")?;
    let ghi_series = column_named(df, MERGED_COLUMNS[1])
        .ok_or_else(|| missing_column(MERGED_COLUMNS[1]))?
        .cast(&DataType::Float64)
        .context("casting GHI column to Float64")?;
    let pr_series = column_named(df, MERGED_COLUMNS[2])
        .ok_or_else(|| missing_column(MERGED_COLUMNS[2]))?
        .cast(&DataType::Float64)
        .context("casting PR column to Float64")?;

    let dates = date_series.utf8()?;
    let ghi = ghi_series.f64()?;
    let pr = pr_series.f64()?;

    let mut records = Vec::with_capacity(df.height());
    for (idx, ((date, ghi), pr)) in dates
        .into_iter()
        .zip(ghi.into_iter())
        .zip(pr.into_iter())
        .enumerate()
    {
        let raw = date.ok_or_else(|| anyhow!("empty date on line {}", idx + 2))?;
        let date = parse_date(raw).with_context(|| format!("line {}", idx + 2))?;
        let mut record = DateRecord::new(date);
        record.set(Measure::Ghi, ghi);
        record.set(Measure::Pr, pr);
        records.push(record);
    }
    Ok(MergedTable::from_records(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> MergedTable {
        MergedTable::from_records(vec![
            DateRecord::new(day(2024, 1, 1)).with_pr(80.5).with_ghi(4.25),
            DateRecord::new(day(2024, 1, 2)).with_pr(78.0),
            DateRecord::new(day(2024, 1, 3)).with_ghi(1.5),
        ])
    }

    #[test]
    fn written_file_has_expected_layout() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out/processed_data.csv");
        write_table(&sample(), &path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("Date,GHI,PR"));
        assert!(lines.next().unwrap().starts_with("2024-01-01,4.25,80.5"));
        assert!(lines.next().unwrap().starts_with("2024-01-02,,78"));
        assert_eq!(lines.next(), Some("2024-01-03,1.5,"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn reload_reproduces_triples() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("processed_data.csv");
        let table = sample();
        write_table(&table, &path).unwrap();
        let reloaded = read_table(&path).unwrap();
        assert_eq!(reloaded, table);
    }

    #[test]
    fn header_only_file_is_an_empty_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_table(&MergedTable::new(), &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap().trim(), "Date,GHI,PR");
        assert!(read_table(&path).unwrap().is_empty());
    }

    #[test]
    fn reload_keeps_decimals_after_whole_number_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("processed_data.csv");
        let start = day(2023, 1, 1);
        let table = MergedTable::from_records((0..130).map(|i| {
            let pr = if i < 110 { 80.0 } else { 80.25 };
            DateRecord::new(start + chrono::Duration::days(i)).with_pr(pr)
        }));
        write_table(&table, &path).unwrap();

        let reloaded = read_table(&path).unwrap();
        assert_eq!(reloaded.len(), 130);
        assert_eq!(reloaded.last_date(), table.last_date());
        assert_eq!(reloaded.iter().last().unwrap().pr, Some(80.25));
    }

    #[test]
    fn reading_rejects_files_without_merged_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("other.csv");
        fs::write(&path, "Date,PR\n2024-01-01,80\n").unwrap();
        let err = read_table(&path).unwrap_err();
        assert!(format!("{err:#}").contains("GHI"));
        assert!(matches!(err.downcast_ref::<PrError>(), Some(PrError::Frame(_))));
    }
}
