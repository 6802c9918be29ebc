//! Daily PR/GHI records and the date-ordered table built from them.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{PrError, PrResult};

/// Canonical on-disk date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const DATE_ONLY_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Parse a calendar day from a source cell, dropping any time of day.
pub fn parse_date(raw: &str) -> PrResult<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PrError::Parse("empty date".to_string()));
    }
    for format in DATE_ONLY_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date);
        }
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(stamp) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(stamp.date());
        }
    }
    Err(PrError::Parse(format!("unrecognised date '{trimmed}'")))
}

/// Which measurement a source file carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Measure {
    /// Performance ratio, percent
    Pr,
    /// Daily global horizontal irradiation, kWh/m2
    Ghi,
}

impl Measure {
    /// Column header carrying this measure in source and merged files.
    pub fn column(self) -> &'static str {
        match self {
            Measure::Pr => "PR",
            Measure::Ghi => "GHI",
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// One calendar day with optional PR and GHI values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DateRecord {
    pub date: NaiveDate,
    pub pr: Option<f64>,
    pub ghi: Option<f64>,
}

impl DateRecord {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            pr: None,
            ghi: None,
        }
    }

    pub fn with_pr(mut self, pr: f64) -> Self {
        self.pr = Some(pr);
        self
    }

    pub fn with_ghi(mut self, ghi: f64) -> Self {
        self.ghi = Some(ghi);
        self
    }

    pub fn get(&self, measure: Measure) -> Option<f64> {
        match measure {
            Measure::Pr => self.pr,
            Measure::Ghi => self.ghi,
        }
    }

    /// Overwrite one field. `None` clears a previously stored value.
    pub fn set(&mut self, measure: Measure, value: Option<f64>) {
        let value = value.filter(|v| !v.is_nan());
        match measure {
            Measure::Pr => self.pr = value,
            Measure::Ghi => self.ghi = value,
        }
    }
}

/// Date-ordered table of daily records.
///
/// Dates are strictly ascending and unique for every value of this type; the
/// constructors sort and collapse duplicates, so consumers never re-check.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergedTable {
    records: Vec<DateRecord>,
}

impl MergedTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from records in any order.
    ///
    /// Records sharing a date are folded in iteration order: each present
    /// field of a later record replaces the earlier one.
    pub fn from_records(records: impl IntoIterator<Item = DateRecord>) -> Self {
        let mut by_date: BTreeMap<NaiveDate, DateRecord> = BTreeMap::new();
        for record in records {
            let entry = by_date
                .entry(record.date)
                .or_insert_with(|| DateRecord::new(record.date));
            if record.pr.is_some() {
                entry.pr = record.pr;
            }
            if record.ghi.is_some() {
                entry.ghi = record.ghi;
            }
        }
        Self::from(by_date)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DateRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DateRecord> {
        self.records
            .binary_search_by_key(&date, |r| r.date)
            .ok()
            .map(|idx| &self.records[idx])
    }

    /// Records with `start <= date <= end`; an absent bound is open.
    pub fn filter_range(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        let records = self
            .records
            .iter()
            .filter(|r| start.map_or(true, |s| r.date >= s))
            .filter(|r| end.map_or(true, |e| r.date <= e))
            .copied()
            .collect();
        Self { records }
    }

    /// Column of one measure in date order.
    pub fn values(&self, measure: Measure) -> Vec<Option<f64>> {
        self.records.iter().map(|r| r.get(measure)).collect()
    }

    pub fn coverage(&self) -> Coverage {
        let mut coverage = Coverage {
            total_dates: self.records.len(),
            first_date: self.first_date(),
            last_date: self.last_date(),
            ..Coverage::default()
        };
        for record in &self.records {
            match (record.pr.is_some(), record.ghi.is_some()) {
                (true, true) => coverage.both += 1,
                (true, false) => coverage.pr_only += 1,
                (false, true) => coverage.ghi_only += 1,
                (false, false) => coverage.neither += 1,
            }
        }
        coverage
    }
}

impl From<BTreeMap<NaiveDate, DateRecord>> for MergedTable {
    fn from(map: BTreeMap<NaiveDate, DateRecord>) -> Self {
        Self {
            records: map.into_values().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a MergedTable {
    type Item = &'a DateRecord;
    type IntoIter = std::slice::Iter<'a, DateRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Presence counts over a merged table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Coverage {
    pub total_dates: usize,
    pub both: usize,
    pub pr_only: usize,
    pub ghi_only: usize,
    /// Dates present in the table with neither value (a source row with a
    /// date but an empty cell).
    pub neither: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

impl Coverage {
    pub fn with_pr(&self) -> usize {
        self.both + self.pr_only
    }

    pub fn with_ghi(&self) -> usize {
        self.both + self.ghi_only
    }

    pub fn missing_pr(&self) -> usize {
        self.total_dates - self.with_pr()
    }

    pub fn missing_ghi(&self) -> usize {
        self.total_dates - self.with_ghi()
    }

    /// Share of dates carrying both values, in percent; 0 for an empty table.
    pub fn combined_percent(&self) -> f64 {
        if self.total_dates == 0 {
            0.0
        } else {
            self.both as f64 / self.total_dates as f64 * 100.0
        }
    }
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total dates: {}", self.total_dates)?;
        writeln!(f, "  Dates with PR data: {}", self.with_pr())?;
        writeln!(f, "  Dates with GHI data: {}", self.with_ghi())?;
        writeln!(
            f,
            "  Dates with both PR and GHI: {} ({:.1}%)",
            self.both,
            self.combined_percent()
        )?;
        writeln!(f, "  Dates with PR only: {}", self.pr_only)?;
        writeln!(f, "  Dates with GHI only: {}", self.ghi_only)?;
        writeln!(f, "  Missing PR values: {}", self.missing_pr())?;
        writeln!(f, "  Missing GHI values: {}", self.missing_ghi())?;
        match (self.first_date, self.last_date) {
            (Some(first), Some(last)) => write!(
                f,
                "  Date range: {} to {}",
                first.format(DATE_FORMAT),
                last.format(DATE_FORMAT)
            ),
            _ => write!(f, "  Date range: (empty)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_date_accepts_common_forms() {
        assert_eq!(parse_date("2024-01-02").unwrap(), day(2024, 1, 2));
        assert_eq!(parse_date(" 2024/01/02 ").unwrap(), day(2024, 1, 2));
        assert_eq!(parse_date("2024-01-02 13:45:00").unwrap(), day(2024, 1, 2));
        assert_eq!(parse_date("2024-01-02T00:00:00").unwrap(), day(2024, 1, 2));
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert!(matches!(parse_date(""), Err(PrError::Parse(_))));
        assert!(matches!(parse_date("yesterday"), Err(PrError::Parse(_))));
        assert!(parse_date("2024-13-01").is_err());
    }

    #[test]
    fn from_records_sorts_and_dedups() {
        let table = MergedTable::from_records(vec![
            DateRecord::new(day(2024, 1, 3)).with_pr(80.0),
            DateRecord::new(day(2024, 1, 1)).with_ghi(3.0),
            DateRecord::new(day(2024, 1, 3)).with_ghi(5.5),
            DateRecord::new(day(2024, 1, 1)).with_pr(70.0),
        ]);

        let dates: Vec<_> = table.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![day(2024, 1, 1), day(2024, 1, 3)]);
        assert_eq!(table.get(day(2024, 1, 3)).unwrap().pr, Some(80.0));
        assert_eq!(table.get(day(2024, 1, 3)).unwrap().ghi, Some(5.5));
        assert_eq!(table.get(day(2024, 1, 1)).unwrap().pr, Some(70.0));
        assert!(table.get(day(2024, 1, 2)).is_none());
    }

    #[test]
    fn set_none_clears_and_nan_is_missing() {
        let mut record = DateRecord::new(day(2024, 1, 1)).with_pr(81.0);
        record.set(Measure::Pr, None);
        assert_eq!(record.pr, None);
        record.set(Measure::Ghi, Some(f64::NAN));
        assert_eq!(record.ghi, None);
    }

    #[test]
    fn filter_range_is_inclusive() {
        let table = MergedTable::from_records(
            (1..=5).map(|d| DateRecord::new(day(2024, 3, d)).with_pr(d as f64)),
        );
        let filtered = table.filter_range(Some(day(2024, 3, 2)), Some(day(2024, 3, 4)));
        assert_eq!(filtered.len(), 3);
        assert_eq!(filtered.first_date(), Some(day(2024, 3, 2)));
        assert_eq!(filtered.last_date(), Some(day(2024, 3, 4)));

        let open_end = table.filter_range(Some(day(2024, 3, 4)), None);
        assert_eq!(open_end.len(), 2);
    }

    #[test]
    fn coverage_counts_each_side() {
        let table = MergedTable::from_records(vec![
            DateRecord::new(day(2024, 1, 1)).with_pr(80.0).with_ghi(4.0),
            DateRecord::new(day(2024, 1, 2)).with_pr(79.0),
            DateRecord::new(day(2024, 1, 3)).with_ghi(1.5),
            DateRecord::new(day(2024, 1, 4)),
        ]);
        let coverage = table.coverage();
        assert_eq!(coverage.total_dates, 4);
        assert_eq!(coverage.both, 1);
        assert_eq!(coverage.pr_only, 1);
        assert_eq!(coverage.ghi_only, 1);
        assert_eq!(coverage.neither, 1);
        assert_eq!(coverage.missing_pr(), 2);
        assert_eq!(coverage.missing_ghi(), 2);
        assert!((coverage.combined_percent() - 25.0).abs() < 1e-12);
    }

    #[test]
    fn empty_coverage_reports_zero_percent() {
        let coverage = MergedTable::new().coverage();
        assert_eq!(coverage.combined_percent(), 0.0);
        assert!(coverage.to_string().contains("Date range: (empty)"));
    }
}
