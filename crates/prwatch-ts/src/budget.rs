//! Contractual budget PR curve.
//!
//! The budget starts at [`INITIAL_BUDGET_PR`] on a July 1 reference date and
//! decays geometrically by [`ANNUAL_DEGRADATION`] per year. Elapsed time is
//! measured in days over [`DAYS_PER_YEAR`], so the curve is continuous rather
//! than stepping at each anniversary; the per-year values are only used for
//! labelling.

use chrono::{Datelike, Months, NaiveDate};
use prwatch_core::MergedTable;

pub const INITIAL_BUDGET_PR: f64 = 73.9;
pub const ANNUAL_DEGRADATION: f64 = 0.008;
pub const DAYS_PER_YEAR: f64 = 365.25;
/// Month of the yearly reference date (July).
pub const REFERENCE_MONTH: u32 = 7;

/// July 1 on or before `first_date`.
pub fn reference_epoch(first_date: NaiveDate) -> NaiveDate {
    let year = if first_date.month() >= REFERENCE_MONTH {
        first_date.year()
    } else {
        first_date.year() - 1
    };
    // only out of range at the very start of chrono's calendar
    NaiveDate::from_ymd_opt(year, REFERENCE_MONTH, 1).unwrap_or(first_date)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetCurve {
    epoch: NaiveDate,
    initial: f64,
    annual_degradation: f64,
}

impl BudgetCurve {
    pub fn new(epoch: NaiveDate) -> Self {
        Self {
            epoch,
            initial: INITIAL_BUDGET_PR,
            annual_degradation: ANNUAL_DEGRADATION,
        }
    }

    /// Curve anchored at the reference epoch for a dataset starting at `first_date`.
    pub fn anchored_at(first_date: NaiveDate) -> Self {
        Self::new(reference_epoch(first_date))
    }

    /// Curve for a table, or `None` when the table is empty.
    pub fn for_table(table: &MergedTable) -> Option<Self> {
        table.first_date().map(Self::anchored_at)
    }

    pub fn with_initial(mut self, initial: f64) -> Self {
        self.initial = initial;
        self
    }

    pub fn with_annual_degradation(mut self, rate: f64) -> Self {
        self.annual_degradation = rate;
        self
    }

    pub fn epoch(&self) -> NaiveDate {
        self.epoch
    }

    pub fn initial(&self) -> f64 {
        self.initial
    }

    pub fn annual_degradation(&self) -> f64 {
        self.annual_degradation
    }

    /// Fractional years from the epoch; negative before it.
    pub fn years_elapsed(&self, date: NaiveDate) -> f64 {
        (date - self.epoch).num_days() as f64 / DAYS_PER_YEAR
    }

    pub fn value_after_years(&self, years: f64) -> f64 {
        self.initial * (1.0 - self.annual_degradation).powf(years)
    }

    pub fn value_at(&self, date: NaiveDate) -> f64 {
        self.value_after_years(self.years_elapsed(date))
    }

    /// Each yearly anniversary of the epoch up to `last_date`, with its value.
    pub fn anniversaries(&self, last_date: NaiveDate) -> Vec<(NaiveDate, f64)> {
        let mut out = Vec::new();
        let mut year_start = self.epoch;
        while year_start <= last_date {
            out.push((year_start, self.value_at(year_start)));
            match year_start.checked_add_months(Months::new(12)) {
                Some(next) => year_start = next,
                None => break,
            }
        }
        out
    }

    /// Legend text listing the budget of every contract year shown.
    pub fn legend_label(&self, last_date: NaiveDate) -> String {
        let years: Vec<String> = self
            .anniversaries(last_date)
            .iter()
            .map(|(_, value)| format!("1Y~{value:.1}%"))
            .collect();
        format!(
            "Target Budget Yield Performance Ratio [{}]",
            years.join(",")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn epoch_is_july_first_on_or_before_first_date() {
        assert_eq!(reference_epoch(day(2024, 7, 1)), day(2024, 7, 1));
        assert_eq!(reference_epoch(day(2024, 12, 31)), day(2024, 7, 1));
        assert_eq!(reference_epoch(day(2024, 6, 30)), day(2023, 7, 1));
        assert_eq!(reference_epoch(day(2024, 1, 1)), day(2023, 7, 1));
    }

    #[test]
    fn value_at_epoch_is_exactly_initial() {
        let curve = BudgetCurve::new(day(2023, 7, 1));
        assert_eq!(curve.value_at(day(2023, 7, 1)), 73.9);
    }

    #[test]
    fn one_year_decays_by_point_eight_percent() {
        let curve = BudgetCurve::new(day(2023, 7, 1));
        assert!((curve.value_after_years(1.0) - 73.9 * 0.992).abs() < 1e-12);
        // four calendar years span exactly 4 * 365.25 days
        let four_years = curve.value_at(day(2027, 7, 1));
        assert!((four_years - 73.9 * 0.992_f64.powi(4)).abs() < 1e-12);
    }

    #[test]
    fn curve_is_continuous_between_anniversaries() {
        let curve = BudgetCurve::new(day(2023, 7, 1));
        let a = curve.value_at(day(2024, 1, 1));
        let b = curve.value_at(day(2024, 1, 2));
        assert!(a > b);
        assert!(a < 73.9 && a > 73.9 * 0.992);
    }

    #[test]
    fn dates_before_epoch_do_not_error() {
        let curve = BudgetCurve::new(day(2024, 7, 1));
        let before = curve.value_at(day(2024, 1, 1));
        assert!(before > 73.9);
        assert!(curve.years_elapsed(day(2024, 1, 1)) < 0.0);
        assert!(curve.anniversaries(day(2024, 1, 1)).is_empty());
    }

    #[test]
    fn legend_lists_each_contract_year() {
        let curve = BudgetCurve::new(day(2023, 7, 1));
        let years = curve.anniversaries(day(2025, 8, 15));
        assert_eq!(years.len(), 3);
        assert_eq!(years[1].0, day(2024, 7, 1));
        let label = curve.legend_label(day(2025, 8, 15));
        assert!(label.starts_with("Target Budget Yield Performance Ratio [1Y~73.9%,"));
        assert_eq!(label.matches("1Y~").count(), 3);
    }

    #[test]
    fn parameters_can_be_overridden() {
        let curve = BudgetCurve::new(day(2023, 7, 1))
            .with_initial(80.0)
            .with_annual_degradation(0.01);
        assert!((curve.value_after_years(2.0) - 80.0 * 0.99_f64.powi(2)).abs() < 1e-12);
    }
}
