//! Derived series and summary statistics drawn on the PR chart.
//!
//! All windows are counted in table rows (available points), not calendar
//! days. Missing PR values inside a window are skipped; a window without any
//! PR value yields `None`/`NaN` instead of an error.

use chrono::NaiveDate;
use prwatch_core::{Measure, MergedTable};

use crate::bands::GhiBand;
use crate::budget::BudgetCurve;

pub const MOVING_AVERAGE_WINDOW: usize = 30;
pub const TAIL_WINDOWS: [usize; 5] = [7, 30, 60, 90, 365];

/// Trailing mean over at most `window` rows, shrinking at the start.
pub fn moving_average(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let window = window.max(1);
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    let mut count = 0usize;
    for (idx, value) in values.iter().enumerate() {
        if let Some(v) = value {
            sum += v;
            count += 1;
        }
        if idx >= window {
            if let Some(old) = values[idx - window] {
                sum -= old;
                count -= 1;
                if count == 0 {
                    // drop rounding residue left by the subtractions
                    sum = 0.0;
                }
            }
        }
        out.push(if count > 0 {
            Some(sum / count as f64)
        } else {
            None
        });
    }
    out
}

/// Mean of the present values; `NaN` when there are none.
pub fn mean(values: &[Option<f64>]) -> f64 {
    let (sum, count) = values
        .iter()
        .flatten()
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Mean over the last `n` rows (fewer if the series is shorter).
pub fn tail_average(values: &[Option<f64>], n: usize) -> f64 {
    let start = values.len().saturating_sub(n);
    mean(&values[start..])
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TailAverage {
    pub window: usize,
    pub value: f64,
}

/// How many points beat the budget at their own date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BudgetComparison {
    pub above: usize,
    /// All rows in the table, including rows without PR.
    pub total: usize,
}

impl BudgetComparison {
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.above as f64 / self.total as f64 * 100.0
        }
    }
}

/// Everything the chart needs beyond the raw table.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSummary {
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub moving_average_window: usize,
    /// One entry per table row.
    pub moving_average: Vec<Option<f64>>,
    /// Budget at each row's date; empty when no curve was supplied.
    pub budget: Vec<f64>,
    pub bands: Vec<GhiBand>,
    pub comparison: BudgetComparison,
    pub tail_averages: Vec<TailAverage>,
    pub lifetime_average: f64,
}

impl ChartSummary {
    pub fn compute(table: &MergedTable, curve: Option<&BudgetCurve>, window: usize) -> Self {
        let pr = table.values(Measure::Pr);
        let budget: Vec<f64> = match curve {
            Some(curve) => table.iter().map(|r| curve.value_at(r.date)).collect(),
            None => Vec::new(),
        };
        let above = table
            .iter()
            .zip(budget.iter())
            .filter(|(record, budget)| record.pr.map_or(false, |pr| pr > **budget))
            .count();

        Self {
            first_date: table.first_date(),
            last_date: table.last_date(),
            moving_average_window: window,
            moving_average: moving_average(&pr, window),
            budget,
            bands: table.iter().map(|r| GhiBand::classify(r.ghi)).collect(),
            comparison: BudgetComparison {
                above,
                total: table.len(),
            },
            tail_averages: TAIL_WINDOWS
                .iter()
                .map(|&n| TailAverage {
                    window: n,
                    value: tail_average(&pr, n),
                })
                .collect(),
            lifetime_average: mean(&pr),
        }
    }

    pub fn comparison_line(&self) -> String {
        format!(
            "Points above Target Budget PR = {}/{} = {:.1}%",
            self.comparison.above,
            self.comparison.total,
            self.comparison.percentage()
        )
    }

    /// Lines of the averages box, one per tail window plus lifetime.
    pub fn average_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .tail_averages
            .iter()
            .map(|avg| format!("Average PR last {}-d: {:.1} %", avg.window, avg.value))
            .collect();
        lines.push(format!(
            "Average PR Lifetime: {:.1} %",
            self.lifetime_average
        ));
        lines
    }
}
