//! Optional TOML configuration for the `prwatch` binary.
//!
//! Every field has a default, so a file only needs the keys it changes:
//!
//! ```toml
//! [paths]
//! pr_dir = "exports/PR"
//!
//! [budget]
//! initial = 75.0
//! epoch = "2022-07-01"
//!
//! [chart]
//! width = 1200
//! ```
//!
//! Command-line flags take precedence over file values.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use prwatch_core::{MergedTable, PrError, PrResult};
use prwatch_ts::budget::{ANNUAL_DEGRADATION, INITIAL_BUDGET_PR};
use prwatch_ts::{BudgetCurve, MOVING_AVERAGE_WINDOW};
use prwatch_viz::{ChartOptions, DEFAULT_SIZE};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrwatchConfig {
    pub paths: PathsConfig,
    pub budget: BudgetConfig,
    pub chart: ChartConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub pr_dir: PathBuf,
    pub ghi_dir: PathBuf,
    /// Merged CSV written by `merge` and read by `render`.
    pub data_file: PathBuf,
    pub chart_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            pr_dir: PathBuf::from("PR"),
            ghi_dir: PathBuf::from("GHI"),
            data_file: PathBuf::from("processed_data.csv"),
            chart_file: PathBuf::from("pr_performance_graph.png"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    /// Budget PR in percent at the reference epoch.
    pub initial: f64,
    /// Fractional yearly decay, e.g. `0.008` for 0.8 %.
    pub annual_degradation: f64,
    /// Fixed reference date; derived from the first data date when unset.
    pub epoch: Option<NaiveDate>,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            initial: INITIAL_BUDGET_PR,
            annual_degradation: ANNUAL_DEGRADATION,
            epoch: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    pub moving_average_days: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_SIZE.0,
            height: DEFAULT_SIZE.1,
            moving_average_days: MOVING_AVERAGE_WINDOW,
        }
    }
}

impl PrwatchConfig {
    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> PrResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|err| PrError::Config(format!("reading {}: {err}", path.display())))?;
        toml::from_str(&contents)
            .map_err(|err| PrError::Config(format!("parsing {}: {err}", path.display())))
    }

    /// The file at `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> PrResult<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => Ok(Self::default()),
        }
    }

    /// Budget curve for `table`, or `None` when there is nothing to anchor it to.
    pub fn budget_curve(&self, table: &MergedTable) -> Option<BudgetCurve> {
        let curve = match self.budget.epoch {
            Some(epoch) => BudgetCurve::new(epoch),
            None => BudgetCurve::for_table(table)?,
        };
        Some(
            curve
                .with_initial(self.budget.initial)
                .with_annual_degradation(self.budget.annual_degradation),
        )
    }

    pub fn chart_options(&self) -> ChartOptions {
        ChartOptions {
            size: (self.chart.width.max(1), self.chart.height.max(1)),
        }
    }

    pub fn moving_average_window(&self) -> usize {
        self.chart.moving_average_days.max(1)
    }
}
