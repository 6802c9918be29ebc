//! Merge, persistence and statistics for daily PR/GHI series.
//!
//! The merge stage folds two trees of per-site CSV exports into one
//! [`MergedTable`](prwatch_core::MergedTable) and writes it as a flat CSV; the
//! analysis side computes the budget curve, the moving average, GHI bands and
//! the tail averages that the chart displays.

pub mod bands;
pub mod budget;
pub mod merge;
pub mod stats;
pub mod table;

pub use bands::GhiBand;
pub use budget::{reference_epoch, BudgetCurve};
pub use merge::{discover_csv_files, merge_sources, MergeOutcome, SourceScan};
pub use stats::{moving_average, tail_average, ChartSummary, MOVING_AVERAGE_WINDOW};
pub use table::{read_table, write_table};
