//! Rendering of the PR performance chart.
//!
//! The chart is drawn with plotters onto a PNG or SVG backend chosen by the
//! output extension. Text goes through [`font::TextTolerantBackend`] so a
//! host without system fonts still gets the plotted series.

pub mod chart;
pub mod font;

pub use chart::{band_color, render_chart, ChartKind, ChartOptions, DEFAULT_SIZE};
pub use font::TextTolerantBackend;
