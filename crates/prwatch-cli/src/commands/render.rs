use std::path::Path;

use anyhow::{Context, Result};
use prwatch_cli::{PrwatchConfig, RangeArgs};
use prwatch_core::{MergedTable, DATE_FORMAT};
use prwatch_ts::{read_table, ChartSummary};
use prwatch_viz::render_chart;
use tracing::{info, warn};

pub fn handle(
    input: Option<&Path>,
    out: Option<&Path>,
    range: &RangeArgs,
    config: &PrwatchConfig,
) -> Result<()> {
    let input = input.unwrap_or(config.paths.data_file.as_path());
    let table =
        read_table(input).with_context(|| format!("loading merged data {}", input.display()))?;
    info!("Loaded {} dates from {}", table.len(), input.display());
    let out = out.unwrap_or(config.paths.chart_file.as_path());
    render_table(&table, range, out, config)
}

/// Filter `table` to the requested range, print the statistics and draw the chart.
pub fn render_table(
    table: &MergedTable,
    range: &RangeArgs,
    out: &Path,
    config: &PrwatchConfig,
) -> Result<()> {
    let table = table.filter_range(range.start, range.end);
    if table.is_empty() {
        warn!("no data in the selected range; rendering an empty chart");
    }

    let curve = config.budget_curve(&table);
    let summary = ChartSummary::compute(&table, curve.as_ref(), config.moving_average_window());

    match (summary.first_date, summary.last_date) {
        (Some(first), Some(last)) => println!(
            "Plotting {} dates from {} to {}",
            table.len(),
            first.format(DATE_FORMAT),
            last.format(DATE_FORMAT)
        ),
        _ => println!("Plotting 0 dates"),
    }
    if let Some(curve) = &curve {
        println!(
            "Budget reference date: {}",
            curve.epoch().format(DATE_FORMAT)
        );
    }
    println!("{}", summary.comparison_line());
    for line in summary.average_lines() {
        println!("{line}");
    }

    render_chart(
        &table,
        &summary,
        curve.as_ref(),
        out,
        &config.chart_options(),
    )
    .with_context(|| format!("saving chart to {}", out.display()))?;
    println!("Output saved to: {}", out.display());
    Ok(())
}
