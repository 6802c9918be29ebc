use std::path::Path;

use anyhow::Result;
use prwatch_cli::{PrwatchConfig, RangeArgs, SourceArgs};

use super::{merge::merge_to_file, render::render_table, source_roots};

/// Merge then render, charting the in-memory table rather than re-reading the CSV.
pub fn handle(
    sources: &SourceArgs,
    data_out: Option<&Path>,
    out: Option<&Path>,
    range: &RangeArgs,
    config: &PrwatchConfig,
) -> Result<()> {
    let (pr_root, ghi_root) = source_roots(sources, config);
    let data_out = data_out.unwrap_or(config.paths.data_file.as_path());
    let table = merge_to_file(&pr_root, &ghi_root, data_out)?;
    let out = out.unwrap_or(config.paths.chart_file.as_path());
    render_table(&table, range, out, config)
}
