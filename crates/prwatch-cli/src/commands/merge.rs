use std::path::Path;

use anyhow::{Context, Result};
use prwatch_cli::{PrwatchConfig, SourceArgs};
use prwatch_core::MergedTable;
use prwatch_ts::{merge_sources, write_table, MergeOutcome, SourceScan};
use tracing::info;

use super::source_roots;

pub fn handle(sources: &SourceArgs, out: Option<&Path>, config: &PrwatchConfig) -> Result<()> {
    let (pr_root, ghi_root) = source_roots(sources, config);
    let out = out.unwrap_or(config.paths.data_file.as_path());
    merge_to_file(&pr_root, &ghi_root, out)?;
    Ok(())
}

/// Merge both trees, persist the table at `out` and print the report.
pub fn merge_to_file(pr_root: &Path, ghi_root: &Path, out: &Path) -> Result<MergedTable> {
    info!(
        "Merging PR data from {} and GHI data from {}",
        pr_root.display(),
        ghi_root.display()
    );
    let outcome = merge_sources(pr_root, ghi_root);
    print_report(&outcome);

    write_table(&outcome.table, out)
        .with_context(|| format!("saving merged data to {}", out.display()))?;
    println!("Data saved to: {}", out.display());
    Ok(outcome.table)
}

fn describe_scan(label: &str, scan: &SourceScan) -> String {
    if scan.exists {
        format!(
            "Found {} {} files in {}",
            scan.files.len(),
            label,
            scan.root.display()
        )
    } else {
        format!("{} directory {} not found", label, scan.root.display())
    }
}

fn print_report(outcome: &MergeOutcome) {
    println!("{}", describe_scan("PR", &outcome.pr_scan));
    println!("{}", describe_scan("GHI", &outcome.ghi_scan));
    if outcome.files_skipped > 0 || outcome.rows_skipped > 0 {
        println!(
            "Skipped {} unreadable files and {} rows with invalid dates",
            outcome.files_skipped, outcome.rows_skipped
        );
    }
    println!("{}", outcome.coverage());
    if outcome.diagnostics.has_issues() {
        print!("{}", outcome.diagnostics);
    }
}
