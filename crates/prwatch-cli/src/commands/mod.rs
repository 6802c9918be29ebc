use std::path::PathBuf;

use prwatch_cli::{PrwatchConfig, SourceArgs};

pub mod check;
pub mod merge;
pub mod render;
pub mod run;

/// PR and GHI roots: flags first, then the config file, then `PR`/`GHI`.
pub fn source_roots(sources: &SourceArgs, config: &PrwatchConfig) -> (PathBuf, PathBuf) {
    let pr = sources
        .pr_dir
        .clone()
        .unwrap_or_else(|| config.paths.pr_dir.clone());
    let ghi = sources
        .ghi_dir
        .clone()
        .unwrap_or_else(|| config.paths.ghi_dir.clone());
    (pr, ghi)
}
