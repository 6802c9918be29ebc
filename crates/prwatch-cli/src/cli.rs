use chrono::NaiveDate;
use clap::{Args, CommandFactory, Parser, Subcommand, ValueHint};
use prwatch_core::parse_date;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "prwatch",
    author,
    version,
    about = "Merge daily PR/GHI exports and chart them against the budget PR",
    long_about = None
)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: tracing::Level,

    /// TOML configuration file
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Merge the source trees, write the merged CSV and render the chart
    Run {
        #[command(flatten)]
        sources: SourceArgs,
        /// Merged CSV output path
        #[arg(long, value_hint = ValueHint::FilePath)]
        data_out: Option<PathBuf>,
        /// Chart output path (.png or .svg)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Merge the source trees into the merged CSV only
    Merge {
        #[command(flatten)]
        sources: SourceArgs,
        /// Merged CSV output path
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,
    },
    /// Render the chart from an existing merged CSV
    Render {
        /// Merged CSV to read
        #[arg(value_hint = ValueHint::FilePath)]
        input: Option<PathBuf>,
        /// Chart output path (.png or .svg)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Inspect the source folders without merging anything
    Check {
        #[command(flatten)]
        sources: SourceArgs,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Root of the PR exports
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub pr_dir: Option<PathBuf>,
    /// Root of the GHI exports
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub ghi_dir: Option<PathBuf>,
}

/// Inclusive date bounds applied before statistics are computed.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct RangeArgs {
    /// First date to include (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    pub start: Option<NaiveDate>,
    /// Last date to include (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    pub end: Option<NaiveDate>,
}

fn parse_date_arg(raw: &str) -> Result<NaiveDate, String> {
    parse_date(raw).map_err(|err| err.to_string())
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
