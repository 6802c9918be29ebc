use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use prwatch_cli::{PrwatchConfig, SourceArgs};
use prwatch_ts::merge::is_csv;
use tabwriter::TabWriter;
use walkdir::WalkDir;

use super::source_roots;

const SHOWN_SUBDIRS: usize = 5;
const SHOWN_FILES_PER_SUBDIR: usize = 3;
const SHOWN_SOURCE_FILES: usize = 5;
const SHOWN_CSV_FILES: usize = 10;

#[derive(Clone, Copy, PartialEq, Eq)]
enum CheckStatus {
    Ok,
    Warn,
}

/// What was found under one source root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceReport {
    pub root: PathBuf,
    pub exists: bool,
    pub subdir_count: usize,
    /// First few subdirectories with the first few CSV files directly inside each.
    pub subdirs: Vec<(String, Vec<String>)>,
    /// Files named `*_<suffix>.csv` anywhere below the root.
    pub suffixed_files: usize,
    /// First `*_<suffix>.csv` files in traversal order.
    pub sample_files: Vec<PathBuf>,
    pub csv_files: usize,
}

impl SourceReport {
    fn status(&self) -> CheckStatus {
        if self.exists && self.csv_files > 0 {
            CheckStatus::Ok
        } else {
            CheckStatus::Warn
        }
    }

    fn detail(&self, suffix: &str) -> String {
        if !self.exists {
            return format!("{} not found", self.root.display());
        }
        format!(
            "{}: {} *_{}.csv of {} CSV files, {} subdirectories",
            self.root.display(),
            self.suffixed_files,
            suffix,
            self.csv_files,
            self.subdir_count
        )
    }
}

fn sorted_children(dir: &Path) -> impl Iterator<Item = walkdir::DirEntry> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
}

fn file_name(entry: &walkdir::DirEntry) -> String {
    entry.file_name().to_string_lossy().into_owned()
}

pub fn inspect_source(root: &Path, suffix: &str) -> SourceReport {
    let mut report = SourceReport {
        root: root.to_path_buf(),
        exists: root.is_dir(),
        ..SourceReport::default()
    };
    if !report.exists {
        return report;
    }

    for dir in sorted_children(root).filter(|e| e.file_type().is_dir()) {
        report.subdir_count += 1;
        if report.subdirs.len() < SHOWN_SUBDIRS {
            let files: Vec<String> = sorted_children(dir.path())
                .filter(|e| e.file_type().is_file() && is_csv(e.path()))
                .take(SHOWN_FILES_PER_SUBDIR)
                .map(|e| file_name(&e))
                .collect();
            report.subdirs.push((file_name(&dir), files));
        }
    }

    let marker = format!("_{suffix}.csv");
    for entry in csv_entries(root) {
        report.csv_files += 1;
        if file_name(&entry).ends_with(&marker) {
            report.suffixed_files += 1;
            if report.sample_files.len() < SHOWN_SOURCE_FILES {
                report.sample_files.push(entry.into_path());
            }
        }
    }
    report
}

fn csv_entries(root: &Path) -> impl Iterator<Item = walkdir::DirEntry> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_csv(e.path()))
}

/// Total CSV files below `root` and the first `limit` of them.
pub fn scan_csv_files(root: &Path, limit: usize) -> (usize, Vec<PathBuf>) {
    let mut total = 0;
    let mut sample = Vec::new();
    for entry in csv_entries(root) {
        total += 1;
        if sample.len() < limit {
            sample.push(entry.into_path());
        }
    }
    (total, sample)
}

fn relative_to<'a>(path: &'a Path, base: &Path) -> std::path::Display<'a> {
    path.strip_prefix(base).unwrap_or(path).display()
}

pub fn handle(sources: &SourceArgs, config: &PrwatchConfig) -> Result<()> {
    let cwd = env::current_dir().context("resolving working directory")?;
    let (pr_root, ghi_root) = source_roots(sources, config);
    let reports = [
        ("PR", inspect_source(&pr_root, "PR")),
        ("GHI", inspect_source(&ghi_root, "GHI")),
    ];

    println!("Working directory: {}", cwd.display());
    let entries: Vec<String> = sorted_children(&cwd)
        .map(|e| {
            let name = file_name(&e);
            if e.file_type().is_dir() {
                format!("{name}/")
            } else {
                name
            }
        })
        .collect();
    if entries.is_empty() {
        println!("Directory is empty");
    } else {
        println!("Contents: {}", entries.join(", "));
    }
    println!();

    let mut writer = TabWriter::new(Vec::new()).padding(2);
    writeln!(writer, "Source\tStatus\tDetails")?;
    for (label, report) in &reports {
        let status = match report.status() {
            CheckStatus::Ok => "ok",
            CheckStatus::Warn => "warn",
        };
        writeln!(writer, "{}\t{}\t{}", label, status, report.detail(label))?;
    }
    writer.flush()?;
    let table = String::from_utf8(writer.into_inner()?)?;
    println!("{table}");

    for (label, report) in &reports {
        if !report.subdirs.is_empty() {
            println!("{label} subdirectories:");
            for (dir, files) in &report.subdirs {
                println!("  {dir}/");
                for file in files {
                    println!("     {file}");
                }
            }
        }
        if !report.sample_files.is_empty() {
            println!("First {SHOWN_SOURCE_FILES} {label} files:");
            for path in &report.sample_files {
                println!("  {}", relative_to(path, &cwd));
            }
        }
    }

    let (total, sample) = scan_csv_files(&cwd, SHOWN_CSV_FILES);
    println!("Total CSV files under working directory: {total}");
    if !sample.is_empty() {
        println!("First {SHOWN_CSV_FILES} CSV files found:");
        for path in &sample {
            println!("  {}", relative_to(path, &cwd));
        }
    }

    if reports
        .iter()
        .any(|(_, report)| report.status() == CheckStatus::Warn)
    {
        eprintln!("Some sources reported warnings. Review the details above before merging.");
    }
    Ok(())
}
