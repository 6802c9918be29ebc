use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// PR covers Jan 1-3, GHI covers Jan 2-4.
fn seed_sources(root: &Path) {
    write(
        &root.join("PR/site-a/2024-01_PR.csv"),
        "Date,PR\n2024-01-01,80.5\n2024-01-02,76.0\n",
    );
    write(
        &root.join("PR/site-b/2024-01_PR.csv"),
        "Date,PR\n2024-01-03,71.25\n",
    );
    write(
        &root.join("GHI/site-a/2024-01_GHI.csv"),
        "Date,GHI\n2024-01-02,3.5\n2024-01-03,6.2\n2024-01-04,1.1\n",
    );
}

fn prwatch() -> Command {
    Command::cargo_bin("prwatch").unwrap()
}

#[test]
fn merge_writes_merged_csv_and_report() {
    let tmp = tempdir().unwrap();
    seed_sources(tmp.path());
    let out = tmp.path().join("out/merged.csv");

    prwatch()
        .args([
            "merge",
            "--pr-dir",
            tmp.path().join("PR").to_str().unwrap(),
            "--ghi-dir",
            tmp.path().join("GHI").to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 PR files"))
        .stdout(predicate::str::contains("Found 1 GHI files"))
        .stdout(predicate::str::contains("Total dates: 4"))
        .stdout(predicate::str::contains("Dates with both PR and GHI: 2 (50.0%)"))
        .stdout(predicate::str::contains("Date range: 2024-01-01 to 2024-01-04"));

    let merged = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = merged.lines().collect();
    assert_eq!(lines[0], "Date,GHI,PR");
    assert_eq!(lines.len(), 5);
    assert!(lines[1].starts_with("2024-01-01,,80.5"));
    assert!(lines[4].starts_with("2024-01-04,1.1,"));
}

#[test]
fn no_subcommand_runs_with_default_layout() {
    let tmp = tempdir().unwrap();
    seed_sources(tmp.path());

    prwatch()
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Data saved to: processed_data.csv"))
        .stdout(predicate::str::contains("Points above Target Budget PR = "))
        .stdout(predicate::str::contains("Average PR Lifetime:"))
        .stdout(predicate::str::contains(
            "Output saved to: pr_performance_graph.png",
        ));

    assert!(tmp.path().join("processed_data.csv").exists());
    let chart = fs::metadata(tmp.path().join("pr_performance_graph.png")).unwrap();
    assert!(chart.len() > 0);
}

#[test]
fn empty_pr_tree_reports_zero_coverage() {
    let tmp = tempdir().unwrap();
    seed_sources(tmp.path());
    let empty = tmp.path().join("empty");
    fs::create_dir_all(&empty).unwrap();

    prwatch()
        .current_dir(tmp.path())
        .args(["merge", "--pr-dir", "empty"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 0 PR files"))
        .stdout(predicate::str::contains("Dates with both PR and GHI: 0 (0.0%)"))
        .stdout(predicate::str::contains("Missing PR values: 3"));
}

#[test]
fn missing_source_directories_are_not_fatal() {
    let tmp = tempdir().unwrap();

    prwatch()
        .current_dir(tmp.path())
        .args(["run", "-o", "chart.svg"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PR directory PR not found"))
        .stdout(predicate::str::contains("GHI directory GHI not found"))
        .stdout(predicate::str::contains("Total dates: 0"))
        .stdout(predicate::str::contains("Average PR Lifetime: NaN %"))
        .stdout(predicate::str::contains("= 0/0 = 0.0%"));

    let merged = fs::read_to_string(tmp.path().join("processed_data.csv")).unwrap();
    assert_eq!(merged.trim(), "Date,GHI,PR");
    assert!(tmp.path().join("chart.svg").exists());
}

#[test]
fn malformed_files_are_skipped() {
    let tmp = tempdir().unwrap();
    seed_sources(tmp.path());
    write(
        &tmp.path().join("PR/site-c/broken_PR.csv"),
        "Timestamp,Value\nyesterday,1\n",
    );

    prwatch()
        .current_dir(tmp.path())
        .arg("merge")
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 3 PR files"))
        .stdout(predicate::str::contains("Skipped 1 unreadable files"))
        .stdout(predicate::str::contains("broken_PR.csv"))
        .stdout(predicate::str::contains("Total dates: 4"));
}

#[test]
fn render_applies_inclusive_date_range() {
    let tmp = tempdir().unwrap();
    let data = tmp.path().join("processed_data.csv");
    write(
        &data,
        "Date,GHI,PR\n2024-01-01,2.5,80.0\n2024-01-02,,75.0\n2024-01-03,5.0,70.0\n2024-01-04,7.0,\n",
    );
    let out = tmp.path().join("charts/range.svg");

    prwatch()
        .args([
            "render",
            data.to_str().unwrap(),
            "--start",
            "2024-01-02",
            "--end",
            "2024-01-03",
            "-o",
            out.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Plotting 2 dates from 2024-01-02 to 2024-01-03",
        ))
        .stdout(predicate::str::contains("Budget reference date: 2023-07-01"))
        .stdout(predicate::str::contains("= 1/2 = 50.0%"))
        .stdout(predicate::str::contains("Average PR Lifetime: 72.5 %"));

    assert!(fs::read_to_string(&out).unwrap().contains("<svg"));
}

#[test]
fn render_without_merged_data_fails() {
    let tmp = tempdir().unwrap();
    prwatch()
        .current_dir(tmp.path())
        .arg("render")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Render command failed"));
}

#[test]
fn config_file_overrides_defaults() {
    let tmp = tempdir().unwrap();
    seed_sources(tmp.path());
    write(
        &tmp.path().join("prwatch.toml"),
        "[paths]\ndata_file = \"data/merged.csv\"\n\n[budget]\nepoch = \"2020-07-01\"\n",
    );

    prwatch()
        .current_dir(tmp.path())
        .args(["--config", "prwatch.toml", "run", "-o", "chart.svg"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Data saved to: data/merged.csv"))
        .stdout(predicate::str::contains("Budget reference date: 2020-07-01"));
    assert!(tmp.path().join("data/merged.csv").exists());
}

#[test]
fn invalid_config_is_rejected() {
    let tmp = tempdir().unwrap();
    write(&tmp.path().join("bad.toml"), "[chart]\nwidth = \"wide\"\n");

    prwatch()
        .current_dir(tmp.path())
        .args(["--config", "bad.toml", "check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn check_lists_sources() {
    let tmp = tempdir().unwrap();
    seed_sources(tmp.path());

    prwatch()
        .current_dir(tmp.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Working directory:"))
        .stdout(predicate::str::contains("Contents: GHI/, PR/"))
        .stdout(predicate::str::contains("2 *_PR.csv of 2 CSV files"))
        .stdout(predicate::str::contains("1 *_GHI.csv of 1 CSV files"))
        .stdout(predicate::str::contains("PR subdirectories:"))
        .stdout(predicate::str::contains("     2024-01_PR.csv"))
        .stdout(predicate::str::contains(
            "Total CSV files under working directory: 3",
        ))
        .stdout(predicate::str::contains(
            "First 5 PR files:\n  PR/site-a/2024-01_PR.csv\n  PR/site-b/2024-01_PR.csv\n",
        ))
        .stdout(predicate::str::contains(
            "First 5 GHI files:\n  GHI/site-a/2024-01_GHI.csv\n",
        ))
        .stdout(predicate::str::contains(
            "First 10 CSV files found:\n  GHI/site-a/2024-01_GHI.csv\n  PR/site-a/2024-01_PR.csv\n",
        ));
}
