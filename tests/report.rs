// tests/report.rs
#![cfg(unix)]

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use filetime::FileTime;
use serde_json::Value;
use tempfile::tempdir;

fn hardlinkable() -> Command {
    Command::cargo_bin("hardlinkable").unwrap()
}

fn write_file(path: &Path, content: &[u8]) {
    fs::write(path, content).unwrap();
    filetime::set_file_mtime(path, FileTime::from_unix_time(1_700_000_000, 0)).unwrap();
}

fn json_report(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

#[test]
fn identical_pair_is_reported_without_linking() {
    let tmp = tempdir().unwrap();
    let a = tmp.path().join("a");
    let b = tmp.path().join("b");
    write_file(&a, &[7u8; 100]);
    write_file(&b, &[7u8; 100]);

    let report = json_report(hardlinkable().arg("--json").arg(tmp.path()));
    assert_eq!(report["files"], 2);
    assert_eq!(report["inodes"], 2);
    assert_eq!(report["comparisons"], 1);
    assert_eq!(report["new_links"], 1);
    assert_eq!(report["additional_bytes_saveable"], 100);
    assert_eq!(report["linking_enabled"], false);

    // Dry run: the files still have distinct inodes.
    use std::os::unix::fs::MetadataExt;
    assert_ne!(
        fs::metadata(&a).unwrap().ino(),
        fs::metadata(&b).unwrap().ino()
    );
}

#[test]
fn linkable_pairs_appear_with_verbose_json() {
    let tmp = tempdir().unwrap();
    write_file(&tmp.path().join("a"), &[7u8; 64]);
    write_file(&tmp.path().join("b"), &[7u8; 64]);

    let report = json_report(hardlinkable().args(["--json", "-v"]).arg(tmp.path()));
    let pairs = report["linkable_pairs"].as_array().unwrap();
    assert_eq!(pairs.len(), 1);
    assert!(pairs[0]["from"].as_str().unwrap().ends_with('a'));
    assert!(pairs[0]["to"].as_str().unwrap().ends_with('b'));
}

#[test]
fn min_size_rejection_is_counted() {
    let tmp = tempdir().unwrap();
    write_file(&tmp.path().join("small"), &[0u8; 1000]);

    let report = json_report(
        hardlinkable()
            .args(["--json", "--min-size", "2048"])
            .arg(tmp.path()),
    );
    assert_eq!(report["too_small"], 1);
    assert_eq!(report["files"], 0);
    assert_eq!(report["inodes"], 0);
    assert_eq!(report["new_links"], 0);
}

#[test]
fn differing_mtimes_respect_the_policy_flags() {
    let tmp = tempdir().unwrap();
    let a = tmp.path().join("a");
    let b = tmp.path().join("b");
    write_file(&a, &[3u8; 100]);
    write_file(&b, &[3u8; 100]);
    filetime::set_file_mtime(&b, FileTime::from_unix_time(1_700_000_000, 250)).unwrap();

    let strict = json_report(hardlinkable().arg("--json").arg(tmp.path()));
    assert_eq!(strict["new_links"], 0);
    assert_eq!(strict["unequal_times"], 1);

    let ignoring = json_report(
        hardlinkable()
            .args(["--json", "--ignore-time"])
            .arg(tmp.path()),
    );
    assert_eq!(ignoring["new_links"], 1);

    let content_only = json_report(
        hardlinkable()
            .args(["--json", "--content-only"])
            .arg(tmp.path()),
    );
    assert_eq!(content_only["new_links"], 1);
}

#[test]
fn same_name_restricts_candidates() {
    let tmp = tempdir().unwrap();
    let dir1 = tmp.path().join("dir1");
    let dir2 = tmp.path().join("dir2");
    fs::create_dir(&dir1).unwrap();
    fs::create_dir(&dir2).unwrap();
    write_file(&dir1.join("x"), &[9u8; 256]);
    write_file(&dir2.join("x"), &[9u8; 256]);
    write_file(&dir1.join("y"), &[9u8; 256]);

    let report = json_report(
        hardlinkable()
            .args(["--json", "--same-name", "-v"])
            .arg(tmp.path()),
    );
    assert_eq!(report["new_links"], 1);
    let pairs = report["linkable_pairs"].as_array().unwrap();
    assert!(pairs[0]["from"].as_str().unwrap().ends_with("x"));
    assert!(pairs[0]["to"].as_str().unwrap().ends_with("x"));
}

#[test]
fn exclude_patterns_prune_files_and_directories() {
    let tmp = tempdir().unwrap();
    let skip = tmp.path().join("skipme");
    fs::create_dir(&skip).unwrap();
    write_file(&skip.join("a"), &[1u8; 64]);
    write_file(&tmp.path().join("keep"), &[1u8; 64]);
    write_file(&tmp.path().join("drop.bak"), &[1u8; 64]);

    let report = json_report(
        hardlinkable()
            .args(["--json", "-x", "^skipme$", "-x", r"\.bak$"])
            .arg(tmp.path()),
    );
    assert_eq!(report["excluded_dirs"], 1);
    assert_eq!(report["excluded_files"], 1);
    assert_eq!(report["files"], 1);
}

#[test]
fn existing_hardlinks_count_toward_current_savings() {
    let tmp = tempdir().unwrap();
    let a = tmp.path().join("a");
    write_file(&a, &[4u8; 512]);
    fs::hard_link(&a, tmp.path().join("a1")).unwrap();

    let report = json_report(hardlinkable().arg("--json").arg(tmp.path()));
    assert_eq!(report["existing_links"], 1);
    assert_eq!(report["current_bytes_saved"], 512);
    assert_eq!(report["total_bytes_saveable"], 512);
    assert_eq!(report["new_links"], 0);
}

#[test]
fn quiet_suppresses_the_text_statistics() {
    let tmp = tempdir().unwrap();
    write_file(&tmp.path().join("a"), &[7u8; 64]);

    hardlinkable()
        .arg("-q")
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicates::str::is_empty());
}

#[test]
fn text_report_mentions_dry_run_mode() {
    let tmp = tempdir().unwrap();
    write_file(&tmp.path().join("a"), &[7u8; 64]);
    write_file(&tmp.path().join("b"), &[7u8; 64]);

    hardlinkable()
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicates::str::contains(
            "Statistics reflect what would result if actual linking were enabled",
        ))
        .stdout(predicates::str::contains("Additional bytes saveable"));
}
