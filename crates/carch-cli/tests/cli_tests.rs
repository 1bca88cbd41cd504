//! Integration tests for carch-cli.
//!
//! Note: Tests use `unwrap`/`expect` which is acceptable in test code.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;

fn carch_cmd() -> Command {
    cargo_bin_cmd!("carch")
}

/// Writes the four-file `test/` tree and returns its root.
fn sample_tree(temp: &TempDir) -> PathBuf {
    let root = temp.path().join("test");
    fs::create_dir_all(root.join("dir")).unwrap();
    fs::write(root.join("test1.txt"), "some content\n").unwrap();
    fs::write(root.join("test2.txt"), "some more content\n").unwrap();
    fs::write(root.join("dir/test1.txt"), "different content\n").unwrap();
    fs::write(root.join("dir/test2.txt"), "might be different content\n").unwrap();
    root
}

fn create(archive: &Path, source: &Path, extra: &[&str]) {
    carch_cmd()
        .arg("create")
        .arg(archive)
        .arg(source)
        .args(extra)
        .assert()
        .success();
}

#[test]
fn test_version_flag() {
    carch_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("carch"));
}

#[test]
fn test_help_flag() {
    carch_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Command-line utility"));
}

#[test]
fn test_extract_help() {
    carch_cmd()
        .arg("extract")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Extract archive contents"));
}

#[test]
fn test_create_help() {
    carch_cmd()
        .arg("create")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Create a new archive"));
}

#[test]
fn test_create_command_basic() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let source = sample_tree(&temp);
    let archive = temp.path().join("test.tar.gz");

    carch_cmd()
        .arg("create")
        .arg(&archive)
        .arg(&source)
        .assert()
        .success()
        .stdout(predicate::str::contains("Archive created"))
        .stdout(predicate::str::contains("Files added:      4"));

    assert!(archive.exists());
}

#[test]
fn test_create_command_json_output() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let source = sample_tree(&temp);
    let archive = temp.path().join("test.tar.gz");

    let output = carch_cmd()
        .arg("--json")
        .arg("create")
        .arg(&archive)
        .arg(&source)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).expect("invalid JSON output");
    assert_eq!(json["status"], "success");
    assert_eq!(json["operation"], "create");
    assert_eq!(json["data"]["files_added"], 4);
    assert_eq!(json["data"]["bytes_written"], 76);
}

#[test]
fn test_roundtrip_every_type() {
    for kind in ["tar.gz", "tar", "tar.lz4", "zip"] {
        let temp = TempDir::new().expect("failed to create temp dir");
        let source = sample_tree(&temp);
        let archive = temp.path().join(format!("out.{kind}"));
        create(&archive, &source, &["--type", kind]);

        let out = temp.path().join("out");
        carch_cmd()
            .arg("extract")
            .arg(&archive)
            .arg(&out)
            .assert()
            .success()
            .stdout(predicate::str::contains("Extraction complete"));

        assert_eq!(
            fs::read_to_string(out.join("test/dir/test2.txt")).unwrap(),
            "might be different content\n",
            "{kind}"
        );
    }
}

#[test]
fn test_create_with_extension_filters() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let source = temp.path().join("logs");
    fs::create_dir_all(&source).unwrap();
    for name in ["a.txt", "a.log", "a.log.txt"] {
        fs::write(source.join(name), name).unwrap();
    }
    let archive = temp.path().join("logs.tar");
    create(
        &archive,
        &source,
        &["-t", "tar", "--include-ext", "txt", "--exclude-ext", "log"],
    );

    let out = temp.path().join("out");
    carch_cmd().arg("extract").arg(&archive).arg(&out).assert().success();
    assert!(out.join("logs/a.txt").exists());
    assert!(out.join("logs/a.log.txt").exists());
    assert!(!out.join("logs/a.log").exists());
}

#[test]
fn test_create_existing_output_fails_with_hint() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let source = sample_tree(&temp);
    let archive = temp.path().join("test.tar.gz");
    create(&archive, &source, &[]);

    carch_cmd()
        .arg("create")
        .arg(&archive)
        .arg(&source)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Destination already exists"))
        .stderr(predicate::str::contains("HINT"));

    create(&archive, &source, &["--force"]);
}

#[test]
fn test_create_unsupported_type() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let source = sample_tree(&temp);

    carch_cmd()
        .arg("create")
        .arg(temp.path().join("out.tar.bz2"))
        .arg(&source)
        .args(["-t", "tar.bz2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not supported for archive creation"));

    assert!(!temp.path().join("out.tar.bz2").exists());
}

#[test]
fn test_create_missing_source() {
    let temp = TempDir::new().expect("failed to create temp dir");

    carch_cmd()
        .arg("create")
        .arg(temp.path().join("out.tar.gz"))
        .arg(temp.path().join("missing"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Source not found"));
}

#[test]
fn test_create_delete_sources() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let source = sample_tree(&temp);
    let archive = temp.path().join("moved.tar.gz");
    create(&archive, &source, &["--delete-sources"]);

    assert!(archive.exists());
    assert!(!source.join("test1.txt").exists());
    assert!(!source.join("dir/test2.txt").exists());
}

#[test]
fn test_extract_json_output_counts() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let source = sample_tree(&temp);
    let archive = temp.path().join("test.zip");
    create(&archive, &source, &["-t", "zip"]);

    let output = carch_cmd()
        .arg("extract")
        .arg("--json")
        .arg(&archive)
        .arg(temp.path().join("out"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).expect("invalid JSON output");
    assert_eq!(json["status"], "success");
    assert_eq!(json["operation"], "extract");
    assert_eq!(json["data"]["format"], "zip");
    assert_eq!(json["data"]["files_extracted"], 4);
}

#[test]
fn test_extract_create_dir() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let source = sample_tree(&temp);
    let archive = temp.path().join("bundle.tar");
    create(&archive, &source, &["-t", "tar"]);

    let out = temp.path().join("out");
    carch_cmd()
        .arg("extract")
        .arg("--create-dir")
        .arg(&archive)
        .arg(&out)
        .assert()
        .success();

    assert!(out.join("bundle/test/test1.txt").is_file());
}

#[test]
fn test_extract_ignores_misleading_name() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let source = sample_tree(&temp);
    let archive = temp.path().join("actually-gzip.zip");
    create(&archive, &source, &["-t", "tgz"]);

    carch_cmd()
        .arg("extract")
        .arg(&archive)
        .arg(temp.path().join("out"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Format: gzip"));
}

#[test]
fn test_extract_nonexistent_archive() {
    let temp = TempDir::new().expect("failed to create temp dir");

    carch_cmd()
        .arg("extract")
        .arg("nonexistent.tar.gz")
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_extract_unrecognized_file() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let file = temp.path().join("notes.txt");
    fs::write(&file, "just some text that is long enough").unwrap();

    carch_cmd()
        .arg("extract")
        .arg(&file)
        .arg(temp.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Archive format not recognized"))
        .stderr(predicate::str::contains("HINT"));
}

#[test]
fn test_detect_reports_formats() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let source = sample_tree(&temp);
    let lz4 = temp.path().join("a.tar.lz4");
    create(&lz4, &source, &["-t", "tar.lz4"]);
    let rar = temp.path().join("old.rar");
    fs::write(&rar, b"Rar!\x1a\x07\x01\x00rest").unwrap();

    carch_cmd()
        .arg("detect")
        .arg(&lz4)
        .assert()
        .success()
        .stdout(predicate::str::contains("lz4"));

    carch_cmd()
        .arg("detect")
        .arg(&lz4)
        .arg(&rar)
        .assert()
        .failure()
        .stdout(predicate::str::contains("rar post 5.0 not supported"))
        .stderr(predicate::str::contains("1 file(s) could not be identified"));
}

#[test]
fn test_completion_bash() {
    carch_cmd()
        .arg("completion")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("carch"));
}

#[test]
fn test_quiet_suppresses_output() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let source = sample_tree(&temp);

    carch_cmd()
        .arg("--quiet")
        .arg("create")
        .arg(temp.path().join("q.tar.gz"))
        .arg(&source)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
