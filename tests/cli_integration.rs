use std::fs;
use std::path::Path;
use std::process::Output;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::tempdir;

const HASH: &str = "a9993e364706816aba3e25717850c26c9cd0d89d";

fn blogimport() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("blogimport"));
    cmd.env("NO_COLOR", "1").env("RUST_LOG", "warn");
    cmd
}

fn write_tree(src: &Path, articles: &str) {
    fs::create_dir_all(src.join("blobs").join("a9").join("99")).unwrap();
    fs::write(src.join("blobs").join("a9").join("99").join(HASH), "abc").unwrap();
    fs::write(
        src.join("texts.txt"),
        format!("I: 12\nM: {HASH}\nOn: 2006-06-05 17:06:34\nF: html\n\n"),
    )
    .unwrap();
    fs::write(src.join("articles.txt"), articles).unwrap();
    fs::write(src.join("crashes.txt"), "").unwrap();
}

fn run_ok(cmd: &mut Command) -> Output {
    let output = cmd.output().expect("blogimport executes");
    assert!(
        output.status.success(),
        "blogimport failed:\nstdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

#[test]
fn migrate_prints_summary_line() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    let dst = dir.path().join("dst");
    fs::create_dir_all(&dst).unwrap();
    write_tree(&src, "I: 3\nT: Post\nP1: old/3.html\nV: 12\n\n");

    blogimport()
        .args(["--format", "minimal", "migrate"])
        .arg(&src)
        .arg(&dst)
        .assert()
        .success()
        .stdout("1 texts, 1 articles, 1 redirects, 0 crashes\n");

    assert_eq!(
        fs::read_to_string(dst.join("data").join("article_redirects.txt")).unwrap(),
        "3|old/3.html\n"
    );
    assert!(dst.join("blobs").join("a9").join("99").join(HASH).exists());
}

#[test]
fn json_report_includes_blob_counts() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    let dst = dir.path().join("dst");
    fs::create_dir_all(&dst).unwrap();
    write_tree(&src, "I: 3\nT: Post\nV: 12\n\n");

    let output = run_ok(
        blogimport()
            .args(["--format", "json", "migrate"])
            .arg(&src)
            .arg(&dst),
    );
    let report: Value = serde_json::from_slice(&output.stdout).expect("valid json stdout");
    assert_eq!(report["dry_run"], false);
    assert_eq!(report["texts"], 1);
    assert_eq!(report["texts_renumbered"], 1);
    assert_eq!(report["text_blobs"]["written"], 1);
    assert_eq!(report["crash_blobs"]["written"], 0);
    assert_eq!(report["outputs"].as_array().unwrap().len(), 3);
}

#[test]
fn check_leaves_destination_empty() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    let dst = dir.path().join("dst");
    fs::create_dir_all(&dst).unwrap();
    write_tree(&src, "I: 3\nT: Post\nV: 12\n\n");

    blogimport()
        .args(["check"])
        .arg(&src)
        .arg(&dst)
        .assert()
        .success()
        .stdout(predicate::str::contains("no files were written"));

    assert!(fs::read_dir(&dst).unwrap().next().is_none());
}

#[test]
fn integrity_violation_exits_with_single_diagnostic() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    let dst = dir.path().join("dst");
    fs::create_dir_all(&dst).unwrap();
    write_tree(&src, "I: 3\nT: Post\nV: 12,13\n\n");

    blogimport()
        .args(["migrate"])
        .arg(&src)
        .arg(&dst)
        .assert()
        .failure()
        .code(1)
        .stderr("error: article 3 references unknown text revision 13\n");

    assert!(!dst.join("data").exists());
}

#[test]
fn json_error_carries_code() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing");

    let output = blogimport()
        .args(["--format", "json", "check"])
        .arg(&missing)
        .arg(dir.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let err: Value = serde_json::from_slice(&output.stderr).expect("json error on stderr");
    assert_eq!(err["error"], "missing_file");
    assert!(err["message"].as_str().unwrap().contains("missing"));
}

#[test]
fn roots_without_subcommand_run_migrate() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    let dst = dir.path().join("dst");
    fs::create_dir_all(&dst).unwrap();
    write_tree(&src, "I: 3\nT: Post\nV: 12\n\n");

    blogimport()
        .args(["--format", "minimal"])
        .arg(&src)
        .arg(&dst)
        .assert()
        .success()
        .stdout("1 texts, 1 articles, 0 redirects, 0 crashes\n");

    assert!(dst.join("data").join("blogdata.txt").exists());
}

#[test]
fn default_roots_are_relative_to_working_directory() {
    let dir = tempdir().unwrap();
    let cwd = dir.path().join("a").join("b");
    fs::create_dir_all(&cwd).unwrap();

    blogimport()
        .current_dir(&cwd)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("blogimported"));
}
