// ABOUTME: Integration tests for the roadmap CLI binary.
// ABOUTME: Covers JSON and page output, format selection, image relocation and failures.

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::cargo::CommandCargoExt;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

const EXPORT: &str = concat!(
    r#"<p class="toc1">Renting a Home 3</p>"#,
    r#"<h1>Housing</h1><p>Where to live.</p><p>a</p><p>b</p>"#,
    r#"<h2><a id="_Toc1"></a>Renting a Home</h2><p>Read the lease, see PG 3.</p>"#,
    r#"<p><img src="image1.png" /></p>"#,
    r#"<h1>Health</h1><p>See a doctor.</p>"#,
);

fn roadmap_cmd() -> Command {
    Command::cargo_bin("roadmap").unwrap()
}

fn write_export(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("raw_index.html");
    fs::write(&path, EXPORT).unwrap();
    path
}

#[test]
fn writes_records_and_pages() {
    let dir = TempDir::new().unwrap();
    let input = write_export(&dir);
    let out = dir.path().join("site");

    roadmap_cmd()
        .arg(&input)
        .arg("--out")
        .arg(&out)
        .arg("--prefix")
        .arg("/guide")
        .assert()
        .success()
        .stdout(predicate::str::contains("/guide/housing/renting-a-home"))
        .stdout(predicate::str::contains("/guide/page-index/"));

    let json = fs::read_to_string(out.join("all_contents.json")).unwrap();
    let records: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
    let titles: Vec<_> = records.iter().map(|r| r["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["Housing", "Renting a Home", "Health"]);
    assert_eq!(records[1]["page_number"], 3);
    assert!(records[1]["content"]
        .as_str()
        .unwrap()
        .contains("/guide/img/image1.png"));

    assert!(out.join("guide/housing/index.html").is_file());
    assert!(out.join("guide/search/index.html").is_file());
}

#[test]
fn no_pages_writes_only_json() {
    let dir = TempDir::new().unwrap();
    let input = write_export(&dir);
    let json = dir.path().join("records.json");
    let out = dir.path().join("site");

    roadmap_cmd()
        .arg(&input)
        .arg("--out")
        .arg(&out)
        .arg("--json")
        .arg(&json)
        .arg("--no-pages")
        .arg("--format")
        .arg("text")
        .arg("--compact")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let body = fs::read_to_string(&json).unwrap();
    assert!(!body.contains('\n'));
    assert!(body.contains("Read the lease, see PG 3."));
    assert!(!out.join("index.html").exists());
}

#[test]
fn relocates_images_beside_input() {
    let dir = TempDir::new().unwrap();
    let input = write_export(&dir);
    fs::write(dir.path().join("image1.png"), b"png").unwrap();

    roadmap_cmd()
        .arg(&input)
        .arg("--out")
        .arg(dir.path().join("site"))
        .arg("--relocate-images")
        .arg("--no-pages")
        .assert()
        .success();

    assert!(dir.path().join("img/image1.png").is_file());
    assert!(!dir.path().join("image1.png").exists());
}

#[test]
fn unsupported_format_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_export(&dir);

    roadmap_cmd()
        .arg(&input)
        .arg("--format")
        .arg("pdf")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported format"));
}

#[test]
fn missing_input_fails() {
    let dir = TempDir::new().unwrap();

    roadmap_cmd()
        .arg(dir.path().join("nope.html"))
        .arg("--out")
        .arg(dir.path().join("site"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("i/o error"));
}
