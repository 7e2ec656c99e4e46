use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn jpromote_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("jpromote"))
}

fn write_file(root: &std::path::Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

const FOO_SOURCE: &str = "\
package dev.morphia.aggregation.experimental;

import dev.morphia.aggregation.AggregationPipeline;

public class Foo {
}
";

#[test]
fn test_init_creates_config_file() {
    let temp_dir = TempDir::new().unwrap();

    jpromote_cmd()
        .current_dir(&temp_dir)
        .arg("--init")
        .assert()
        .success()
        .stdout(predicate::str::contains("jpromote.yaml"));

    let config = fs::read_to_string(temp_dir.path().join("jpromote.yaml")).unwrap();
    assert!(config.contains("oldPackageName"));
    assert!(config.contains("newPackageName"));
}

#[test]
fn test_promotes_file_to_new_package_directory() {
    let temp_dir = TempDir::new().unwrap();
    write_file(
        temp_dir.path(),
        "src/dev/morphia/aggregation/experimental/Foo.java",
        FOO_SOURCE,
    );

    jpromote_cmd()
        .arg(temp_dir.path())
        .arg("--old-package")
        .arg("dev.morphia.aggregation.experimental")
        .arg("--new-package")
        .arg("dev.morphia.aggregation")
        .assert()
        .success();

    let moved = temp_dir.path().join("src/dev/morphia/aggregation/Foo.java");
    assert!(moved.exists());
    assert!(!temp_dir
        .path()
        .join("src/dev/morphia/aggregation/experimental/Foo.java")
        .exists());

    let rewritten = fs::read_to_string(moved).unwrap();
    assert!(rewritten.starts_with("package dev.morphia.aggregation;"));
    // The self-import became redundant once the file joined that package.
    assert!(!rewritten.contains("import dev.morphia.aggregation.AggregationPipeline;"));
}

#[test]
fn test_dry_run_leaves_files_in_place() {
    let temp_dir = TempDir::new().unwrap();
    write_file(
        temp_dir.path(),
        "src/dev/morphia/aggregation/experimental/Foo.java",
        FOO_SOURCE,
    );

    jpromote_cmd()
        .arg(temp_dir.path())
        .arg("--old-package")
        .arg("dev.morphia.aggregation.experimental")
        .arg("--new-package")
        .arg("dev.morphia.aggregation")
        .arg("--dry-run")
        .arg("--report-json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"moved\": 1"));

    let original = temp_dir
        .path()
        .join("src/dev/morphia/aggregation/experimental/Foo.java");
    assert!(original.exists());
    assert_eq!(fs::read_to_string(original).unwrap(), FOO_SOURCE);
    assert!(!temp_dir
        .path()
        .join("src/dev/morphia/aggregation/Foo.java")
        .exists());
}

#[test]
fn test_config_file_drives_multiple_rules() {
    let temp_dir = TempDir::new().unwrap();
    write_file(
        temp_dir.path(),
        "jpromote.yaml",
        "\
recipes:
  - oldPackageName: dev.morphia.query.experimental
    newPackageName: dev.morphia.query
  - oldPackageName: dev.morphia.aggregation.experimental
    newPackageName: dev.morphia.aggregation
",
    );
    write_file(
        temp_dir.path(),
        "src/dev/morphia/query/experimental/Filters.java",
        "package dev.morphia.query.experimental;\n\npublic class Filters {\n}\n",
    );
    write_file(
        temp_dir.path(),
        "src/dev/morphia/aggregation/experimental/Foo.java",
        FOO_SOURCE,
    );

    jpromote_cmd().arg(temp_dir.path()).assert().success();

    assert!(temp_dir
        .path()
        .join("src/dev/morphia/query/Filters.java")
        .exists());
    assert!(temp_dir
        .path()
        .join("src/dev/morphia/aggregation/Foo.java")
        .exists());
}

#[test]
fn test_untouched_files_stay_byte_identical() {
    let temp_dir = TempDir::new().unwrap();
    let plain = "package com.example;\n\nclass Plain {\n}\n";
    write_file(temp_dir.path(), "src/com/example/Plain.java", plain);

    jpromote_cmd()
        .arg(temp_dir.path())
        .arg("--old-package")
        .arg("a.experimental")
        .arg("--new-package")
        .arg("a")
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(temp_dir.path().join("src/com/example/Plain.java")).unwrap(),
        plain
    );
}

#[test]
fn test_missing_configuration_fails() {
    let temp_dir = TempDir::new().unwrap();

    jpromote_cmd()
        .arg(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration"));
}
