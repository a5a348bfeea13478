use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn codetally() -> Command {
    Command::cargo_bin("codetally").unwrap()
}

fn create_test_project(dir: &std::path::Path) {
    fs::write(dir.join("main.rs"), "fn main() {\n    println!(\"Hello\");\n}\n").unwrap();
    fs::write(dir.join("lib.py"), "# Python\ndef f():\n    if True:\n        pass\n").unwrap();
    fs::write(dir.join("app.go"), "package main\n\nfunc main() {}\n").unwrap();
}

#[test]
fn runs_against_a_directory_and_reports_totals() {
    let temp = TempDir::new().unwrap();
    create_test_project(temp.path());

    codetally()
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("files processed"));
}

#[test]
fn json_format_emits_per_language_objects() {
    let temp = TempDir::new().unwrap();
    create_test_project(temp.path());

    codetally()
        .arg(temp.path())
        .arg("--format")
        .arg("json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Name\""));
}

#[test]
fn cloc_yml_format_emits_sum_and_header() {
    let temp = TempDir::new().unwrap();
    create_test_project(temp.path());

    codetally()
        .arg(temp.path())
        .arg("-f")
        .arg("cloc-yml")
        .assert()
        .success()
        .stdout(predicate::str::contains("sum:"))
        .stdout(predicate::str::contains("header:"));
}

#[test]
fn csv_format_emits_a_header_row() {
    let temp = TempDir::new().unwrap();
    create_test_project(temp.path());

    codetally()
        .arg(temp.path())
        .arg("-f")
        .arg("csv")
        .assert()
        .success()
        .stdout(predicate::str::contains("Language,Files,Blank,Comment,Code,Complexity"));
}

#[test]
fn by_file_adds_a_per_file_table_before_the_summary() {
    let temp = TempDir::new().unwrap();
    create_test_project(temp.path());

    codetally()
        .arg(temp.path())
        .arg("--by-file")
        .assert()
        .success()
        .stdout(predicate::str::contains("main.rs"));
}

#[test]
fn languages_flag_prints_known_languages_and_exits() {
    codetally()
        .arg("--languages")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rust"))
        .stdout(predicate::str::contains("Python"));
}

#[test]
fn missing_root_exits_with_failure() {
    codetally().arg("/no/such/path-xyz").assert().failure();
}

#[test]
fn include_ext_restricts_counted_files() {
    let temp = TempDir::new().unwrap();
    create_test_project(temp.path());

    codetally()
        .arg(temp.path())
        .arg("-i")
        .arg("go")
        .arg("-f")
        .arg("csv")
        .assert()
        .success()
        .stdout(predicate::str::contains("Go"))
        .stdout(predicate::str::contains("Python").not());
}

#[test]
fn cocomo_section_is_printed_by_default_and_suppressed_with_flag() {
    let temp = TempDir::new().unwrap();
    create_test_project(temp.path());

    codetally()
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Estimated Cost"));

    codetally()
        .arg(temp.path())
        .arg("--cocomo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Estimated Cost").not());
}

#[test]
fn output_flag_writes_to_a_file_instead_of_stdout() {
    let temp = TempDir::new().unwrap();
    create_test_project(temp.path());
    let out_path = temp.path().join("report.txt");

    codetally()
        .arg(temp.path())
        .arg("-o")
        .arg(&out_path)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let contents = fs::read_to_string(&out_path).unwrap();
    assert!(contents.contains("files processed"));
}
