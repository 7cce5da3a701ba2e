mod common;

use std::fs;

use assert_cmd::Command;
use common::{TestWorkspace, table_names, table_rows};
use predicates::str::contains;

fn load_command(workspace: &TestWorkspace) -> Command {
    let mut cmd = Command::cargo_bin("csv-db-loader").expect("binary exists");
    cmd.arg("load")
        .arg(workspace.source_dir())
        .arg(workspace.database());
    cmd
}

#[test]
fn load_reports_summary_and_keeps_going_after_a_bad_file() {
    let workspace = TestWorkspace::new();
    workspace.write("orders.csv", "id,amount\n1,100\n2,250\n");
    workspace.write("bad.csv", "a,b\nx\n");

    load_command(&workspace)
        .assert()
        .success()
        .stdout(contains("2 file(s) attempted, 1 succeeded, 1 failed"));

    let conn = workspace.open_db();
    assert_eq!(table_rows(&conn, "orders").len(), 2);
}

#[test]
fn fail_on_error_turns_file_failures_into_exit_code() {
    let workspace = TestWorkspace::new();
    workspace.write("bad.csv", "a,b\nx\n");

    load_command(&workspace)
        .arg("--fail-on-error")
        .assert()
        .failure()
        .stderr(contains("1 file(s) failed to load"));
}

#[test]
fn empty_directory_reports_no_files() {
    let workspace = TestWorkspace::new();

    load_command(&workspace)
        .assert()
        .success()
        .stdout(contains("No files found"));
}

#[test]
fn missing_source_directory_exits_non_zero() {
    let workspace = TestWorkspace::new();

    Command::cargo_bin("csv-db-loader")
        .expect("binary exists")
        .arg("load")
        .arg(workspace.path().join("nope"))
        .arg(workspace.database())
        .assert()
        .failure()
        .stderr(contains("does not exist or is not a directory"));
}

#[test]
fn flags_override_config_file() {
    let workspace = TestWorkspace::new();
    workspace.write("codes.tsv", "code\tname\n0001\tみずほ\n");
    let config = workspace.path().join("loader.yaml");
    fs::write(&config, "extension: .tsv\nencoding: utf-8\ndelimiter: ','\n").expect("write config");

    load_command(&workspace)
        .arg("--config")
        .arg(&config)
        .args(["--delimiter", "tab"])
        .assert()
        .success();

    let conn = workspace.open_db();
    assert_eq!(table_names(&conn), vec!["codes"]);
    assert_eq!(table_rows(&conn, "codes"), vec![vec!["0001", "みずほ"]]);
}

#[test]
fn invalid_config_file_is_reported() {
    let workspace = TestWorkspace::new();
    let config = workspace.path().join("loader.yaml");
    fs::write(&config, "delimiter: ';'\nquote: ';'\n").expect("write config");

    load_command(&workspace)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(contains("Delimiter and quote character must differ"));
}

#[test]
fn scrape_banks_rejects_malformed_proxy() {
    Command::cargo_bin("csv-db-loader")
        .expect("binary exists")
        .args(["scrape-banks", "--proxy", "proxy.local"])
        .assert()
        .failure()
        .stderr(contains("host:port"));
}
