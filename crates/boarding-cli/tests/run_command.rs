use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

#[allow(deprecated)]
fn get_boarding_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("boarding")
}

#[test]
fn test_run_command_help() {
    let mut cmd = Command::new(get_boarding_bin());
    cmd.arg("run").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Run the booking flow against the live site"))
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--chrome-path"))
        .stdout(predicate::str::contains("--headed"))
        .stdout(predicate::str::contains("--timeout"))
        .stdout(predicate::str::contains("--profile"));
}

#[test]
fn test_run_without_chrome_fails() {
    let mut cmd = Command::new(get_boarding_bin());
    cmd.arg("run")
        .arg("--chrome-path")
        .arg("/nonexistent/chrome")
        .env_remove("BOARDING_URL");

    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("-----START-----"))
        .stdout(predicate::str::contains("Launch browser"))
        .stderr(predicate::str::contains("Chrome not found"));
}

#[test]
fn test_run_rejects_invalid_url_before_launch() {
    let mut cmd = Command::new(get_boarding_bin());
    cmd.arg("run")
        .arg("--url")
        .arg("not a url")
        .arg("--chrome-path")
        .arg("/nonexistent/chrome");

    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("-----START-----").not())
        .stderr(predicate::str::contains("base_url"));
}

#[test]
fn test_main_help_lists_commands() {
    let mut cmd = Command::new(get_boarding_bin());
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("completion"));
}
