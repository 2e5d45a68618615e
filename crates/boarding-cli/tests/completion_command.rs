use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

#[allow(deprecated)]
fn get_boarding_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("boarding")
}

#[test]
fn test_completion_command_help() {
    let mut cmd = Command::new(get_boarding_bin());
    cmd.arg("completion").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Generate shell completion scripts"))
        .stdout(predicate::str::contains("--shell"));
}

#[test]
fn test_completion_bash_generates_script() {
    let mut cmd = Command::new(get_boarding_bin());
    cmd.arg("completion").arg("--shell").arg("bash");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("_boarding()"))
        .stdout(predicate::str::contains("complete -F _boarding"));
}

#[test]
fn test_completion_zsh_generates_script() {
    let mut cmd = Command::new(get_boarding_bin());
    cmd.arg("completion").arg("--shell").arg("zsh");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("#compdef boarding"));
}

#[test]
fn test_completion_invalid_shell() {
    let mut cmd = Command::new(get_boarding_bin());
    cmd.arg("completion").arg("--shell").arg("invalid-shell");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_completion_requires_shell_flag() {
    let mut cmd = Command::new(get_boarding_bin());
    cmd.arg("completion");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}
