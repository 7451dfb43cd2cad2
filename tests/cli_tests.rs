//! CLI smoke tests for the compiled binary.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn convert_decimal_to_american() {
    Command::cargo_bin("oddsmith")
        .unwrap()
        .args(["convert", "2.50", "--from", "decimal", "--to", "american"])
        .assert()
        .success()
        .stdout(predicate::str::contains("+150"));
}

#[test]
fn convert_american_to_fractional() {
    Command::cargo_bin("oddsmith")
        .unwrap()
        .args(["convert", "-150", "--from", "american", "--to", "fractional"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2/3"));
}

#[test]
fn convert_rejects_unknown_format() {
    Command::cargo_bin("oddsmith")
        .unwrap()
        .args(["convert", "2.50", "--from", "decimal", "--to", "percent"])
        .assert()
        .failure();
}

#[test]
fn convert_rejects_sub_unity_decimal() {
    Command::cargo_bin("oddsmith")
        .unwrap()
        .args(["convert", "0.95", "--from", "decimal", "--to", "american"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must exceed 1"));
}

#[test]
fn run_detects_arbitrage_from_stdin() {
    let now = chrono::Utc::now().to_rfc3339();
    let input = format!(
        concat!(
            r#"{{"event":"derby","market":"match_winner","selection":"x","source":"betfair","odds":{{"format":"decimal","value":"2.20"}},"observed_at":"{now}"}}"#,
            "\n",
            r#"{{"event":"derby","market":"match_winner","selection":"y","source":"betway","odds":{{"format":"decimal","value":"2.10"}},"observed_at":"{now}"}}"#,
            "\n",
        ),
        now = now
    );

    Command::cargo_bin("oddsmith")
        .unwrap()
        .arg("run")
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"transition\":\"detected\""));
}

#[test]
fn run_skips_malformed_lines() {
    Command::cargo_bin("oddsmith")
        .unwrap()
        .arg("run")
        .write_stdin("this is not json\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("detected").not());
}
