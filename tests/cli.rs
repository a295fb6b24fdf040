use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// keep logs, data and stored config away from the real home directory
fn quizbit(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("quizbit").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"));
    cmd
}

#[test]
fn show_leaderboard_without_results() {
    let dir = TempDir::new().unwrap();
    quizbit(dir.path())
        .arg("--show-leaderboard")
        .arg("--leaderboard")
        .arg(dir.path().join("players.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("No results yet."));
}

#[test]
fn show_leaderboard_prints_ranked_entries() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("players.json");
    std::fs::write(
        &path,
        r#"{"PlayersData":[{"Name":"Low","Score":10},{"Name":"High","Score":900}]}"#,
    )
    .unwrap();

    quizbit(dir.path())
        .args(["--show-leaderboard", "--leaderboard"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"(?s)1\. High\s+900.*2\. Low\s+10").unwrap());
}

#[test]
fn name_is_required_to_play() {
    let dir = TempDir::new().unwrap();
    quizbit(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("--name"));
}

#[test]
fn blank_name_is_rejected() {
    let dir = TempDir::new().unwrap();
    quizbit(dir.path())
        .args(["--name", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("player name is required"));
}

#[test]
fn zero_rounds_is_rejected() {
    let dir = TempDir::new().unwrap();
    quizbit(dir.path())
        .args(["--name", "Ana", "--rounds", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("total rounds must be at least 1"));
}

#[test]
fn malformed_bank_is_rejected_before_play() {
    let dir = TempDir::new().unwrap();
    let bank = dir.path().join("q.json");
    std::fs::write(
        &bank,
        r#"{"QuestionsData":[{"Question":"Q","Options":{"A":"1","B":"2","C":"3"},"Answer":"A"}]}"#,
    )
    .unwrap();

    quizbit(dir.path())
        .args(["--name", "Ana", "-q"])
        .arg(&bank)
        .assert()
        .failure()
        .stderr(predicate::str::contains("question #0 is malformed"));
}

#[test]
fn empty_bank_is_rejected_before_play() {
    let dir = TempDir::new().unwrap();
    let bank = dir.path().join("q.json");
    std::fs::write(&bank, r#"{"QuestionsData":[]}"#).unwrap();

    quizbit(dir.path())
        .args(["--name", "Ana", "-q"])
        .arg(&bank)
        .assert()
        .failure()
        .stderr(predicate::str::contains("question pool is empty"));
}

#[test]
fn refuses_to_play_without_a_tty() {
    let dir = TempDir::new().unwrap();
    quizbit(dir.path())
        .args(["--name", "Ana", "--leaderboard"])
        .arg(dir.path().join("players.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("stdin must be a tty"));
}
