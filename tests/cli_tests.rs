use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const UNREACHABLE_SERVICE: &str = "http://127.0.0.1:9/analyze-mood";

// Helper function to set up a test Command instance
fn set_up_command(data_dir: &Path, service_url: &str) -> Command {
    let mut cmd = Command::cargo_bin("serenity").unwrap();
    cmd.env_clear()
        .env("HOME", data_dir)
        .env("SERENITY_DIR", data_dir)
        .env("SERENITY_SERVICE_URL", service_url);
    cmd
}

fn sign_in(data_dir: &Path) {
    set_up_command(data_dir, UNREACHABLE_SERVICE)
        .args(["sign-in", "Ada@Example.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed in as ada@example.com"));
}

fn analysis_body() -> String {
    json!({
        "mood_score": 91,
        "mental_state": "peaceful",
        "suggestions": ["Savor the calm", "Go to bed early", "Thank someone"],
        "habits": ["Morning tea ritual", "Weekly nature walk", "Gratitude notes"],
        "breathing_prompt": "Slowly breathe in for five counts and out for five counts."
    })
    .to_string()
}

#[test]
fn test_cli_no_args() {
    let temp_dir = TempDir::new().unwrap();
    set_up_command(temp_dir.path(), UNREACHABLE_SERVICE)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_history_requires_sign_in() {
    let temp_dir = TempDir::new().unwrap();
    set_up_command(temp_dir.path(), UNREACHABLE_SERVICE)
        .arg("history")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not authenticated"));
}

#[test]
fn test_sign_in_rejects_invalid_email() {
    let temp_dir = TempDir::new().unwrap();
    set_up_command(temp_dir.path(), UNREACHABLE_SERVICE)
        .args(["sign-in", "not-an-email"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid email address"));
}

#[test]
fn test_empty_history_after_sign_in() {
    let temp_dir = TempDir::new().unwrap();
    sign_in(temp_dir.path());

    set_up_command(temp_dir.path(), UNREACHABLE_SERVICE)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "No entries yet. Start journaling to track your mood!",
        ));
}

#[test]
fn test_sign_out_ends_session() {
    let temp_dir = TempDir::new().unwrap();
    sign_in(temp_dir.path());

    set_up_command(temp_dir.path(), UNREACHABLE_SERVICE)
        .arg("sign-out")
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed out"));

    assert!(!temp_dir.path().join("session.json").exists());
    set_up_command(temp_dir.path(), UNREACHABLE_SERVICE)
        .arg("history")
        .assert()
        .failure();
}

#[test]
fn test_write_rejects_blank_entry() {
    let temp_dir = TempDir::new().unwrap();
    sign_in(temp_dir.path());

    set_up_command(temp_dir.path(), UNREACHABLE_SERVICE)
        .arg("write")
        .write_stdin("   \n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Journal entry cannot be empty"));

    assert!(!temp_dir.path().join("draft.txt").exists());
}

#[test]
fn test_failed_write_keeps_draft() {
    let temp_dir = TempDir::new().unwrap();
    sign_in(temp_dir.path());

    set_up_command(temp_dir.path(), UNREACHABLE_SERVICE)
        .args(["write", "Felt scattered all afternoon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));

    let draft = fs::read_to_string(temp_dir.path().join("draft.txt")).unwrap();
    assert_eq!(draft, "Felt scattered all afternoon");
}

#[test]
fn test_write_draft_without_draft() {
    let temp_dir = TempDir::new().unwrap();
    sign_in(temp_dir.path());

    set_up_command(temp_dir.path(), UNREACHABLE_SERVICE)
        .args(["write", "--draft"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No draft to submit"));
}

#[test]
fn test_write_draft_then_history() {
    let temp_dir = TempDir::new().unwrap();
    sign_in(temp_dir.path());
    fs::write(temp_dir.path().join("draft.txt"), "Slow morning, lovely evening").unwrap();

    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/analyze-mood")
        .match_body(mockito::Matcher::Json(
            json!({ "entryText": "Slow morning, lovely evening" }),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(analysis_body())
        .expect(1)
        .create();
    let service_url = format!("{}/analyze-mood", server.url());

    set_up_command(temp_dir.path(), &service_url)
        .args(["write", "--draft"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mood score: 91/100"))
        .stdout(predicate::str::contains("Mental state: peaceful"))
        .stdout(predicate::str::contains("Breathing exercise:"));
    mock.assert();

    assert!(!temp_dir.path().join("draft.txt").exists());

    set_up_command(temp_dir.path(), &service_url)
        .args(["history", "--limit", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Average mood: 91/100"))
        .stdout(predicate::str::contains("peaceful"));
}

#[test]
fn test_invalid_log_format_env() {
    let temp_dir = TempDir::new().unwrap();
    set_up_command(temp_dir.path(), UNREACHABLE_SERVICE)
        .env("SERENITY_LOG_FORMAT", "xml")
        .arg("history")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid log format"));
}
