//! End-to-end tests that run the `films` binary against a generated config.

mod common;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn write_config(root: &Path, database_url: &str) -> PathBuf {
    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let config_content = format!(
        r#"[relational]
url = "{}"

[document]
backend = "memory"

[search]
keyword_limit = 10
letter_limit = 20

[logging]
error_log = "{}/logs/log.fail"
"#,
        database_url,
        root.display()
    );

    let config_path = config_dir.join("films.toml");
    fs::write(&config_path, config_content).unwrap();
    config_path
}

async fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("films.sqlite");
    common::create_catalog(&db_path, true).await;
    let config_path = write_config(tmp.path(), &common::sqlite_url(&db_path));
    (tmp, config_path)
}

fn run_films(root: &Path, config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = env!("CARGO_BIN_EXE_films");
    let output = Command::new(binary)
        .current_dir(root)
        .env_remove("DEBUG")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(config_path)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run films binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[tokio::test]
async fn test_keyword_command() {
    let (tmp, config_path) = setup_test_env().await;

    let (stdout, stderr, success) = run_films(tmp.path(), &config_path, &["keyword", "alien"]);
    assert!(success, "keyword failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Found 3 film(s)"));
    assert!(stdout.contains("CHAMBER ALIEN"));
    assert!(!stderr.contains("failed"));
}

#[tokio::test]
async fn test_keyword_command_with_offset() {
    let (tmp, config_path) = setup_test_env().await;

    let (stdout, _, success) = run_films(
        tmp.path(),
        &config_path,
        &["keyword", "alien", "--limit", "2", "--offset", "2"],
    );
    assert!(success);
    assert!(stdout.contains("Found 1 film(s)"));
}

#[tokio::test]
async fn test_criteria_command_json() {
    let (tmp, config_path) = setup_test_env().await;

    let (stdout, stderr, success) = run_films(
        tmp.path(),
        &config_path,
        &[
            "criteria", "--genre", "Comedy", "--from", "2000", "--to", "2010", "--json",
        ],
    );
    assert!(success, "criteria failed: stderr={}", stderr);

    let records: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 2);
    for record in records {
        assert_eq!(record["kind"], "classified");
        assert_eq!(record["genre"], "Comedy");
    }
}

#[tokio::test]
async fn test_criteria_command_without_filters() {
    let (tmp, config_path) = setup_test_env().await;

    let (stdout, stderr, success) =
        run_films(tmp.path(), &config_path, &["criteria", "--from", "2000"]);
    assert!(success);
    assert!(stderr.contains("Give a genre"));
    assert!(stdout.contains("No films found."));
}

#[tokio::test]
async fn test_letter_command() {
    let (tmp, config_path) = setup_test_env().await;

    let (stdout, _, success) = run_films(tmp.path(), &config_path, &["letter", "d"]);
    assert!(success);
    assert!(stdout.contains("Found 1 film(s)"));
    assert!(stdout.contains("DANCES NONE"));
}

#[tokio::test]
async fn test_letter_command_rejects_non_letter() {
    let (tmp, config_path) = setup_test_env().await;

    let (_, stderr, success) = run_films(tmp.path(), &config_path, &["letter", "1"]);
    assert!(!success);
    assert!(stderr.contains("expected a single letter"));

    let (_, _, success) = run_films(tmp.path(), &config_path, &["letter", "ab"]);
    assert!(!success);
}

#[tokio::test]
async fn test_get_command() {
    let (tmp, config_path) = setup_test_env().await;

    let (stdout, _, success) = run_films(tmp.path(), &config_path, &["get", "6"]);
    assert!(success);
    assert!(stdout.contains("BRIDE INTRIGUE"));
    assert!(stdout.contains("2005"));

    let (stdout, _, success) = run_films(tmp.path(), &config_path, &["get", "NO SUCH FILM"]);
    assert!(success);
    assert!(stdout.contains("Film not found."));
}

#[tokio::test]
async fn test_genres_and_years_commands() {
    let (tmp, config_path) = setup_test_env().await;

    let (stdout, _, success) = run_films(tmp.path(), &config_path, &["genres", "--json"]);
    assert!(success);
    let mut genres: Vec<String> = serde_json::from_str(&stdout).unwrap();
    genres.sort();
    assert_eq!(genres, vec!["Action", "Comedy", "Drama", "Horror"]);

    let (stdout, _, success) = run_films(tmp.path(), &config_path, &["years"]);
    assert!(success);
    assert!(stdout.contains("1998-2012"));
}

#[tokio::test]
async fn test_stats_command_on_fresh_log() {
    let (tmp, config_path) = setup_test_env().await;

    let (stdout, _, success) = run_films(tmp.path(), &config_path, &["stats"]);
    assert!(success);
    assert!(stdout.contains("SEARCH QUERY STATISTICS"));
    assert!(stdout.contains("No popular queries yet."));
}

#[tokio::test]
async fn test_menu_exits_on_end_of_input() {
    let (tmp, config_path) = setup_test_env().await;

    let output = Command::new(env!("CARGO_BIN_EXE_films"))
        .current_dir(tmp.path())
        .arg("--config")
        .arg(&config_path)
        .stdin(std::process::Stdio::null())
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Choose an action:"));
    assert!(stdout.contains("Goodbye!"));
}

#[test]
fn test_unreachable_store_is_absorbed() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("no-such-dir").join("films.sqlite");
    let config_path = write_config(tmp.path(), &common::sqlite_url(&missing));

    let (stdout, stderr, success) = run_films(tmp.path(), &config_path, &["keyword", "alien"]);
    assert!(success, "lookup failure should not abort: stderr={}", stderr);
    assert!(stdout.contains("No films found."));
    assert!(stderr.contains("keyword search 'alien' failed"));
    assert!(stderr.contains("1 lookup(s) failed"));

    let log = fs::read_to_string(tmp.path().join("logs/log.fail")).unwrap();
    assert!(log.contains("data access failed"));
    assert!(log.contains("keyword search"));
}

#[test]
fn test_invalid_port_in_environment_aborts() {
    let tmp = TempDir::new().unwrap();
    let config_path = write_config(tmp.path(), "sqlite://unused.sqlite");

    let output = Command::new(env!("CARGO_BIN_EXE_films"))
        .current_dir(tmp.path())
        .env("MYSQL_PORT", "not-a-port")
        .arg("--config")
        .arg(&config_path)
        .arg("years")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("MYSQL_PORT"));
}
