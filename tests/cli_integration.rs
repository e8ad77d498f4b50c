// CLI integration tests for interactive and one-shot flows.
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use serde_json::Value;

const PEOPLE: &str = "Dwight Joseph djo@gmail.com
Rene Webb webb@gmail.com
Katie Jacobs
Erick Harrington harrington@gmail.com
Myrtle Medina
Erick Burgess
";

const MENU: &str = "=== Menu ===\n1. Search information.\n2. Print all data.\n0. Exit.\n";

fn cmd() -> Command {
    let exe = env!("CARGO_BIN_EXE_roster");
    let mut cmd = Command::new(exe);
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write_people(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("people.txt");
    std::fs::write(&path, contents).expect("write people");
    path
}

fn interactive(path: &Path, stdin: &str) -> Output {
    let mut child = cmd()
        .args(["--data", path.to_str().unwrap()])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(stdin.as_bytes())
        .expect("write stdin");
    child.wait_with_output().expect("wait")
}

fn stdout_text(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("utf8")
}

fn parse_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("valid json")
}

#[test]
fn interactive_search_then_exit() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_people(temp.path(), PEOPLE);

    let output = interactive(&path, "1\nANY\nErick Katie\n0\n");
    assert!(output.status.success());
    let expected = format!(
        "{MENU}Select a matching strategy: ALL, ANY, NONE\n\
Enter a name or email to search all suitable people.\n\
3 persons found:\n\
Katie Jacobs\n\
Erick Harrington harrington@gmail.com\n\
Erick Burgess\n\
{MENU}\n"
    );
    assert_eq!(stdout_text(&output), expected);
}

#[test]
fn listing_twice_is_identical() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_people(temp.path(), PEOPLE);

    let output = interactive(&path, "2\n1\nNONE\nerick\n2\n0\n");
    assert!(output.status.success());
    let text = stdout_text(&output);
    let listings: Vec<&str> = text
        .split("=== List of people ===\n")
        .skip(1)
        .map(|chunk| chunk.split(MENU).next().unwrap())
        .collect();
    assert_eq!(listings.len(), 2);
    assert_eq!(listings[0], listings[1]);
    assert!(listings[0].starts_with("Dwight Joseph djo@gmail.com\n"));
    assert!(text.contains("4 persons found:\n"));
}

#[test]
fn invalid_strategy_keeps_session_alive() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_people(temp.path(), PEOPLE);

    let output = interactive(&path, "1\nSOME\n3\n0\n");
    assert!(output.status.success());
    let text = stdout_text(&output);
    assert!(text.contains("Invalid strategy! Use ALL, ANY or NONE.\n"));
    assert!(text.contains("Incorrect option! Try again.\n"));
    assert_eq!(text.matches("=== Menu ===").count(), 3);
}

#[test]
fn all_with_absent_token_finds_nobody() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_people(temp.path(), PEOPLE);

    let output = cmd()
        .args([
            path.to_str().unwrap(),
            "--strategy",
            "ALL",
            "--query",
            "Erick NotAToken",
        ])
        .output()
        .expect("search");
    assert!(output.status.success());
    assert_eq!(stdout_text(&output), "No matching people found.\n");
}

#[test]
fn one_shot_json_search() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_people(temp.path(), "Tom Rock\nBob Rock\n");

    let output = cmd()
        .args([
            path.to_str().unwrap(),
            "--strategy",
            "NONE",
            "--query",
            "TOM",
            "--json",
        ])
        .output()
        .expect("search");
    assert!(output.status.success());
    let value = parse_json(&output);
    assert_eq!(value["strategy"], "NONE");
    assert_eq!(value["count"], 1);
    assert_eq!(value["people"][0]["first_name"], "Bob");
    assert_eq!(value["people"][0]["email"], "");
}

#[test]
fn one_shot_list_json() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_people(temp.path(), PEOPLE);

    let output = cmd()
        .args([path.to_str().unwrap(), "--list", "--json"])
        .output()
        .expect("list");
    assert!(output.status.success());
    let value = parse_json(&output);
    let people = value["people"].as_array().expect("people array");
    assert_eq!(people.len(), 6);
    assert_eq!(people[2]["last_name"], "Jacobs");
}

#[test]
fn invalid_one_shot_strategy_exit_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_people(temp.path(), PEOPLE);

    let output = cmd()
        .args([path.to_str().unwrap(), "--strategy", "all", "--query", "x"])
        .output()
        .expect("search");
    assert_eq!(output.status.code().unwrap(), 5);
    let err: Value = serde_json::from_slice(&output.stderr).expect("error json");
    assert_eq!(err["error"]["kind"], "InvalidStrategy");
}

#[test]
fn missing_file_exit_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("nope.txt");

    let output = cmd()
        .args(["--data", path.to_str().unwrap(), "--list"])
        .output()
        .expect("list");
    assert_eq!(output.status.code().unwrap(), 3);
    assert!(output.stdout.is_empty());
}

#[test]
fn malformed_line_stops_or_skips() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_people(temp.path(), "Tom Rock\n\nBob Rock\n");

    let stop = cmd()
        .args([path.to_str().unwrap(), "--list"])
        .output()
        .expect("list");
    assert_eq!(stop.status.code().unwrap(), 4);
    let err: Value = serde_json::from_slice(&stop.stderr).expect("error json");
    assert_eq!(err["error"]["line"], 2);

    let skip = cmd()
        .args([path.to_str().unwrap(), "--list", "--errors", "skip"])
        .output()
        .expect("list");
    assert!(skip.status.success());
    assert_eq!(
        stdout_text(&skip),
        "=== List of people ===\nTom Rock\nBob Rock\n"
    );
}

#[test]
fn usage_exit_code() {
    let output = cmd().output().expect("run");
    assert_eq!(output.status.code().unwrap(), 2);
}
