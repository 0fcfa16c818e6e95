#![allow(deprecated)]
use assert_cmd::Command;
use mockito::{Matcher, Server, ServerGuard};
use predicates::prelude::*;
use tempfile::TempDir;

fn finder() -> Command {
    let mut cmd = Command::cargo_bin("release-manager-finder").unwrap();
    cmd.env_remove("GITHUB_TOKEN").env_remove("RMF_CONFIG");
    cmd
}

/// Config pointing the client at the mock server with a single-team roster.
fn write_config(dir: &TempDir, server: &ServerGuard) -> std::path::PathBuf {
    let path = dir.path().join("config.yaml");
    std::fs::write(
        &path,
        format!(
            "api_url: \"{}\"\n\
             roster:\n  - team: maintainers\n\
             corrections:\n  reattributed: []\n  prior_releases: []\n",
            server.url()
        ),
    )
    .unwrap();
    path
}

fn mock_github(server: &mut ServerGuard) -> (mockito::Mock, mockito::Mock) {
    let roster = server
        .mock("GET", "/orgs/RIOT-OS/teams/maintainers/members")
        .match_query(Matcher::Any)
        .match_header("authorization", "token secret")
        .with_header("content-type", "application/json")
        .with_body(r#"[{"login":"donald"},{"login":"foobar"},{"login":"huey"}]"#)
        .create();
    let releases = server
        .mock("GET", "/repos/RIOT-OS/RIOT/releases")
        .match_query(Matcher::Any)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[
                {"tag_name": "2021.01", "author": {"login": "foobar"}},
                {"tag_name": "2021.04", "author": {"login": "scrooge"}}
            ]"#,
        )
        .create();
    (roster, releases)
}

// ---------------------------------------------------------------------------
// Argument handling
// ---------------------------------------------------------------------------

#[test]
fn help_lists_subcommands() {
    finder()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("pick"))
        .stdout(predicate::str::contains("serve"));
}

#[test]
fn pick_requires_token() {
    let dir = TempDir::new().unwrap();
    let attendees = dir.path().join("attendees.txt");
    std::fs::write(&attendees, "donald\n").unwrap();
    finder()
        .arg("pick")
        .arg(&attendees)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--gh-token"));
}

#[test]
fn missing_attendees_file_is_reported() {
    let dir = TempDir::new().unwrap();
    finder()
        .args(["pick", "-t", "secret"])
        .arg(dir.path().join("nope.txt"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error: reading attendees from"));
}

#[test]
fn malformed_config_is_reported() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.yaml");
    std::fs::write(&config, "roster: [[[\n").unwrap();
    finder()
        .arg("--config")
        .arg(&config)
        .args(["pick", "-t", "secret", "attendees.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: loading config"));
}

// ---------------------------------------------------------------------------
// pick
// ---------------------------------------------------------------------------

#[test]
fn pick_prints_report() {
    let mut server = Server::new();
    let _mocks = mock_github(&mut server);
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &server);
    let attendees = dir.path().join("attendees.txt");
    std::fs::write(&attendees, "# VMA 2024\nfoobar\nhuey\n").unwrap();
    let opt_out = dir.path().join("opt-out.txt");
    std::fs::write(&opt_out, "huey\n").unwrap();

    finder()
        .arg("--config")
        .arg(&config)
        .args(["pick", "-t", "secret", "--opt-out"])
        .arg(&opt_out)
        .arg(&attendees)
        .assert()
        .success()
        .stdout(predicate::str::contains("  1\tscrooge\n"))
        .stdout(predicate::str::contains("Opt-out list\n============\nhuey\n"))
        .stdout(predicate::str::contains(
            "Selection pool\n==============\n  1\tfoobar\n",
        ))
        .stdout(predicate::str::contains(
            "The next release manager is: foobar\n",
        ));
}

#[test]
fn pick_with_unknown_next_rm_fails() {
    let mut server = Server::new();
    let _mocks = mock_github(&mut server);
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &server);
    let attendees = dir.path().join("attendees.txt");
    std::fs::write(&attendees, "foobar\n").unwrap();

    finder()
        .arg("--config")
        .arg(&config)
        .args(["pick", "-t", "secret", "--next-rm", "gyro"])
        .arg(&attendees)
        .assert()
        .failure()
        .stderr(predicate::str::contains("gyro"));
}

#[test]
fn pick_json_output() {
    let mut server = Server::new();
    let _mocks = mock_github(&mut server);
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &server);
    let attendees = dir.path().join("attendees.txt");
    std::fs::write(&attendees, "donald\n").unwrap();

    let output = finder()
        .arg("--config")
        .arg(&config)
        .args(["--json", "pick", "-t", "secret", "--next-rm", "donald"])
        .arg(&attendees)
        .output()
        .unwrap();
    assert!(output.status.success());
    let decision: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(decision["chosen"]["login"], "donald");
    assert_eq!(decision["chosen"]["count"], 1);
    assert_eq!(decision["attendees"], serde_json::json!(["donald"]));
}
