use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use httpmock::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn cargo_bin() -> Command {
    Command::cargo_bin("apinote").expect("binary exists")
}

#[test]
fn displays_help() {
    let mut cmd = cargo_bin();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Markdown notes"));
}

#[test]
fn displays_version() {
    let mut cmd = cargo_bin();
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn send_prints_status_and_saves_document() {
    let vault = assert_fs::TempDir::new().unwrap();
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/v1/users");
        then.status(200)
            .header("content-type", "application/json")
            .body("[{\"id\":1}]");
    });

    let mut cmd = cargo_bin();
    cmd.env("NO_COLOR", "1")
        .arg("--vault")
        .arg(vault.path())
        .arg("send")
        .arg(server.url("/v1/users"))
        .arg("--save");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("GET"))
        .stdout(predicate::str::contains("Status:"))
        .stdout(predicate::str::contains("Saved request to"));

    mock.assert();

    let saved: Vec<_> = std::fs::read_dir(vault.path().join("API Requests"))
        .unwrap()
        .filter_map(|entry| entry.ok())
        .collect();
    assert_eq!(saved.len(), 1);
    let name = saved[0].file_name().to_string_lossy().to_string();
    assert!(name.starts_with("users-"));
    assert!(name.ends_with(".md"));
}

#[test]
fn send_with_malformed_body_never_reaches_server() {
    let vault = assert_fs::TempDir::new().unwrap();
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.any_request();
        then.status(200).body("{}");
    });

    let mut cmd = cargo_bin();
    cmd.arg("--vault")
        .arg(vault.path())
        .arg("send")
        .arg(server.url("/v1/users"))
        .arg("-X")
        .arg("POST")
        .arg("-d")
        .arg("{broken");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid body"));

    assert_eq!(mock.hits(), 0);
}

#[test]
fn settings_changes_are_persisted() {
    let vault = assert_fs::TempDir::new().unwrap();

    let mut cmd = cargo_bin();
    cmd.arg("--vault")
        .arg(vault.path())
        .arg("settings")
        .arg("set-path")
        .arg("Notes/API");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"defaultPath\": \"Notes/API\""));

    vault
        .child(".apinote/settings.json")
        .assert(predicate::str::contains("Notes/API"));

    let mut show = cargo_bin();
    show.arg("--vault").arg(vault.path()).arg("settings");
    show.assert()
        .success()
        .stdout(predicate::str::contains("\"saveResponses\": true"))
        .stdout(predicate::str::contains("Notes/API"));
}

#[test]
fn settings_refuses_paths_outside_the_vault() {
    let vault = assert_fs::TempDir::new().unwrap();

    for path in ["", "/tmp/elsewhere", "../elsewhere"] {
        let mut cmd = cargo_bin();
        cmd.arg("--vault")
            .arg(vault.path())
            .arg("settings")
            .arg("set-path")
            .arg(path);
        cmd.assert()
            .failure()
            .stderr(predicate::str::contains("inside the vault"));
    }

    vault
        .child(".apinote/settings.json")
        .assert(predicate::path::missing());
}
