//! The `bang-launcher` binary end to end.

use assert_cmd::Command;
use bang_launcher::test_utils::{ZipBuilder, release_json};
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::LATEST_PATH;

fn launcher_cmd(config: &Path, install_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("bang-launcher").unwrap();
    cmd.arg("--config")
        .arg(config)
        .arg("--install-dir")
        .arg(install_dir)
        .env("BANG_LAUNCHER_NO_PROGRESS", "1")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("BANG_LAUNCHER_CONFIG");
    cmd
}

fn write_config(dir: &Path, api_base: &str) -> std::path::PathBuf {
    let config = dir.join("launcher.toml");
    fs::write(
        &config,
        format!("[feed]\napi_base = \"{api_base}\"\n\n[network]\nconnect_timeout_secs = 2\n"),
    )
    .unwrap();
    config
}

async fn publish(server: &MockServer, archive: Vec<u8>) {
    let asset_url = format!("{}/download/v2.0/bang-sdl.zip", server.uri());

    Mock::given(method("GET"))
        .and(path(LATEST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(release_json(
            "v2.0",
            None,
            &[(asset_url.as_str(), archive.len() as u64)],
        )))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/download/v2.0/bang-sdl.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(archive))
        .mount(server)
        .await;
}

#[test]
fn test_help() {
    let mut cmd = Command::cargo_bin("bang-launcher").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--install-dir"))
        .stdout(predicate::str::contains("--check"));
}

#[test]
fn test_usage_errors_exit_zero() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "http://127.0.0.1:9");

    launcher_cmd(&config, temp.path())
        .arg("-v")
        .arg("-q")
        .assert()
        .success()
        .stderr(predicate::str::contains("cannot be used with"));

    launcher_cmd(&config, temp.path())
        .arg("--no-such-flag")
        .assert()
        .success()
        .stderr(predicate::str::contains("unexpected argument"));
}

#[test]
fn test_extra_arguments_ignored() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "http://127.0.0.1:9");

    launcher_cmd(&config, temp.path())
        .arg("--offline")
        .arg("server")
        .arg("extra")
        .assert()
        .success()
        .stderr(predicate::str::contains("Cannot launch"))
        .stderr(predicate::str::contains("unexpected argument").not());
}

#[test]
fn test_unreachable_server_exits_zero() {
    let temp = TempDir::new().unwrap();
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = write_config(temp.path(), &format!("http://127.0.0.1:{port}"));
    let install_dir = temp.path().join("game");

    launcher_cmd(&config, &install_dir)
        .assert()
        .success()
        .stderr(predicate::str::contains("Cannot reach the release server"));

    assert!(!install_dir.join("version.txt").exists());
}

#[test]
fn test_invalid_config_exits_zero() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("launcher.toml");
    fs::write(&config, "[feed]\ntrack_commit = false\n\n[data_pack]\nenabled = true\n").unwrap();

    launcher_cmd(&config, temp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_offline_without_install_reports_launch_failure() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "http://127.0.0.1:9");

    launcher_cmd(&config, temp.path())
        .arg("--offline")
        .assert()
        .success()
        .stderr(predicate::str::contains("Cannot launch"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_check_reports_available_update() {
    let server = MockServer::start().await;
    publish(&server, ZipBuilder::new().file("bang/bangclient", b"x").build()).await;

    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), &server.uri());
    let install_dir = temp.path().join("game");

    launcher_cmd(&config, &install_dir)
        .arg("--check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Latest release: v2.0 (game update available)"));

    assert!(!install_dir.exists());
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread")]
async fn test_update_and_launch_server() {
    let server = MockServer::start().await;
    let archive = ZipBuilder::new()
        .dir("bang-sdl-2.0/")
        .file_with_mode("bang-sdl-2.0/bangclient", b"#!/bin/sh\necho client > started.txt\n", 0o755)
        .file_with_mode("bang-sdl-2.0/bangserver", b"#!/bin/sh\necho server > started.txt\n", 0o755)
        .build();
    publish(&server, archive).await;

    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), &server.uri());
    let install_dir = temp.path().join("game");

    launcher_cmd(&config, &install_dir)
        .arg("server")
        .assert()
        .success()
        .stdout(predicate::str::contains("Started version v2.0"));

    assert_eq!(fs::read_to_string(install_dir.join("version.txt")).unwrap(), "v2.0\n");

    // The game is started without waiting for it
    let started = install_dir.join("started.txt");
    let mut content = String::new();
    for _ in 0..50 {
        content = fs::read_to_string(&started).unwrap_or_default();
        if !content.is_empty() {
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(100));
    }
    assert_eq!(content, "server\n");
}
