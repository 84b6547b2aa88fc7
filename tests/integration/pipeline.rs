//! The full pipeline over HTTP: real transport, real extraction, recorded launch.

use bang_launcher::launch::LaunchMode;
use bang_launcher::launcher::{LaunchOutcome, Launcher, PipelineState};
use bang_launcher::test_utils::{RecordingLauncher, RecordingSink, ZipBuilder, release_json};
use bang_launcher::transport::HttpTransport;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{LATEST_PATH, config_for};

async fn publish(server: &MockServer, version: &str, archive: Vec<u8>) {
    let asset_path = format!("/download/{version}/bang-sdl.zip");
    let asset_url = format!("{}{asset_path}", server.uri());

    Mock::given(method("GET"))
        .and(path(LATEST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(release_json(
            version,
            None,
            &[(asset_url.as_str(), archive.len() as u64)],
        )))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(asset_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(archive))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_install_over_http_then_launch() {
    bang_launcher::test_utils::init_test_logging(None);
    let server = MockServer::start().await;
    let archive = ZipBuilder::new()
        .dir("bang-sdl-2.0/")
        .file("bang-sdl-2.0/bangclient", b"client")
        .file("bang-sdl-2.0/resources/cards/bang.png", vec![1u8; 20_000])
        .build();
    publish(&server, "v2.0", archive).await;

    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("version.txt"), "v1.0\n").unwrap();

    let config = config_for(&server);
    let transport = HttpTransport::new(&config.network).unwrap();
    let app = RecordingLauncher::new();
    let sink = RecordingSink::new();

    let outcome = Launcher::new(config, temp.path(), transport)
        .with_app_launcher(Arc::new(app.clone()))
        .with_sink(Arc::new(sink.clone()))
        .run()
        .await;

    assert!(
        matches!(outcome, LaunchOutcome::Launched { ref version, .. } if version.as_deref() == Some("v2.0")),
        "unexpected outcome: {outcome:?}"
    );
    assert_eq!(fs::read_to_string(temp.path().join("version.txt")).unwrap(), "v2.0\n");
    assert_eq!(fs::read(temp.path().join("bangclient")).unwrap(), b"client");
    assert_eq!(fs::read(temp.path().join("resources/cards/bang.png")).unwrap().len(), 20_000);
    assert_eq!(app.launches(), vec![(temp.path().to_path_buf(), LaunchMode::Client)]);
    assert!(!sink.progress().is_empty());
    assert_eq!(sink.states().last(), Some(&PipelineState::Done));
}

#[tokio::test]
async fn test_second_run_downloads_nothing() {
    let server = MockServer::start().await;
    let archive = ZipBuilder::new().file("bang-sdl-2.0/bangclient", b"client").build();
    publish(&server, "v2.0", archive).await;

    let temp = TempDir::new().unwrap();
    let config = config_for(&server);

    for _ in 0..2 {
        let transport = HttpTransport::new(&config.network).unwrap();
        let outcome = Launcher::new(config.clone(), temp.path(), transport)
            .with_app_launcher(Arc::new(RecordingLauncher::new()))
            .run()
            .await;
        assert!(matches!(outcome, LaunchOutcome::Launched { .. }));
    }

    let requests = server.received_requests().await.unwrap();
    let downloads = requests
        .iter()
        .filter(|request| request.url.path().ends_with("bang-sdl.zip"))
        .count();
    assert_eq!(downloads, 1);
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_malformed_feed_fails_before_install() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LATEST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("this is not json"))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let install_dir = temp.path().join("game");
    let config = config_for(&server);
    let transport = HttpTransport::new(&config.network).unwrap();
    let app = RecordingLauncher::new();

    let outcome = Launcher::new(config, &install_dir, transport)
        .with_app_launcher(Arc::new(app.clone()))
        .run()
        .await;

    assert!(matches!(
        outcome,
        LaunchOutcome::Failed(bang_launcher::core::LauncherError::MalformedResponse { .. })
    ));
    assert!(!install_dir.exists());
    assert_eq!(app.launch_count(), 0);
}
