//! `HttpTransport` against a local HTTP server.

use bang_launcher::config::NetworkConfig;
use bang_launcher::core::TransportError;
use bang_launcher::transport::{HttpTransport, ProgressSink, Transport};
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct Recorder {
    updates: Mutex<Vec<(u64, Option<u64>)>>,
}

impl ProgressSink for Recorder {
    fn on_progress(&self, bytes_read: u64, bytes_total: Option<u64>) {
        self.updates.lock().unwrap().push((bytes_read, bytes_total));
    }
}

fn transport() -> HttpTransport {
    HttpTransport::new(&NetworkConfig::default()).unwrap()
}

#[tokio::test]
async fn test_fetch_known_size() {
    let server = MockServer::start().await;
    let body = vec![42u8; 64 * 1024];

    Mock::given(method("GET"))
        .and(path("/bang.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .mount(&server)
        .await;

    let recorder = Recorder::default();
    let url = format!("{}/bang.zip", server.uri());
    let bytes = transport()
        .fetch(&url, Some(body.len() as u64), Some(&recorder))
        .await
        .unwrap();

    assert_eq!(bytes, body);
    let updates = recorder.updates.lock().unwrap();
    assert!(!updates.is_empty());
    assert_eq!(updates.last(), Some(&(body.len() as u64, Some(body.len() as u64))));
    assert!(updates.windows(2).all(|pair| pair[0].0 <= pair[1].0));
}

#[tokio::test]
async fn test_fetch_unknown_size_uses_content_length() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/releases/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"name":"v1.2"}"#))
        .mount(&server)
        .await;

    let recorder = Recorder::default();
    let url = format!("{}/releases/latest", server.uri());
    let bytes = transport().fetch(&url, None, Some(&recorder)).await.unwrap();

    assert_eq!(bytes, br#"{"name":"v1.2"}"#);
    let updates = recorder.updates.lock().unwrap();
    assert_eq!(updates.last(), Some(&(15, Some(15))));
}

#[tokio::test]
async fn test_sends_user_agent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ua"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let url = format!("{}/ua", server.uri());
    let bytes = transport().fetch(&url, None, None).await.unwrap();
    assert_eq!(bytes, b"ok");
}

#[tokio::test]
async fn test_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let url = format!("{}/missing", server.uri());
    let error = transport().fetch(&url, None, None).await.unwrap_err();
    assert!(matches!(error, TransportError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_follows_redirects() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/download"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", format!("{}/cdn/bang.zip", server.uri()).as_str()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cdn/bang.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"zip".to_vec()))
        .mount(&server)
        .await;

    let url = format!("{}/download", server.uri());
    let bytes = transport().fetch(&url, Some(3), None).await.unwrap();
    assert_eq!(bytes, b"zip");
}

#[tokio::test]
async fn test_connection_refused_is_request_error() {
    // Bind and drop a listener so the port is closed
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let url = format!("http://127.0.0.1:{port}/x");
    let error = transport().fetch(&url, None, None).await.unwrap_err();
    assert!(matches!(error, TransportError::Request { .. }));
}

#[tokio::test]
async fn test_cancel_while_waiting() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let transport = transport().with_cancel_token(cancel.clone());
    let url = format!("{}/slow", server.uri());

    let canceller = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            cancel.cancel();
        })
    };

    let error = transport.fetch(&url, None, None).await.unwrap_err();
    assert!(matches!(error, TransportError::Cancelled));
    canceller.await.unwrap();
}
