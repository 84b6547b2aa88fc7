//! HTTP transport used for the release feed and asset downloads.
//!
//! The rest of the launcher only sees the [`Transport`] trait: a GET that
//! returns the whole body in memory, optionally told the expected size in
//! advance and optionally reporting progress after every chunk. Tests swap in
//! an in-memory implementation; production uses [`HttpTransport`] on top of
//! `reqwest`.

mod buffer;

pub use buffer::DownloadBuffer;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::NetworkConfig;
use crate::core::TransportError;

/// Receives download progress after every chunk.
pub trait ProgressSink: Send + Sync {
    /// `bytes_total` is the expected size, the announced `Content-Length`, or
    /// `None` when neither is known.
    fn on_progress(&self, bytes_read: u64, bytes_total: Option<u64>);
}

/// A single-shot HTTP GET returning the full body.
pub trait Transport: Send + Sync {
    /// Fetch `url` into memory.
    ///
    /// With `expected_size` the buffer is allocated up front. Non-success
    /// statuses and mid-stream failures are errors; a partially read body is
    /// dropped.
    fn fetch(
        &self,
        url: &str,
        expected_size: Option<u64>,
        progress: Option<&dyn ProgressSink>,
    ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send;
}

impl<T: Transport> Transport for &T {
    fn fetch(
        &self,
        url: &str,
        expected_size: Option<u64>,
        progress: Option<&dyn ProgressSink>,
    ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send {
        (**self).fetch(url, expected_size, progress)
    }
}

impl<T: Transport> Transport for Arc<T> {
    fn fetch(
        &self,
        url: &str,
        expected_size: Option<u64>,
        progress: Option<&dyn ProgressSink>,
    ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send {
        (**self).fetch(url, expected_size, progress)
    }
}

/// `reqwest`-backed transport with cooperative cancellation.
///
/// Redirects are followed (release assets are served from a CDN behind a
/// redirect). The cancellation token is checked while waiting for every chunk.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    cancel: CancellationToken,
}

impl HttpTransport {
    /// Build the HTTP client from the network settings.
    pub fn new(config: &NetworkConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .read_timeout(Duration::from_secs(config.read_timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|source| TransportError::Init { source })?;

        Ok(Self {
            client,
            cancel: CancellationToken::new(),
        })
    }

    /// Stop in-flight and future downloads when `cancel` fires.
    pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

impl Transport for HttpTransport {
    async fn fetch(
        &self,
        url: &str,
        expected_size: Option<u64>,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<Vec<u8>, TransportError> {
        debug!("GET {url}");

        let request = self.client.get(url).send();
        let mut response = tokio::select! {
            () = self.cancel.cancelled() => return Err(TransportError::Cancelled),
            response = request => response.map_err(|source| TransportError::Request {
                url: url.to_string(),
                source,
            })?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let announced = response.content_length();
        let mut buffer = match expected_size {
            Some(size) => DownloadBuffer::with_expected_size(size),
            None => DownloadBuffer::unknown_size(),
        };
        let estimate = expected_size.or(announced);

        loop {
            let chunk = tokio::select! {
                () = self.cancel.cancelled() => return Err(TransportError::Cancelled),
                chunk = response.chunk() => chunk.map_err(|source| TransportError::Read {
                    url: url.to_string(),
                    source,
                })?,
            };
            let Some(chunk) = chunk else {
                break;
            };

            buffer.append(&chunk);
            if let Some(progress) = progress {
                let read = buffer.len() as u64;
                progress.on_progress(read, estimate.map(|total| total.max(read)));
            }
        }

        debug!("Read {} bytes from {url}", buffer.len());
        Ok(buffer.into_bytes())
    }
}
