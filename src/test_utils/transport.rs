use std::collections::HashMap;
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::core::TransportError;
use crate::transport::{ProgressSink, Transport};

/// Size of the chunks progress is reported in.
const MOCK_CHUNK: usize = 1024;

#[derive(Clone)]
enum MockResponse {
    Body(Vec<u8>),
    Status(u16),
    CancelDuring(CancellationToken),
}

/// In-memory transport keyed by exact URL.
///
/// Unknown URLs answer 404. Bodies are "streamed" in 1 KiB steps so progress
/// sinks see several updates.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, MockResponse>>,
    requests: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.set_body(url, body);
        self
    }

    pub fn with_json(self, url: &str, value: &serde_json::Value) -> Self {
        self.with_body(url, value.to_string())
    }

    pub fn with_status(self, url: &str, status: u16) -> Self {
        self.insert(url, MockResponse::Status(status));
        self
    }

    /// Fire `cancel` when `url` is requested, as if Ctrl+C hit mid-download.
    pub fn cancel_during(self, url: &str, cancel: CancellationToken) -> Self {
        self.insert(url, MockResponse::CancelDuring(cancel));
        self
    }

    /// Replace the body served for `url`.
    pub fn set_body(&self, url: &str, body: impl Into<Vec<u8>>) {
        self.insert(url, MockResponse::Body(body.into()));
    }

    /// Every requested URL, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requests.lock().unwrap().iter().filter(|requested| *requested == url).count()
    }

    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }

    fn insert(&self, url: &str, response: MockResponse) {
        self.responses.lock().unwrap().insert(url.to_string(), response);
    }
}

impl Transport for MockTransport {
    async fn fetch(
        &self,
        url: &str,
        expected_size: Option<u64>,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<Vec<u8>, TransportError> {
        self.requests.lock().unwrap().push(url.to_string());
        let response = self.responses.lock().unwrap().get(url).cloned();

        let body = match response {
            Some(MockResponse::Body(body)) => body,
            Some(MockResponse::Status(status)) => {
                return Err(TransportError::Status {
                    url: url.to_string(),
                    status,
                });
            }
            Some(MockResponse::CancelDuring(cancel)) => {
                cancel.cancel();
                return Err(TransportError::Cancelled);
            }
            None => {
                return Err(TransportError::Status {
                    url: url.to_string(),
                    status: 404,
                });
            }
        };

        if let Some(progress) = progress {
            let total = expected_size.unwrap_or(body.len() as u64);
            let mut read = 0usize;
            for chunk in body.chunks(MOCK_CHUNK) {
                read += chunk.len();
                progress.on_progress(read as u64, Some(total.max(read as u64)));
            }
        }

        Ok(body)
    }
}
