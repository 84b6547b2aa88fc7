use tracing::debug;

/// Pre-allocation ceiling for a declared size.
///
/// The declared size comes from the release feed; a bogus value must not turn
/// into a huge allocation before a single byte has arrived.
const MAX_PREALLOCATION: u64 = 256 * 1024 * 1024;

/// Growable in-memory download target.
///
/// Invariant: `len() <= capacity()`. Created pre-sized when the total is
/// known, otherwise empty and grown geometrically as chunks arrive.
#[derive(Debug, Default)]
pub struct DownloadBuffer {
    data: Vec<u8>,
    expected: Option<u64>,
    overflow_logged: bool,
}

impl DownloadBuffer {
    /// Buffer for a body whose size is declared up front.
    pub fn with_expected_size(size: u64) -> Self {
        let capacity = usize::try_from(size.min(MAX_PREALLOCATION)).unwrap_or(0);
        Self {
            data: Vec::with_capacity(capacity),
            expected: Some(size),
            overflow_logged: false,
        }
    }

    /// Buffer for a streamed body of unknown length.
    pub fn unknown_size() -> Self {
        Self::default()
    }

    /// Append a chunk, doubling the capacity when it runs out.
    pub fn append(&mut self, chunk: &[u8]) {
        let needed = self.data.len() + chunk.len();
        if needed > self.data.capacity() {
            let overflowing = self.expected.is_some_and(|expected| needed as u64 > expected);
            if overflowing && !self.overflow_logged {
                debug!("Server sent more than the declared {:?} bytes", self.expected);
                self.overflow_logged = true;
            }
            let grow_to = needed.max(self.data.capacity().saturating_mul(2));
            self.data.reserve_exact(grow_to - self.data.len());
        }
        self.data.extend_from_slice(chunk);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    pub fn expected_size(&self) -> Option<u64> {
        self.expected
    }

    /// Hand the bytes over to the consumer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}
