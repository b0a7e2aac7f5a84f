use std::time::Duration;

use reqwest::{Client, Response};
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::LlmError;
use crate::request::GenerationRequest;

/// Build the `/api/generate` URL for an Ollama base URL.
///
/// ```
/// use xenofont::transport::generate_url;
/// let url = generate_url("http://192.168.1.155:11434/").unwrap();
/// assert_eq!(url.as_str(), "http://192.168.1.155:11434/api/generate");
/// ```
pub fn generate_url(base_url: &str) -> Result<Url, url::ParseError> {
    Url::parse(&format!("{}/api/generate", base_url.trim_end_matches('/')))
}

/// Longest line accepted from the stream before it is abandoned.
pub const MAX_LINE_BYTES: usize = 1 << 20;

/// Time bounds applied to one streamed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Total duration of the request, headers and body included.
    pub request: Duration,
    /// Longest silence tolerated between two network reads.
    pub idle: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            request: Duration::from_secs(120),
            idle: Duration::from_secs(30),
        }
    }
}

/// Opens streamed generation requests.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct StreamTransport {
    client: Client,
    url: Url,
    timeouts: Timeouts,
}

impl StreamTransport {
    pub fn new(client: Client, url: Url, timeouts: Timeouts) -> Self {
        Self {
            client,
            url,
            timeouts,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Send `request` and wait for the response headers.
    ///
    /// The returned [`LineStream`] owns the connection; dropping it closes
    /// the connection.
    pub async fn open(&self, request: &GenerationRequest) -> Result<LineStream, LlmError> {
        let deadline = Instant::now() + self.timeouts.request;
        debug!(url = %self.url, model = request.model(), "opening generation stream");
        let send = self.client.post(self.url.clone()).json(request).send();
        let response = match timeout_at(deadline, send).await {
            Err(_) => return Err(LlmError::Timeout),
            Ok(Err(e)) => return Err(LlmError::from_transport(e)),
            Ok(Ok(r)) => r,
        };
        let status = response.status();
        if !status.is_success() {
            return Err(LlmError::Status(status));
        }
        Ok(LineStream {
            response,
            pending: Vec::new(),
            deadline,
            idle: self.timeouts.idle,
            finished: false,
        })
    }
}

/// Newline-framed view over a streaming HTTP body.
///
/// Reads from the network only when asked for the next line.
#[derive(Debug)]
pub struct LineStream {
    response: Response,
    pending: Vec<u8>,
    deadline: Instant,
    idle: Duration,
    finished: bool,
}

impl LineStream {
    /// Next raw line including its trailing newline, or `None` once the body
    /// is exhausted. A final unterminated line is returned as is.
    ///
    /// A line growing past [`MAX_LINE_BYTES`] without a newline ends the
    /// stream with [`LlmError::Remote`].
    pub async fn next_line(&mut self) -> Result<Option<Vec<u8>>, LlmError> {
        loop {
            if let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
                return Ok(Some(self.pending.drain(..=pos).collect()));
            }
            if self.pending.len() > MAX_LINE_BYTES {
                warn!(len = self.pending.len(), "unterminated line too long");
                self.pending.clear();
                return Err(LlmError::Remote(format!(
                    "line longer than {MAX_LINE_BYTES} bytes"
                )));
            }
            if self.finished {
                if self.pending.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(std::mem::take(&mut self.pending)));
            }
            let remaining = self.deadline.saturating_duration_since(Instant::now());
            match timeout(self.idle.min(remaining), self.response.chunk()).await {
                Err(_) => return Err(LlmError::Timeout),
                Ok(Err(e)) => return Err(LlmError::from_transport(e)),
                Ok(Ok(Some(bytes))) => {
                    trace!(len = bytes.len(), "stream read");
                    self.pending.extend_from_slice(&bytes);
                }
                Ok(Ok(None)) => self.finished = true,
            }
        }
    }
}
