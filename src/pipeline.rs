//! Streamed answers split into speakable fragments.

use async_stream::stream;
use futures::stream::BoxStream;
use tracing::{debug, trace, warn};

use crate::decoder::{ChunkDecoder, DecodedEvent};
use crate::error::LlmError;
use crate::request::GenerationProfile;
use crate::segmenter::SentenceSegmenter;
use crate::transport::StreamTransport;

/// One unit handed to the speech consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// A completed piece of the generated answer.
    Sentence(String),
    /// The message announcing why the stream ended early. Always last.
    Failure(String),
}

impl Fragment {
    /// Text to speak.
    pub fn text(&self) -> &str {
        match self {
            Fragment::Sentence(t) | Fragment::Failure(t) => t,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Fragment::Failure(_))
    }
}

/// Lazy, ordered stream of [`Fragment`]s for one request.
pub type FragmentStream = BoxStream<'static, Fragment>;

/// Turns a prompt into a stream of fragments read from the generation
/// endpoint as the model produces them.
#[derive(Debug, Clone)]
pub struct ResponsePipeline {
    transport: StreamTransport,
    profile: GenerationProfile,
}

impl ResponsePipeline {
    pub fn new(transport: StreamTransport, profile: GenerationProfile) -> Self {
        Self { transport, profile }
    }

    /// Open a fresh connection for `prompt` and stream its fragments.
    ///
    /// Nothing is read from the network until the stream is polled, and each
    /// poll reads only as far as the next fragment. Terminal errors end the
    /// stream with a single [`Fragment::Failure`]. Dropping the stream closes
    /// the connection.
    pub fn stream(&self, prompt: &str) -> FragmentStream {
        let transport = self.transport.clone();
        let request = self.profile.request(prompt, true);
        Box::pin(stream! {
            let mut lines = match transport.open(&request).await {
                Ok(lines) => lines,
                Err(e) => {
                    warn!(error = %e, "generation stream failed to open");
                    yield Fragment::Failure(e.user_message());
                    return;
                }
            };
            let mut segmenter = SentenceSegmenter::new();
            loop {
                let line = match lines.next_line().await {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        debug!("generation stream ended without done flag");
                        if let Some(last) = segmenter.flush() {
                            yield Fragment::Sentence(last);
                        }
                        return;
                    }
                    Err(e) => {
                        warn!(error = %e, dropped = segmenter.pending(), "generation stream interrupted");
                        yield Fragment::Failure(e.user_message());
                        return;
                    }
                };
                match ChunkDecoder::decode(&line) {
                    None => continue,
                    Some(DecodedEvent::Error(msg)) => {
                        let err = LlmError::Remote(msg);
                        warn!(error = %err, "generation stream reported error");
                        yield Fragment::Failure(err.user_message());
                        return;
                    }
                    Some(DecodedEvent::Delta { text, done }) => {
                        trace!(token = %text, "llm token");
                        for sentence in segmenter.feed(&text) {
                            yield Fragment::Sentence(sentence);
                        }
                        if done {
                            if let Some(last) = segmenter.flush() {
                                yield Fragment::Sentence(last);
                            }
                            debug!("generation stream done");
                            return;
                        }
                    }
                }
            }
        })
    }
}
