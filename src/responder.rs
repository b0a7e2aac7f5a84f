use std::time::Duration;

use futures::StreamExt;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::LlmConfig;
use crate::fallback::FallbackRequester;
use crate::mouth::Mouth;
use crate::pipeline::ResponsePipeline;
use crate::transport::{StreamTransport, generate_url};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Cue spoken while the model starts generating.
pub const THINKING: &str = "Думаю...";

/// Outcome of [`Responder::respond`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    /// Fragments of generated content that were spoken.
    pub sentences: usize,
    /// Whether the single-shot fallback had to answer.
    pub used_fallback: bool,
}

/// Speaks a model answer fragment by fragment, falling back to a single-shot
/// request when the stream yields no content.
#[derive(Debug, Clone)]
pub struct Responder {
    pipeline: ResponsePipeline,
    fallback: FallbackRequester,
}

impl Responder {
    pub fn new(pipeline: ResponsePipeline, fallback: FallbackRequester) -> Self {
        Self { pipeline, fallback }
    }

    /// Build the streaming and fallback clients for one endpoint, sharing a
    /// single connection pool.
    pub fn from_config(llm: &LlmConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .pool_max_idle_per_host(10)
            .build()?;
        let url = generate_url(&llm.base_url)?;
        let transport = StreamTransport::new(client.clone(), url.clone(), llm.timeouts());
        let pipeline = ResponsePipeline::new(transport, llm.stream_profile());
        let fallback =
            FallbackRequester::new(client, url, llm.fallback_profile(), llm.fallback_timeout());
        Ok(Self::new(pipeline, fallback))
    }

    /// Answer `prompt` through `mouth`.
    ///
    /// The next fragment is requested only after `mouth` finished the
    /// previous one.
    pub async fn respond(&self, prompt: &str, mouth: &dyn Mouth) -> Delivery {
        speak(mouth, THINKING).await;
        let mut sentences = 0usize;
        {
            let mut fragments = self.pipeline.stream(prompt);
            while let Some(fragment) = fragments.next().await {
                if !fragment.is_failure() {
                    sentences += 1;
                }
                speak(mouth, fragment.text()).await;
            }
        }
        if sentences > 0 {
            debug!(sentences, "streamed answer delivered");
            return Delivery {
                sentences,
                used_fallback: false,
            };
        }
        info!("stream gave no content, asking once without streaming");
        let answer = self.fallback.request(prompt).await;
        speak(mouth, &answer).await;
        Delivery {
            sentences,
            used_fallback: true,
        }
    }
}

async fn speak(mouth: &dyn Mouth, phrase: &str) {
    if let Err(e) = mouth.say(phrase).await {
        warn!(error = %e, %phrase, "speech failed");
    }
}
