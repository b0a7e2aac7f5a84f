use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::error::LlmError;
use crate::request::GenerationProfile;

/// Answer used when the endpoint replies without a `response` field.
pub const NO_ANSWER: &str = "Нет ответа.";

static BOLD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid regex"));
static ITALIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.*?)\*").expect("valid regex"));
static CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`(.*?)`").expect("valid regex"));
static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(.*?)\]\(.*?\)").expect("valid regex"));

/// Strip markdown emphasis, inline code and link syntax, keeping the inner
/// text, and collapse whitespace runs to single spaces.
///
/// ```
/// use xenofont::fallback::clean_markup;
/// assert_eq!(clean_markup("**Да**,  это `ls`\n[тут](http://x)"), "Да, это ls тут");
/// ```
pub fn clean_markup(text: &str) -> String {
    let text = BOLD_RE.replace_all(text, "$1");
    let text = ITALIC_RE.replace_all(&text, "$1");
    let text = CODE_RE.replace_all(&text, "$1");
    let text = LINK_RE.replace_all(&text, "$1");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Deserialize)]
struct Reply {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Single-shot, non-streamed request used when streaming gives nothing.
#[derive(Debug, Clone)]
pub struct FallbackRequester {
    client: Client,
    url: Url,
    profile: GenerationProfile,
    timeout: Duration,
}

impl FallbackRequester {
    pub fn new(client: Client, url: Url, profile: GenerationProfile, timeout: Duration) -> Self {
        Self {
            client,
            url,
            profile,
            timeout,
        }
    }

    /// Ask once and return a cleaned answer, or a short spoken diagnostic.
    /// Never fails.
    pub async fn request(&self, prompt: &str) -> String {
        match self.try_request(prompt).await {
            Ok(answer) => answer,
            Err(LlmError::Timeout) => LlmError::Timeout.user_message(),
            Err(e @ LlmError::Status(_)) => {
                warn!(error = %e, "fallback request rejected");
                e.user_message()
            }
            Err(e) => {
                warn!(error = %e, "fallback request failed");
                let detail: String = e.to_string().chars().take(50).collect();
                format!("Ошибка: {detail}")
            }
        }
    }

    async fn try_request(&self, prompt: &str) -> Result<String, LlmError> {
        let request = self.profile.request(prompt, false);
        debug!(url = %self.url, model = request.model(), "fallback request");
        let call = async {
            let response = self
                .client
                .post(self.url.clone())
                .json(&request)
                .send()
                .await
                .map_err(LlmError::from_transport)?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                debug!(%status, body = %body.chars().take(100).collect::<String>(), "fallback error body");
                return Err(LlmError::Status(status));
            }
            response
                .json::<Reply>()
                .await
                .map_err(LlmError::from_transport)
        };
        let reply = tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| LlmError::Timeout)??;
        if let Some(msg) = reply.error {
            return Err(LlmError::Remote(msg));
        }
        let answer = reply.response.unwrap_or_else(|| NO_ANSWER.to_string());
        debug!(%answer, "fallback full response");
        let cleaned = clean_markup(&answer);
        if cleaned.is_empty() {
            return Ok(NO_ANSWER.to_string());
        }
        Ok(cleaned)
    }
}
