use serde::{Deserialize, Serialize};

use crate::template::compose_prompt;

/// Model sampling knobs sent as the Ollama `options` object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingOptions {
    /// Upper bound on generated tokens.
    pub num_predict: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub repeat_penalty: f32,
}

impl SamplingOptions {
    /// Longer, more varied output for streamed answers.
    pub const STREAMING: Self = Self {
        num_predict: 500,
        temperature: 0.7,
        top_p: 0.9,
        repeat_penalty: 1.1,
    };

    /// Short, low-variance output for the single-shot fallback.
    pub const FALLBACK: Self = Self {
        num_predict: 300,
        temperature: 0.3,
        top_p: 0.8,
        repeat_penalty: 1.1,
    };
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self::STREAMING
    }
}

/// Body of a `POST /api/generate` call. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: SamplingOptions,
}

impl GenerationRequest {
    pub fn new(
        model: impl Into<String>,
        prompt: impl Into<String>,
        stream: bool,
        options: SamplingOptions,
    ) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            stream,
            options,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn is_streaming(&self) -> bool {
        self.stream
    }

    pub fn options(&self) -> &SamplingOptions {
        &self.options
    }
}

/// Everything needed to turn a user prompt into a [`GenerationRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationProfile {
    pub model: String,
    /// Fixed instructions placed before the user's words.
    pub preamble: String,
    /// Layout with `{preamble}` and `{prompt}` placeholders.
    pub template: String,
    pub options: SamplingOptions,
}

impl GenerationProfile {
    pub fn request(&self, prompt: &str, stream: bool) -> GenerationRequest {
        let full = compose_prompt(&self.template, &self.preamble, prompt);
        GenerationRequest::new(self.model.clone(), full, stream, self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn profile_composes_prompt() {
        let profile = GenerationProfile {
            model: "m".into(),
            preamble: "Будь краток.".into(),
            template: crate::template::FALLBACK_TEMPLATE.into(),
            options: SamplingOptions::FALLBACK,
        };
        let req = profile.request("кто ты", false);
        assert_eq!(req.prompt(), "Будь краток.\n\nВопрос: кто ты\nОтвет:");
        assert!(!req.is_streaming());
        assert_eq!(req.options().num_predict, 300);
    }

    #[test]
    fn serializes_as_ollama_generate_body() {
        let req = GenerationRequest::new("gemma2:2b", "hi", true, SamplingOptions::STREAMING);
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["model"], json!("gemma2:2b"));
        assert_eq!(body["stream"], json!(true));
        assert_eq!(body["options"]["num_predict"], json!(500));
        assert!(body["options"]["temperature"].is_number());
    }
}
