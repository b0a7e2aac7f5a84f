//! TOML configuration.
//!
//! Every field is optional; missing values take the defaults below.
//!
//! ```toml
//! [llm]
//! base_url = "http://192.168.1.155:11434/"
//! model = "gemma2:2b"
//!
//! [llm.fallback]
//! temperature = 0.2
//!
//! [assistant]
//! aliases = ["ксенофонт"]
//!
//! [programs]
//! "редактор" = "code"
//! ```

use std::path::Path;
use std::time::Duration;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::request::{GenerationProfile, SamplingOptions};
use crate::template::{FALLBACK_TEMPLATE, STREAM_TEMPLATE};
use crate::transport::Timeouts;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "gemma2:2b";

const STREAM_PREAMBLE: &str = "Ты - голосовой ассистент Ксенофонт. Отвечай ясно и кратко, \
используй законченные предложения. Отвечай на русском языке. \
Если вопрос непонятен, уточни или предложи помощь.";

const FALLBACK_PREAMBLE: &str = "Ты - голосовой ассистент Ксенофонт. \
Отвечай кратко, но полно, 1-3 предложениями. Не используй markdown-разметку. \
Отвечай только на русском языке.";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub assistant: AssistantConfig,
    /// Extra launchable programs, merged over the platform defaults.
    pub programs: IndexMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub request_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub fallback_timeout_secs: u64,
    pub stream: ModeOverrides,
    pub fallback: ModeOverrides,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            request_timeout_secs: 120,
            idle_timeout_secs: 30,
            fallback_timeout_secs: 120,
            stream: ModeOverrides::default(),
            fallback: ModeOverrides::default(),
        }
    }
}

/// Per-mode tweaks on top of the built-in streaming or fallback profile.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ModeOverrides {
    pub preamble: Option<String>,
    pub template: Option<String>,
    pub num_predict: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub repeat_penalty: Option<f32>,
}

impl ModeOverrides {
    fn apply(&self, mut profile: GenerationProfile) -> GenerationProfile {
        if let Some(p) = &self.preamble {
            profile.preamble = p.clone();
        }
        if let Some(t) = &self.template {
            profile.template = t.clone();
        }
        let o = &mut profile.options;
        o.num_predict = self.num_predict.unwrap_or(o.num_predict);
        o.temperature = self.temperature.unwrap_or(o.temperature);
        o.top_p = self.top_p.unwrap_or(o.top_p);
        o.repeat_penalty = self.repeat_penalty.unwrap_or(o.repeat_penalty);
        profile
    }
}

impl LlmConfig {
    pub fn stream_profile(&self) -> GenerationProfile {
        self.stream.apply(GenerationProfile {
            model: self.model.clone(),
            preamble: STREAM_PREAMBLE.into(),
            template: STREAM_TEMPLATE.into(),
            options: SamplingOptions::STREAMING,
        })
    }

    pub fn fallback_profile(&self) -> GenerationProfile {
        self.fallback.apply(GenerationProfile {
            model: self.model.clone(),
            preamble: FALLBACK_PREAMBLE.into(),
            template: FALLBACK_TEMPLATE.into(),
            options: SamplingOptions::FALLBACK,
        })
    }

    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            request: Duration::from_secs(self.request_timeout_secs),
            idle: Duration::from_secs(self.idle_timeout_secs),
        }
    }

    pub fn fallback_timeout(&self) -> Duration {
        Duration::from_secs(self.fallback_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Name used when introducing itself.
    pub name: String,
    /// Ways the user addresses the assistant; stripped from commands.
    pub aliases: Vec<String>,
    /// Leading command words stripped before dispatch.
    pub fillers: Vec<String>,
    /// Silence after each spoken phrase, in milliseconds.
    pub pause_ms: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            name: "Ксенофонт".into(),
            aliases: vec!["ксенофонт".into(), "ксенофон".into()],
            fillers: vec![
                "скажи".into(),
                "расскажи".into(),
                "покажи".into(),
                "произнеси".into(),
            ],
            pause_ms: 500,
        }
    }
}

impl AssistantConfig {
    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }
}

impl Config {
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Load a [`Config`] from a TOML file.
///
/// # Examples
///
/// ```no_run
/// use xenofont::config::load;
/// # tokio_test::block_on(async {
/// let cfg = load("xenofont.toml").await.unwrap();
/// println!("{}", cfg.llm.model);
/// # });
/// ```
pub async fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
    let text = tokio::fs::read_to_string(path).await?;
    Config::from_toml(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = Config::from_toml("").unwrap();
        assert_eq!(cfg.llm.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.llm.timeouts().request, Duration::from_secs(120));
        assert_eq!(cfg.assistant.pause(), Duration::from_millis(500));
        assert!(cfg.programs.is_empty());
    }

    #[test]
    fn stream_and_fallback_defaults_differ() {
        let cfg = Config::default();
        let s = cfg.llm.stream_profile();
        let f = cfg.llm.fallback_profile();
        assert_eq!(s.options, SamplingOptions::STREAMING);
        assert_eq!(f.options, SamplingOptions::FALLBACK);
        assert_ne!(s.preamble, f.preamble);
    }

    #[test]
    fn partial_overrides_keep_mode_defaults() {
        let cfg = Config::from_toml(
            r#"
            [llm]
            model = "llama3"
            idle_timeout_secs = 5

            [llm.fallback]
            temperature = 0.1
            "#,
        )
        .unwrap();
        let f = cfg.llm.fallback_profile();
        assert_eq!(f.model, "llama3");
        assert_eq!(f.options.temperature, 0.1);
        assert_eq!(f.options.num_predict, 300);
        assert_eq!(cfg.llm.timeouts().idle, Duration::from_secs(5));
    }

    #[test]
    fn programs_keep_file_order() {
        let cfg = Config::from_toml(
            r#"
            [programs]
            "зет" = "z"
            "альфа" = "a"
            "#,
        )
        .unwrap();
        let names: Vec<_> = cfg.programs.keys().cloned().collect();
        assert_eq!(names, vec!["зет", "альфа"]);
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(Config::from_toml("[llm]\nmodel = 3").is_err());
    }
}
