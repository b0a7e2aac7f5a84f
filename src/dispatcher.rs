//! Fixed-phrase command handling.
//!
//! Commands are matched by substring against phrase families, checked in a
//! fixed order; the first family that matches wins. Anything unmatched is
//! handed to the language model.

use chrono::{Local, Timelike};
use rand::seq::SliceRandom;
use tracing::debug;

use crate::config::AssistantConfig;

const EXIT: &[&str] = &["стоп", "выход", "пока", "до свидания", "заверши работу"];
const GREETING: &[&str] = &["привет", "здравствуй", "добрый день", "доброе утро"];
const HOW_ARE_YOU: &[&str] = &["как дела", "как ты", "как настроение"];
const TIME: &[&str] = &["время", "который час", "сколько времени"];
const SEARCH: &[&str] = &["найди", "ищи", "поиск", "найти"];
const BROWSER: &[&str] = &["открой браузер", "браузер", "интернет"];
const MUSIC: &[&str] = &["включи музыку", "музыку", "радио", "песни"];
const JOKE: &[&str] = &["анекдот", "шутку", "рассмеши", "пошути"];
const LAUNCH: &[&str] = &["запусти", "открой программу", "открой приложение"];
const LAUNCH_NOISE: &[&str] = &[
    "запусти",
    "открой программу",
    "открой приложение",
    "программу",
    "приложение",
];
const NAME: &[&str] = &["твое имя", "твоё имя", "зовут", "как зовут"];

pub const FAREWELL: &str = "До свидания! Рад был помочь";

pub const GREETINGS: &[&str] = &[
    "Привет! Чем могу помочь?",
    "Здравствуйте! Готов к вашим командам.",
    "Приветствую! Слушаю вас.",
];

pub const MOODS: &[&str] = &[
    "У меня всё отлично, спасибо что спросили!",
    "Работаю в штатном режиме!",
    "Всё хорошо, готов помогать!",
    "Как у цифрового ассистента - отлично!",
];

pub const JOKES: &[&str] = &[
    "Почему программист всегда мокрый? Потому что он постоянно в бассейне с кодом!",
    "Какой язык программирования самый романтичный? Java, потому что у него всегда есть кофе!",
    "Почему Python не хочет идти на вечеринку? Потому что у него слишком много скобок!",
    "Что сказал один байт другому? Я тебя bit!",
];

/// What the shell should do with a recognized command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Say(String),
    /// Announce, then open a web page.
    Open { say: String, url: String },
    /// Look `query` up in the encyclopedia.
    Search(String),
    /// Launch a program by spoken name.
    Launch(String),
    /// Let the language model answer.
    Ask(String),
    /// Say goodbye and stop the shell.
    Exit(String),
    /// Nothing left after cleanup.
    Ignore,
}

fn contains_any(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| text.contains(p))
}

fn pick(options: &[&str]) -> String {
    options
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or_default()
        .to_string()
}

fn strip_all(text: &str, words: &[&str]) -> String {
    let mut out = text.to_string();
    for w in words {
        out = out.replace(w, "");
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// URL of the Russian Wikipedia article for `query`.
pub fn search_url(query: &str) -> String {
    format!("https://ru.wikipedia.org/wiki/{}", urlencoding::encode(query))
}

/// Maps recognized text to an [`Action`].
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    name: String,
    aliases: Vec<String>,
    fillers: Vec<String>,
}

impl CommandDispatcher {
    pub fn new(config: &AssistantConfig) -> Self {
        Self {
            name: config.name.clone(),
            aliases: config.aliases.iter().map(|a| a.to_lowercase()).collect(),
            fillers: config.fillers.iter().map(|f| f.to_lowercase()).collect(),
        }
    }

    /// Lowercase `raw`, drop the first alias found and a leading filler word.
    ///
    /// ```
    /// use xenofont::{CommandDispatcher, config::AssistantConfig};
    /// let d = CommandDispatcher::new(&AssistantConfig::default());
    /// assert_eq!(d.extract("Ксенофонт, скажи который час"), "который час");
    /// ```
    pub fn extract(&self, raw: &str) -> String {
        let mut text = raw.to_lowercase();
        if let Some(alias) = self.aliases.iter().find(|a| text.contains(a.as_str())) {
            text = text.replace(alias.as_str(), "");
        }
        let trim = |s: &str| {
            s.trim_matches(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
                .to_string()
        };
        text = trim(&text);
        if let Some(filler) = self.fillers.iter().find(|f| text.starts_with(f.as_str())) {
            text = trim(&text.replacen(filler.as_str(), "", 1));
        }
        text
    }

    /// Decide what to do with `raw`, using the current local time.
    pub fn dispatch(&self, raw: &str) -> Action {
        self.dispatch_at(raw, Local::now())
    }

    /// Like [`dispatch`](Self::dispatch) with an explicit clock.
    pub fn dispatch_at(&self, raw: &str, now: impl Timelike) -> Action {
        let cmd = self.extract(raw);
        debug!(%raw, %cmd, "dispatching command");
        if cmd.is_empty() {
            return Action::Ignore;
        }
        if contains_any(&cmd, EXIT) {
            return Action::Exit(FAREWELL.into());
        }
        if contains_any(&cmd, GREETING) {
            return Action::Say(pick(GREETINGS));
        }
        if contains_any(&cmd, HOW_ARE_YOU) {
            return Action::Say(pick(MOODS));
        }
        if contains_any(&cmd, TIME) {
            return Action::Say(format!(
                "Сейчас {} часов {} минут",
                now.hour(),
                now.minute()
            ));
        }
        if contains_any(&cmd, SEARCH) {
            let query = strip_all(&cmd, SEARCH);
            if query.is_empty() {
                return Action::Say("Что именно вы хотите найти?".into());
            }
            return Action::Search(query);
        }
        if contains_any(&cmd, BROWSER) {
            return Action::Open {
                say: "Открываю браузер".into(),
                url: "https://www.google.com".into(),
            };
        }
        if contains_any(&cmd, MUSIC) {
            return Action::Open {
                say: "Включаю музыку".into(),
                url: "https://www.youtube.com".into(),
            };
        }
        if contains_any(&cmd, JOKE) {
            return Action::Say(pick(JOKES));
        }
        if contains_any(&cmd, LAUNCH) {
            let program = strip_all(&cmd, LAUNCH_NOISE);
            if program.is_empty() {
                return Action::Say("Какую программу запустить?".into());
            }
            return Action::Launch(program);
        }
        if cmd.contains("спасибо") {
            return Action::Say("Всегда пожалуйста!".into());
        }
        if contains_any(&cmd, NAME) {
            return Action::Say(format!("Меня зовут {}", self.name));
        }
        if cmd.contains("погода") {
            return Action::Say("К сожалению, функция погоды пока не реализована".into());
        }
        Action::Ask(cmd)
    }
}
