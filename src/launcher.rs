use std::io;
use std::process::{Command, Stdio};
use std::sync::Arc;

use indexmap::IndexMap;
use strsim::normalized_levenshtein;
use tracing::{debug, warn};

/// Similarity a spoken name must exceed to count as a fuzzy match.
pub const MATCH_THRESHOLD: f64 = 0.6;

/// Starts processes and opens URLs on the host.
pub trait Launcher: Send + Sync {
    fn spawn(&self, command: &str) -> io::Result<()>;
    fn open_url(&self, url: &str) -> io::Result<()>;
}

/// [`Launcher`] backed by [`std::process::Command`].
pub struct SystemLauncher;

fn detached(mut cmd: Command) -> io::Result<()> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
}

impl Launcher for SystemLauncher {
    fn spawn(&self, command: &str) -> io::Result<()> {
        debug!(%command, "spawning");
        if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", "", command]);
            return detached(cmd);
        }
        let mut parts = command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command"))?;
        let mut cmd = Command::new(program);
        cmd.args(parts);
        detached(cmd)
    }

    fn open_url(&self, url: &str) -> io::Result<()> {
        debug!(%url, "opening url");
        let cmd = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.args(["/C", "start", "", url]);
            c
        } else if cfg!(target_os = "macos") {
            let mut c = Command::new("open");
            c.arg(url);
            c
        } else {
            let mut c = Command::new("xdg-open");
            c.arg(url);
            c
        };
        detached(cmd)
    }
}

/// Programs known by spoken name, with the built-in Windows and Linux set.
pub fn default_programs() -> IndexMap<String, String> {
    let windows = cfg!(windows);
    [
        ("блокнот", "notepad.exe"),
        ("калькулятор", "calc.exe"),
        ("word", "winword.exe"),
        ("excel", "excel.exe"),
        ("браузер", "chrome.exe"),
        ("текстовый редактор", "gedit"),
        ("терминал", "gnome-terminal"),
        ("файловый менеджер", "nautilus"),
        ("браузер хром", "google-chrome"),
        ("браузер файрфокс", "firefox"),
        ("проводник", if windows { "explorer.exe" } else { "nautilus" }),
        (
            "настройки",
            if windows {
                "control.exe"
            } else {
                "gnome-control-center"
            },
        ),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Resolves spoken program names and launches them.
pub struct ProgramLauncher {
    programs: IndexMap<String, String>,
    launcher: Arc<dyn Launcher>,
}

impl ProgramLauncher {
    pub fn new(programs: IndexMap<String, String>, launcher: Arc<dyn Launcher>) -> Self {
        let mut this = Self {
            programs: IndexMap::new(),
            launcher,
        };
        for (name, command) in programs {
            this.add(&name, command);
        }
        this
    }

    /// Register or replace a program under a lowercase name.
    pub fn add(&mut self, name: &str, command: impl Into<String>) {
        self.programs.insert(name.to_lowercase(), command.into());
    }

    pub fn programs(&self) -> &IndexMap<String, String> {
        &self.programs
    }

    /// Best known program name for `input`.
    ///
    /// Prefers the most similar name above [`MATCH_THRESHOLD`], then the first
    /// program with a name word contained in the input.
    pub fn best_match(&self, input: &str) -> Option<&str> {
        let input = input.trim().to_lowercase();
        let mut best: Option<(&str, f64)> = None;
        for name in self.programs.keys() {
            let ratio = normalized_levenshtein(&input, name);
            if ratio > MATCH_THRESHOLD && best.is_none_or(|(_, r)| ratio > r) {
                best = Some((name, ratio));
            }
        }
        if let Some((name, ratio)) = best {
            debug!(%name, ratio, "fuzzy program match");
            return Some(name);
        }
        self.programs
            .keys()
            .find(|name| name.split_whitespace().any(|w| input.contains(w)))
            .map(String::as_str)
    }

    /// Launch the program named by `input` and describe the outcome.
    pub fn launch(&self, input: &str) -> String {
        if input.trim().is_empty() {
            return "Не указано название программы".into();
        }
        let Some(name) = self.best_match(input) else {
            let suggestions: Vec<&str> = self.programs.keys().take(3).map(String::as_str).collect();
            return format!(
                "Не знаю, как запустить '{}'. Доступные программы: {}",
                input.trim(),
                suggestions.join(", ")
            );
        };
        let command = &self.programs[name];
        match self.launcher.spawn(command) {
            Ok(()) => format!("Запускаю {name}"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(%command, "program not found");
                format!("Не найден файл для {name}")
            }
            Err(e) => {
                warn!(%command, error = %e, "launch failed");
                format!("Ошибка при запуске {name}: {e}")
            }
        }
    }

    /// Open `url` in the default browser.
    pub fn open_url(&self, url: &str) -> io::Result<()> {
        self.launcher.open_url(url)
    }
}
