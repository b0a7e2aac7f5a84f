use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::dispatcher::{Action, CommandDispatcher, search_url};
use crate::ear::{Ear, HearingError};
use crate::launcher::{Launcher, ProgramLauncher, default_programs};
use crate::mouth::Mouth;
use crate::responder::Responder;

/// Spoken when the recognition backend cannot be reached.
pub const RECOGNITION_FAILED: &str = "Ошибка соединения с сервисом распознавания";

/// The interactive shell: listens for commands and acts on them.
pub struct Assistant<E, M> {
    ear: E,
    mouth: M,
    name: String,
    dispatcher: CommandDispatcher,
    programs: ProgramLauncher,
    responder: Responder,
}

impl<E: Ear, M: Mouth> Assistant<E, M> {
    pub fn new(
        ear: E,
        mouth: M,
        config: &Config,
        launcher: Arc<dyn Launcher>,
        responder: Responder,
    ) -> Self {
        let mut programs = ProgramLauncher::new(default_programs(), launcher);
        for (name, command) in &config.programs {
            programs.add(name, command.clone());
        }
        Self {
            ear,
            mouth,
            name: config.assistant.name.clone(),
            dispatcher: CommandDispatcher::new(&config.assistant),
            programs,
            responder,
        }
    }

    /// Greet, then serve commands until told to stop or the ear closes.
    pub async fn run(&self) -> anyhow::Result<()> {
        self.say(&format!("Привет! Я голосовой помощник {}.", self.name))
            .await;
        self.say("Готов к работе! Вы можете сказать мне команду.")
            .await;
        loop {
            match self.ear.listen().await {
                Ok(Some(command)) => {
                    if self.handle(&command).await {
                        break;
                    }
                }
                Ok(None) => {
                    info!("input closed, shutting down");
                    break;
                }
                Err(HearingError::Unrecognized) => info!("command not understood"),
                Err(e @ HearingError::Unavailable(_)) => {
                    warn!(error = %e, "recognition failed");
                    self.say(RECOGNITION_FAILED).await;
                }
            }
        }
        Ok(())
    }

    /// Act on one command. Returns `true` when the shell should stop.
    pub async fn handle(&self, command: &str) -> bool {
        let action = self.dispatcher.dispatch(command);
        debug!(?action, "action");
        match action {
            Action::Say(text) => self.say(&text).await,
            Action::Open { say, url } => {
                self.say(&say).await;
                self.open(&url);
            }
            Action::Search(query) => {
                self.say(&format!("Ищу информацию о {query}")).await;
                self.open(&search_url(&query));
                self.say("Открываю результаты поиска").await;
            }
            Action::Launch(program) => {
                let outcome = self.programs.launch(&program);
                self.say(&outcome).await;
            }
            Action::Ask(prompt) => {
                self.responder.respond(&prompt, &self.mouth).await;
            }
            Action::Exit(farewell) => {
                self.say(&farewell).await;
                return true;
            }
            Action::Ignore => {}
        }
        false
    }

    fn open(&self, url: &str) {
        if let Err(e) = self.programs.open_url(url) {
            warn!(%url, error = %e, "could not open url");
        }
    }

    async fn say(&self, phrase: &str) {
        if let Err(e) = self.mouth.say(phrase).await {
            warn!(error = %e, %phrase, "speech failed");
        }
    }
}
