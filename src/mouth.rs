use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

/// Abstraction for speaking text back to the user.
///
/// `say` returns once the phrase has been delivered, so a slow mouth paces
/// whoever is feeding it.
///
/// # Example
///
/// ```no_run
/// use xenofont::mouth::Mouth;
/// use async_trait::async_trait;
///
/// struct Silent;
///
/// #[async_trait(?Send)]
/// impl Mouth for Silent {
///     async fn say(&self, _phrase: &str) -> anyhow::Result<()> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait(?Send)]
pub trait Mouth {
    /// Speak the provided phrase.
    async fn say(&self, phrase: &str) -> anyhow::Result<()>;
}

/// [`Mouth`] that prints phrases to stdout, then waits `pause` before
/// returning to leave a gap between phrases.
pub struct ConsoleMouth {
    name: String,
    pause: Duration,
}

impl ConsoleMouth {
    pub fn new(name: impl Into<String>, pause: Duration) -> Self {
        Self {
            name: name.into(),
            pause,
        }
    }
}

#[async_trait(?Send)]
impl Mouth for ConsoleMouth {
    async fn say(&self, phrase: &str) -> anyhow::Result<()> {
        tracing::info!(%phrase, "say");
        {
            let mut out = std::io::stdout().lock();
            writeln!(out, "🤖 {}: {}", self.name, phrase)?;
            out.flush()?;
        }
        if !self.pause.is_zero() {
            tokio::time::sleep(self.pause).await;
        }
        Ok(())
    }
}

/// [`Mouth`] implementation that stores spoken phrases for later inspection.
#[derive(Clone)]
pub struct LoggingMouth {
    log: Arc<Mutex<Vec<String>>>,
}

impl LoggingMouth {
    /// Create a new mouth with an associated log.
    ///
    /// ```
    /// use xenofont::mouth::{LoggingMouth, Mouth};
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let (mouth, log) = LoggingMouth::new();
    /// mouth.say("привет").await.unwrap();
    /// assert_eq!(log.phrases(), vec!["привет"]);
    /// # });
    /// ```
    pub fn new() -> (Self, LoggingMouthLog) {
        let log = Arc::new(Mutex::new(Vec::new()));
        (Self { log: log.clone() }, LoggingMouthLog(log))
    }
}

/// Shared log returned by [`LoggingMouth::new`].
#[derive(Clone)]
pub struct LoggingMouthLog(Arc<Mutex<Vec<String>>>);

impl LoggingMouthLog {
    /// Every phrase spoken so far, in order.
    pub fn phrases(&self) -> Vec<String> {
        self.0.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// Return the last phrase spoken, if any.
    pub fn last(&self) -> Option<String> {
        self.0.lock().ok().and_then(|v| v.last().cloned())
    }
}

#[async_trait(?Send)]
impl Mouth for LoggingMouth {
    async fn say(&self, phrase: &str) -> anyhow::Result<()> {
        if let Ok(mut log) = self.log.lock() {
            log.push(phrase.to_string());
        }
        Ok(())
    }
}
