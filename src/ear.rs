use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

/// Why a listening attempt produced no command.
#[derive(Debug, Error)]
pub enum HearingError {
    /// Something was heard but not understood.
    #[error("speech not recognized")]
    Unrecognized,
    /// The recognition backend could not be reached.
    #[error("recognition service unavailable: {0}")]
    Unavailable(String),
}

/// Source of command strings.
#[async_trait(?Send)]
pub trait Ear {
    /// Wait for the next command. `Ok(None)` means the source is closed.
    async fn listen(&self) -> Result<Option<String>, HearingError>;
}

/// [`Ear`] reading one command per line from an async reader.
pub struct LineEar<R> {
    lines: Mutex<Lines<R>>,
}

impl<R: AsyncBufRead + Unpin> LineEar<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: Mutex::new(reader.lines()),
        }
    }
}

impl LineEar<BufReader<Stdin>> {
    /// Commands typed on standard input.
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

#[async_trait(?Send)]
impl<R: AsyncBufRead + Unpin> Ear for LineEar<R> {
    async fn listen(&self) -> Result<Option<String>, HearingError> {
        let mut lines = self.lines.lock().await;
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => Err(HearingError::Unrecognized),
            Ok(Some(line)) => {
                tracing::info!(command = %line.trim(), "heard");
                Ok(Some(line.trim().to_string()))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(HearingError::Unavailable(e.to_string())),
        }
    }
}
