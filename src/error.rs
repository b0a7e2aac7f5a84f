use thiserror::Error;

/// Spoken when the endpoint does not answer in time.
pub const TIMEOUT_APOLOGY: &str = "Извините, запрос занял слишком много времени";
/// Spoken when the endpoint cannot be reached.
pub const CONNECTION_MESSAGE: &str = "Ошибка соединения с языковой моделью";

/// Terminal failures of a request to the generation endpoint.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Non-success HTTP status.
    #[error("endpoint returned status {0}")]
    Status(reqwest::StatusCode),
    /// Error reported inside a response payload.
    #[error("endpoint reported: {0}")]
    Remote(String),
    /// No response, or the stream stalled.
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connection(#[source] reqwest::Error),
}

impl LlmError {
    /// Classify a transport error from `reqwest`.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else if err.is_decode() {
            LlmError::Remote(format!("malformed response: {err}"))
        } else {
            LlmError::Connection(err)
        }
    }

    /// Short phrase suitable for speaking to the user.
    pub fn user_message(&self) -> String {
        match self {
            LlmError::Status(status) => format!("Ошибка API: {}", status.as_u16()),
            LlmError::Remote(msg) => format!("Ошибка языковой модели: {msg}"),
            LlmError::Timeout => TIMEOUT_APOLOGY.to_string(),
            LlmError::Connection(_) => CONNECTION_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_message_uses_code() {
        let err = LlmError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.user_message(), "Ошибка API: 503");
    }

    #[test]
    fn timeout_is_an_apology() {
        assert_eq!(LlmError::Timeout.user_message(), TIMEOUT_APOLOGY);
    }
}
