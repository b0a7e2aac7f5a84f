use serde::Deserialize;
use tracing::{debug, trace};

/// Structured event parsed from one line of the generation stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedEvent {
    /// Text produced by the model. `done` marks the final event.
    Delta { text: String, done: bool },
    /// The endpoint reported an error inside the payload.
    Error(String),
}

#[derive(Deserialize)]
struct Payload {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Parses raw stream lines into [`DecodedEvent`]s.
///
/// Malformed lines decode to `None` and are meant to be skipped.
///
/// ```
/// use xenofont::{ChunkDecoder, DecodedEvent};
///
/// let ev = ChunkDecoder::decode(br#"data: {"response":"hi","done":false}"#);
/// assert_eq!(ev, Some(DecodedEvent::Delta { text: "hi".into(), done: false }));
/// assert_eq!(ChunkDecoder::decode(b"not json"), None);
/// ```
pub struct ChunkDecoder;

impl ChunkDecoder {
    pub fn decode(raw: &[u8]) -> Option<DecodedEvent> {
        let text = match std::str::from_utf8(raw) {
            Ok(t) => t,
            Err(e) => {
                debug!(error = %e, "skipping non utf-8 chunk");
                return None;
            }
        };
        let line = text.trim().trim_start_matches('\u{FEFF}');
        if line.is_empty() {
            return None;
        }
        let body = match line.strip_prefix("data:") {
            Some(rest) => rest.trim_start(),
            None => line,
        };
        if body == "[DONE]" {
            return Some(DecodedEvent::Delta {
                text: String::new(),
                done: true,
            });
        }
        trace!(%body, "stream line");
        match serde_json::from_str::<Payload>(body) {
            Ok(Payload {
                error: Some(message),
                ..
            }) => Some(DecodedEvent::Error(message)),
            Ok(p) => Some(DecodedEvent::Delta {
                text: p.response,
                done: p.done,
            }),
            Err(e) => {
                debug!(error = %e, %body, "skipping unparseable chunk");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta(text: &str, done: bool) -> Option<DecodedEvent> {
        Some(DecodedEvent::Delta {
            text: text.into(),
            done,
        })
    }

    #[test]
    fn plain_ndjson_line() {
        let line = r#"{"model":"gemma2:2b","created_at":"t","response":"Привет","done":false}"#;
        assert_eq!(ChunkDecoder::decode(line.as_bytes()), delta("Привет", false));
    }

    #[test]
    fn strips_data_prefix_and_newline() {
        let line = b"data: {\"response\":\" \",\"done\":true}\n";
        assert_eq!(ChunkDecoder::decode(line), delta(" ", true));
    }

    #[test]
    fn missing_fields_default() {
        assert_eq!(ChunkDecoder::decode(br#"{"done":true}"#), delta("", true));
        assert_eq!(ChunkDecoder::decode(br#"{"response":"x"}"#), delta("x", false));
    }

    #[test]
    fn error_payload() {
        let line = br#"{"error":"model 'nope' not found"}"#;
        assert_eq!(
            ChunkDecoder::decode(line),
            Some(DecodedEvent::Error("model 'nope' not found".into()))
        );
    }

    #[test]
    fn malformed_lines_are_skipped() {
        assert_eq!(ChunkDecoder::decode(b""), None);
        assert_eq!(ChunkDecoder::decode(b"   \r\n"), None);
        assert_eq!(ChunkDecoder::decode(b"{\"response\":\"trunc"), None);
        assert_eq!(ChunkDecoder::decode(b"event: message"), None);
        assert_eq!(ChunkDecoder::decode(b"[1,2,3]"), None);
        assert_eq!(ChunkDecoder::decode(&[0xff, 0xfe, b'{']), None);
    }

    #[test]
    fn done_sentinel() {
        assert_eq!(ChunkDecoder::decode(b"data: [DONE]"), delta("", true));
    }

    #[test]
    fn byte_order_mark_is_ignored() {
        let line = "\u{FEFF}{\"response\":\"a\",\"done\":false}".as_bytes();
        assert_eq!(ChunkDecoder::decode(line), delta("a", false));
    }
}
