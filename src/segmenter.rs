use tracing::trace;

/// Characters that close a speakable fragment.
pub const TERMINATORS: [char; 7] = ['.', '!', '?', ';', ':', ',', '\n'];

/// Splits a growing stream of text deltas into speakable fragments.
///
/// Every terminator closes the fragment ending at (and including) it. Text
/// after the last terminator stays buffered until more deltas arrive or
/// [`flush`](Self::flush) is called at the end of the stream.
///
/// Adjacent terminators are not merged: `"Да?!"` yields `"Да?"` followed by
/// `"!"`.
///
/// # Examples
///
/// ```
/// use xenofont::SentenceSegmenter;
///
/// let mut seg = SentenceSegmenter::new();
/// assert_eq!(seg.feed("Привет, "), vec!["Привет,"]);
/// assert!(seg.feed("как де").is_empty());
/// assert_eq!(seg.feed("ла?"), vec!["как дела?"]);
/// assert_eq!(seg.flush(), None);
/// ```
#[derive(Debug, Default)]
pub struct SentenceSegmenter {
    buffer: String,
}

impl SentenceSegmenter {
    /// Create a segmenter with an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `delta` and return every fragment it completes, in order.
    pub fn feed(&mut self, delta: &str) -> Vec<String> {
        self.buffer.push_str(delta);
        let mut out = Vec::new();
        while let Some(pos) = self.buffer.find(&TERMINATORS[..]) {
            // all terminators are single-byte
            let fragment: String = self.buffer.drain(..=pos).collect();
            let fragment = fragment.trim();
            if !fragment.is_empty() {
                trace!(%fragment, "fragment complete");
                out.push(fragment.to_string());
            }
        }
        out
    }

    /// Emit whatever unterminated text remains, leaving the buffer empty.
    pub fn flush(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        let rest = rest.trim();
        (!rest.is_empty()).then(|| rest.to_string())
    }

    /// Text received but not yet emitted.
    pub fn pending(&self) -> &str {
        &self.buffer
    }
}
