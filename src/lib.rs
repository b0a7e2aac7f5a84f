//! Voice command shell with a streaming language-model fallback.
//!
//! Recognized commands are matched against fixed phrases by
//! [`CommandDispatcher`]; everything else is sent to an Ollama endpoint. The
//! answer is streamed through [`ResponsePipeline`], which cuts it into
//! speakable [`Fragment`]s as soon as each one is complete, so speech can start
//! before generation ends.

pub mod assistant;
pub mod config;
pub mod decoder;
pub mod dispatcher;
pub mod ear;
pub mod error;
pub mod fallback;
pub mod launcher;
pub mod logging;
pub mod mouth;
pub mod pipeline;
pub mod request;
pub mod responder;
pub mod segmenter;
pub mod template;
pub mod transport;

pub use assistant::Assistant;
pub use config::Config;
pub use decoder::{ChunkDecoder, DecodedEvent};
pub use dispatcher::{Action, CommandDispatcher};
pub use error::LlmError;
pub use fallback::FallbackRequester;
pub use pipeline::{Fragment, FragmentStream, ResponsePipeline};
pub use request::{GenerationProfile, GenerationRequest, SamplingOptions};
pub use responder::{Delivery, Responder};
pub use segmenter::SentenceSegmenter;
pub use transport::{StreamTransport, Timeouts};
