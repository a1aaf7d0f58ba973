//! AI service layer: query embeddings and streamed chat completions.

mod error;
pub use error::AiError;

mod model;
pub use model::{ChatModel, Embedder, TextStream};

#[cfg(feature = "openai")]
mod openai;
#[cfg(feature = "openai")]
mod sse;
#[cfg(feature = "openai")]
pub use openai::OpenAiClient;
