use async_trait::async_trait;
use futures::stream::BoxStream;
use taxaumate_core::ChatMessage;

use crate::AiError;

/// Text fragments of a streamed completion, in arrival order.
///
/// The stream ends after the service's completion signal. An `Err` item is
/// terminal.
pub type TextStream = BoxStream<'static, Result<String, AiError>>;

/// Turns query text into the vector space of the indexes.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AiError>;
}

/// A chat completion service queried in streaming mode.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Start a completion. Errors before the first fragment come back here;
    /// errors after it arrive on the stream.
    async fn stream_chat(&self, messages: &[ChatMessage]) -> Result<TextStream, AiError>;
}
