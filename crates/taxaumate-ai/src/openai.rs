//! OpenAI-compatible HTTP client for embeddings and streamed chat completions.

use std::collections::VecDeque;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use serde::{Deserialize, Serialize};
use taxaumate_core::ChatMessage;
use tracing::{debug, info, warn};

use crate::sse::{SseDecoder, SseEvent, delta_content};
use crate::{AiError, ChatModel, Embedder, TextStream};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Client for `/embeddings` and `/chat/completions`.
///
/// Construction makes no request; the first network call happens on the
/// first turn.
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    embedding_model: String,
    chat_model: String,
    temperature: f32,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: [&'a str; 1],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    stream: bool,
}

impl OpenAiClient {
    /// Create a client with the default endpoint, models, and temperature.
    pub fn new(api_key: &str) -> Result<Self, AiError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(AiError::MissingApiKey);
        }
        info!("openai client initialized");
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        })
    }

    /// Point at another OpenAI-compatible server.
    ///
    /// `base_url` should include the API version path, like
    /// `https://api.openai.com/v1` (trailing slash optional).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_embedding_model(mut self, model: &str) -> Self {
        self.embedding_model = model.to_string();
        self
    }

    pub fn with_chat_model(mut self, model: &str) -> Self {
        self.chat_model = model.to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn embedding_body<'a>(&'a self, text: &'a str) -> EmbeddingRequest<'a> {
        EmbeddingRequest {
            model: &self.embedding_model,
            input: [text],
        }
    }

    fn chat_body<'a>(&'a self, messages: &'a [ChatMessage]) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.chat_model,
            messages,
            temperature: self.temperature,
            stream: true,
        }
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response, AiError> {
        let url = format!("{}/{path}", self.base_url);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AiError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp)
    }
}

#[async_trait]
impl Embedder for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AiError> {
        let resp = self.post("embeddings", &self.embedding_body(text)).await?;
        let parsed: EmbeddingResponse = resp.json().await?;
        let vector = first_embedding(parsed)?;
        debug!(dim = vector.len(), model = %self.embedding_model, "embedded query");
        Ok(vector)
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn stream_chat(&self, messages: &[ChatMessage]) -> Result<TextStream, AiError> {
        info!(
            model = %self.chat_model,
            temperature = self.temperature,
            "starting completion stream"
        );
        let resp = self.post("chat/completions", &self.chat_body(messages)).await?;
        let bytes = resp
            .bytes_stream()
            .map(|chunk| chunk.map(|b| b.to_vec()))
            .boxed();
        Ok(completion_fragments(bytes))
    }
}

fn first_embedding(resp: EmbeddingResponse) -> Result<Vec<f32>, AiError> {
    resp.data
        .into_iter()
        .next()
        .map(|d| d.embedding)
        .ok_or(AiError::EmptyEmbedding)
}

struct FragmentState {
    bytes: BoxStream<'static, Result<Vec<u8>, reqwest::Error>>,
    decoder: SseDecoder,
    pending: VecDeque<Result<String, AiError>>,
    finished: bool,
}

impl FragmentState {
    /// Queue the text of decoded events. Returns true once `[DONE]` is seen
    /// or an error has been queued.
    fn absorb(&mut self, events: impl IntoIterator<Item = SseEvent>) -> bool {
        for event in events {
            match event {
                SseEvent::Done => return true,
                SseEvent::Data(data) => match delta_content(&data) {
                    Ok(Some(text)) => self.pending.push_back(Ok(text)),
                    Ok(None) => {}
                    Err(e) => {
                        self.pending.push_back(Err(e));
                        return true;
                    }
                },
            }
        }
        false
    }
}

/// Turn an SSE byte stream into text fragments, ending at `[DONE]`.
///
/// A transport error, an in-band error event, or the connection closing before
/// `[DONE]` ends the stream with a single `Err` item.
fn completion_fragments(
    bytes: BoxStream<'static, Result<Vec<u8>, reqwest::Error>>,
) -> TextStream {
    let state = FragmentState {
        bytes,
        decoder: SseDecoder::default(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }
            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    let events = state.decoder.feed(&chunk);
                    state.finished = state.absorb(events);
                }
                Some(Err(e)) => {
                    warn!(error = %e, "completion stream transport error");
                    state.pending.push_back(Err(AiError::Http(e)));
                    state.finished = true;
                }
                None => {
                    let tail = state.decoder.finish();
                    if !state.absorb(tail) {
                        state.pending.push_back(Err(AiError::StreamTruncated));
                    }
                    state.finished = true;
                }
            }
        }
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxaumate_core::build_messages;

    fn client() -> OpenAiClient {
        OpenAiClient::new("sk-test").unwrap()
    }

    fn byte_stream(chunks: &[&str]) -> BoxStream<'static, Result<Vec<u8>, reqwest::Error>> {
        let owned: Vec<Result<Vec<u8>, reqwest::Error>> =
            chunks.iter().map(|c| Ok(c.as_bytes().to_vec())).collect();
        stream::iter(owned).boxed()
    }

    fn content_event(text: &str) -> String {
        format!(
            "data: {}\n\n",
            serde_json::json!({"choices": [{"index": 0, "delta": {"content": text}}]})
        )
    }

    #[test]
    fn empty_api_key_rejected() {
        assert!(matches!(OpenAiClient::new("  "), Err(AiError::MissingApiKey)));
    }

    #[test]
    fn base_url_trims_trailing_slash() {
        let c = client().with_base_url("http://localhost:11434/v1/");
        assert_eq!(c.base_url, "http://localhost:11434/v1");
    }

    #[test]
    fn embedding_body_shape() {
        let c = client();
        let json = serde_json::to_value(c.embedding_body("What is CGT?")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"model": "text-embedding-ada-002", "input": ["What is CGT?"]})
        );
    }

    #[test]
    fn chat_body_is_streaming_at_low_temperature() {
        let c = client().with_chat_model("gpt-4o");
        let messages = build_messages("", "What is the Medicare levy?");
        let json = serde_json::to_value(c.chat_body(&messages)).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["stream"], true);
        assert!((json["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
    }

    #[test]
    fn embedding_response_first_vector() {
        let json = r#"{"object":"list","data":[{"object":"embedding","index":0,"embedding":[0.25,-0.5]}],"model":"text-embedding-ada-002"}"#;
        let parsed: EmbeddingResponse = serde_json::from_str(json).unwrap();
        assert_eq!(first_embedding(parsed).unwrap(), vec![0.25, -0.5]);
    }

    #[test]
    fn embedding_response_without_data() {
        let parsed: EmbeddingResponse = serde_json::from_str(r#"{"data":[]}"#).unwrap();
        assert!(matches!(first_embedding(parsed), Err(AiError::EmptyEmbedding)));
    }

    #[tokio::test]
    async fn fragments_until_done() {
        let first = content_event("The tax-free ");
        let second = content_event("threshold is $18,200.");
        let chunks = [
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
            first.as_str(),
            &second[..10],
            &second[10..],
            "data: [DONE]\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"ignored\"}}]}\n\n",
        ];
        let fragments: Vec<String> = completion_fragments(byte_stream(&chunks))
            .map(|r| r.unwrap())
            .collect()
            .await;
        assert_eq!(fragments, vec!["The tax-free ", "threshold is $18,200."]);
    }

    #[tokio::test]
    async fn close_without_done_is_truncation() {
        let first = content_event("partial");
        let items: Vec<Result<String, AiError>> =
            completion_fragments(byte_stream(&[first.as_str()])).collect().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), "partial");
        assert!(matches!(items[1], Err(AiError::StreamTruncated)));
    }

    #[tokio::test]
    async fn in_band_error_ends_stream() {
        let first = content_event("Assuming");
        let chunks = [
            first.as_str(),
            "data: {\"error\":{\"message\":\"server overloaded\"}}\n\n",
            "data: [DONE]\n\n",
        ];
        let items: Vec<Result<String, AiError>> =
            completion_fragments(byte_stream(&chunks)).collect().await;
        assert_eq!(items.len(), 2);
        assert!(matches!(&items[1], Err(AiError::Api(m)) if m == "server overloaded"));
    }

    #[tokio::test]
    async fn done_without_trailing_newline() {
        let first = content_event("ok");
        let chunks = [first.as_str(), "data: [DONE]"];
        let items: Vec<Result<String, AiError>> =
            completion_fragments(byte_stream(&chunks)).collect().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].as_ref().unwrap(), "ok");
    }
}
