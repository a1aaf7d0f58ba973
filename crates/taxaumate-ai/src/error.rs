use thiserror::Error;

#[derive(Error, Debug)]
pub enum AiError {
    #[cfg(feature = "openai")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },

    #[cfg(feature = "openai")]
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("missing API key")]
    MissingApiKey,

    #[error("embedding response contained no vectors")]
    EmptyEmbedding,

    #[error("completion stream ended before the completion signal")]
    StreamTruncated,
}
