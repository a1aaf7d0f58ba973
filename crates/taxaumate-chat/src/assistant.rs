//! One question in, one recorded answer out.
//!
//! Each turn runs its stages strictly in sequence: embed the question, query
//! every configured index, merge the ranked lists, hydrate the survivors,
//! format them as context, then stream the completion while re-sanitizing the
//! accumulated text after every fragment. Retrieval failures degrade to an
//! empty context; completion failures degrade to a fixed apology. Neither
//! ends the session.

use std::sync::Arc;

use futures::StreamExt;
use taxaumate_ai::{AiError, ChatModel, Embedder};
use taxaumate_core::{
    APOLOGY, ChatMessage, DEFAULT_TOP_K, HydratedRecord, Session, SourceRef, build_messages,
    format_context, merge_candidates, sanitize_response, source_refs,
};
use taxaumate_store::{DocumentStores, VectorIndex, hydrate};
use tracing::{debug, error, info};

use crate::ChatError;
use crate::view::{SEARCHING_STATUS, SYNTHESIZING_STATUS, TurnView};

pub const NO_DOCUMENTS_WARNING: &str =
    "Could not find any relevant documents in the database for this query.";

/// Outcome of the retrieval stage of one turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Retrieval {
    /// Formatted context block; empty when nothing was found.
    pub context: String,
    pub sources: Vec<SourceRef>,
    /// Set when retrieval failed part way.
    pub warning: Option<String>,
}

/// The per-turn pipeline over injected service handles.
///
/// Handles are built once at startup and shared read-only across turns.
pub struct Assistant {
    embedder: Arc<dyn Embedder>,
    chat: Arc<dyn ChatModel>,
    indexes: Vec<Box<dyn VectorIndex>>,
    stores: DocumentStores,
    top_k: usize,
}

impl Assistant {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        chat: Arc<dyn ChatModel>,
        stores: DocumentStores,
    ) -> Self {
        Self {
            embedder,
            chat,
            indexes: Vec::new(),
            stores,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Add an index to query. Lists from all indexes are merged into one
    /// ranking before hydration.
    pub fn with_index(mut self, index: Box<dyn VectorIndex>) -> Self {
        self.indexes.push(index);
        self
    }

    /// Cap on merged candidates, also used as each index's `top_k`.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Find and format context for `question`.
    ///
    /// Never fails: an error at any stage is logged and reported through
    /// [`Retrieval::warning`] with an empty context.
    pub async fn retrieve(&self, question: &str) -> Retrieval {
        match self.search(question).await {
            Ok(records) => Retrieval {
                context: format_context(&records),
                sources: source_refs(&records),
                warning: None,
            },
            Err(e) => {
                error!(error = %e, "context retrieval failed");
                Retrieval {
                    warning: Some(format!("Error searching the database: {e}")),
                    ..Retrieval::default()
                }
            }
        }
    }

    async fn search(&self, question: &str) -> Result<Vec<HydratedRecord>, ChatError> {
        if question.trim().is_empty() {
            return Ok(Vec::new());
        }
        let vector = self.embedder.embed(question).await?;

        let mut lists = Vec::with_capacity(self.indexes.len());
        for index in &self.indexes {
            let matches = index.query(&vector, self.top_k).await?;
            debug!(index = %index.name(), matches = matches.len(), "index lookup");
            lists.push(matches);
        }

        let merged = merge_candidates(lists, self.top_k);
        if merged.is_empty() {
            info!("no candidates for question");
            return Ok(Vec::new());
        }
        let records = hydrate(&merged, &self.stores).await?;
        info!(candidates = merged.len(), records = records.len(), "retrieved context");
        Ok(records)
    }

    /// Answer one question and record both sides of the exchange.
    ///
    /// The user entry is appended first. The assistant entry is the sanitized
    /// answer, or [`APOLOGY`] if the completion failed at any point; a partial
    /// answer is never recorded. Returns the recorded assistant text.
    pub async fn answer_turn(
        &self,
        session: &mut Session,
        question: &str,
        view: &mut dyn TurnView,
    ) -> String {
        session.push_user(question);

        view.status(SEARCHING_STATUS);
        let retrieval = self.retrieve(question).await;
        if let Some(warning) = &retrieval.warning {
            view.warning(warning);
        }
        if retrieval.sources.is_empty() {
            view.warning(NO_DOCUMENTS_WARNING);
        } else {
            view.sources(&retrieval.sources);
        }

        view.status(SYNTHESIZING_STATUS);
        let messages = build_messages(&retrieval.context, question);
        let reply = match self.complete(&messages, view).await {
            Ok(text) => {
                view.finish(&text);
                text
            }
            Err(e) => {
                error!(error = %e, "completion failed");
                view.error(APOLOGY);
                APOLOGY.to_string()
            }
        };

        session.push_assistant(reply.clone());
        reply
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        view: &mut dyn TurnView,
    ) -> Result<String, AiError> {
        let mut stream = self.chat.stream_chat(messages).await?;
        let mut raw = String::new();
        while let Some(fragment) = stream.next().await {
            raw.push_str(&fragment?);
            view.partial(&sanitize_response(&raw));
        }
        debug!(chars = raw.len(), "completion finished");
        Ok(sanitize_response(&raw))
    }
}
