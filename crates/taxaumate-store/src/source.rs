//! Seams for the two external retrieval services.

use async_trait::async_trait;
use taxaumate_core::{HydratedRecord, MatchCandidate, SourceType};

use crate::StoreError;

/// A similarity index holding embeddings for one source.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Name used in logs and error messages.
    fn name(&self) -> &str;

    /// Source tag attached to every candidate this index returns.
    fn source_type(&self) -> SourceType;

    /// Nearest `top_k` ids to `vector`, best first.
    async fn query(&self, vector: &[f32], top_k: usize)
    -> Result<Vec<MatchCandidate>, StoreError>;
}

/// A document collection holding the full records for one source.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    fn source_type(&self) -> SourceType;

    /// Bulk lookup by id. Return order is unspecified and ids with no record
    /// are simply absent from the result.
    async fn fetch(&self, ids: &[String]) -> Result<Vec<HydratedRecord>, StoreError>;
}
