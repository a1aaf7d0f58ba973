//! Retrieval layer: vector index lookups, document stores, and id hydration.

mod error;
pub use error::StoreError;

pub mod hydrate;
pub mod source;

pub use hydrate::{DocumentStores, hydrate};
pub use source::{DocumentStore, VectorIndex};

#[cfg(feature = "pinecone")]
mod pinecone;
#[cfg(feature = "pinecone")]
pub use pinecone::PineconeIndex;

#[cfg(feature = "mongo")]
mod mongo;
#[cfg(feature = "mongo")]
pub use mongo::{MongoStore, connect_mongo};

#[cfg(feature = "duckdb")]
mod duck;
#[cfg(feature = "duckdb")]
pub use duck::DuckDocumentStore;
