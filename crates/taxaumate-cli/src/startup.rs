//! Builds the service handles once, before the first question.

use std::sync::Arc;

use taxaumate_ai::{AiError, OpenAiClient};
use taxaumate_chat::Assistant;
use taxaumate_core::SourceType;
use taxaumate_store::{
    DocumentStores, DuckDocumentStore, MongoStore, PineconeIndex, StoreError, connect_mongo,
};
use thiserror::Error;
use tracing::info;

use crate::config::Config;

/// A service that could not be reached at startup. The display text is what
/// the user sees before the process exits.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Fatal: Could not connect to the document database.")]
    DocumentStore(#[source] StoreError),

    #[error("Fatal: Could not connect to the vector index.")]
    VectorIndex(#[source] StoreError),

    #[error("Fatal: Could not connect to OpenAI.")]
    OpenAi(#[source] AiError),
}

pub async fn build_assistant(config: &Config) -> Result<Assistant, StartupError> {
    let stores = document_stores(config)
        .await
        .map_err(StartupError::DocumentStore)?;

    let documents = PineconeIndex::connect(
        &config.pinecone_api_key,
        &config.pinecone_index,
        SourceType::Document,
    )
    .await
    .map_err(StartupError::VectorIndex)?;
    let legislation = match &config.pinecone_legislation_index {
        Some(name) => Some(
            PineconeIndex::connect(&config.pinecone_api_key, name, SourceType::Legislation)
                .await
                .map_err(StartupError::VectorIndex)?,
        ),
        None => None,
    };

    let openai = OpenAiClient::new(&config.openai_api_key)
        .map_err(StartupError::OpenAi)?
        .with_base_url(&config.openai_base_url)
        .with_embedding_model(&config.embedding_model)
        .with_chat_model(&config.chat_model)
        .with_temperature(config.temperature);
    let openai = Arc::new(openai);

    let mut assistant = Assistant::new(openai.clone(), openai, stores)
        .with_index(Box::new(documents))
        .with_top_k(config.top_k);
    if let Some(index) = legislation {
        assistant = assistant.with_index(Box::new(index));
    }
    info!(
        sources = if config.has_legislation() { 2 } else { 1 },
        top_k = assistant.top_k(),
        "assistant ready"
    );
    Ok(assistant)
}

async fn document_stores(config: &Config) -> Result<DocumentStores, StoreError> {
    let mut stores = DocumentStores::new();

    if config.uses_local_documents() {
        let documents = local_documents(config)?;
        if config.has_legislation() {
            stores.insert(Box::new(documents.for_source(SourceType::Legislation)));
        }
        stores.insert(Box::new(documents));
        return Ok(stores);
    }

    let uri = config
        .mongo_uri
        .as_deref()
        .ok_or_else(|| StoreError::Other("no MongoDB URI configured".into()))?;
    let client = connect_mongo(uri).await?;
    stores.insert(Box::new(MongoStore::new(
        &client,
        &config.mongo_db,
        &config.mongo_collection,
        SourceType::Document,
    )));
    if config.has_legislation() {
        stores.insert(Box::new(MongoStore::new(
            &client,
            &config.mongo_db,
            &config.mongo_legislation_collection,
            SourceType::Legislation,
        )));
    }
    Ok(stores)
}

/// Open the DuckDB store, reusing a persisted `documents` table when there is
/// one and loading the Parquet export otherwise.
fn local_documents(config: &Config) -> Result<DuckDocumentStore, StoreError> {
    let store = match &config.documents_db {
        Some(path) => DuckDocumentStore::open_persistent(path, SourceType::Document)?,
        None => DuckDocumentStore::open(SourceType::Document)?,
    };
    if store.has_documents() {
        info!(count = store.documents_count()?, "reusing documents table");
        return Ok(store);
    }
    let Some(parquet) = &config.documents_parquet else {
        return Err(StoreError::Other(
            "documents database has no documents table and no Parquet export was given".into(),
        ));
    };
    store.load_documents(parquet)?;
    Ok(store)
}
