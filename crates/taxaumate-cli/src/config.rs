//! Command-line and environment configuration.

use std::path::PathBuf;

use clap::Parser;

/// TaxAUmate: answers Australian tax questions from ATO documents.
///
/// Every option can also be set through the environment variable shown.
#[derive(Parser, Debug)]
#[command(name = "taxaumate", version, about)]
pub struct Config {
    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: String,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub openai_base_url: String,

    /// Model used to embed questions
    #[arg(long, env = "EMBEDDING_MODEL", default_value = "text-embedding-ada-002")]
    pub embedding_model: String,

    /// Model used to write answers
    #[arg(long, env = "LLM_MODEL", default_value = "gpt-4o-mini")]
    pub chat_model: String,

    /// Sampling temperature for answers
    #[arg(long, env = "LLM_TEMPERATURE", default_value_t = 0.1)]
    pub temperature: f32,

    /// Pinecone API key
    #[arg(long, env = "PINECONE_API_KEY", hide_env_values = true)]
    pub pinecone_api_key: String,

    /// Pinecone index holding ATO document embeddings
    #[arg(long, env = "PINECONE_INDEX_NAME", default_value = "ato-legal-database")]
    pub pinecone_index: String,

    /// Pinecone index holding legislation embeddings; enables the second source
    #[arg(long, env = "PINECONE_LEGISLATION_INDEX_NAME")]
    pub pinecone_legislation_index: Option<String>,

    /// MongoDB connection string
    #[arg(
        long,
        env = "MONGO_URI",
        hide_env_values = true,
        required_unless_present_any = ["documents_parquet", "documents_db"]
    )]
    pub mongo_uri: Option<String>,

    /// MongoDB database name
    #[arg(long, env = "MONGO_DB_NAME", default_value = "ato_data")]
    pub mongo_db: String,

    /// Collection holding ATO documents
    #[arg(long, env = "MONGO_COLLECTION_NAME", default_value = "documents")]
    pub mongo_collection: String,

    /// Collection holding legislation records
    #[arg(long, env = "MONGO_LEGISLATION_COLLECTION_NAME", default_value = "legislation")]
    pub mongo_legislation_collection: String,

    /// Serve records from a local Parquet export instead of MongoDB
    #[arg(long, env = "DOCUMENTS_PARQUET")]
    pub documents_parquet: Option<PathBuf>,

    /// DuckDB file for local records; an existing documents table is reused
    /// and the Parquet export is only loaded into an empty file
    #[arg(long, env = "DOCUMENTS_DB")]
    pub documents_db: Option<PathBuf>,

    /// Number of records retrieved per question
    #[arg(long, env = "TOP_K", default_value_t = 8, value_parser = parse_top_k)]
    pub top_k: usize,
}

fn parse_top_k(s: &str) -> Result<usize, String> {
    let k: usize = s.parse().map_err(|e| format!("{e}"))?;
    if k == 0 {
        return Err("must be at least 1".to_string());
    }
    Ok(k)
}

impl Config {
    /// Whether a second, legislation source is configured.
    pub fn has_legislation(&self) -> bool {
        self.pinecone_legislation_index.is_some()
    }

    /// Whether records come from DuckDB rather than MongoDB.
    pub fn uses_local_documents(&self) -> bool {
        self.documents_parquet.is_some() || self.documents_db.is_some()
    }
}
