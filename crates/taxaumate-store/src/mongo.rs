//! MongoDB document store: one collection per source, records keyed by `_id`.

use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};
use taxaumate_core::{HydratedRecord, SourceType};
use tracing::{debug, info};

use crate::{DocumentStore, StoreError};

const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Connect to MongoDB and confirm the server answers a `ping`.
pub async fn connect_mongo(uri: &str) -> Result<Client, StoreError> {
    let mut options = ClientOptions::parse(uri).await?;
    options.server_selection_timeout = Some(SERVER_SELECTION_TIMEOUT);
    let client = Client::with_options(options)?;
    client.database("admin").run_command(doc! { "ping": 1 }).await?;
    info!("mongodb connection successful");
    Ok(client)
}

/// Records for one source, read from a single collection.
pub struct MongoStore {
    collection: Collection<Document>,
    source_type: SourceType,
}

impl MongoStore {
    pub fn new(client: &Client, db_name: &str, collection: &str, source_type: SourceType) -> Self {
        Self {
            collection: client.database(db_name).collection(collection),
            source_type,
        }
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    fn source_type(&self) -> SourceType {
        self.source_type
    }

    async fn fetch(&self, ids: &[String]) -> Result<Vec<HydratedRecord>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let filter = doc! { "_id": { "$in": ids.to_vec() } };
        let docs: Vec<Document> = self.collection.find(filter).await?.try_collect().await?;
        debug!(
            collection = %self.collection.name(),
            requested = ids.len(),
            returned = docs.len(),
            "mongodb lookup"
        );
        Ok(docs
            .iter()
            .map(|d| record_from_document(d, self.source_type))
            .collect())
    }
}

/// Map a stored document to a record, defaulting missing display fields.
fn record_from_document(doc: &Document, source_type: SourceType) -> HydratedRecord {
    let id = match doc.get("_id") {
        Some(Bson::String(s)) => s.clone(),
        Some(Bson::ObjectId(oid)) => oid.to_hex(),
        Some(other) => other.to_string(),
        None => String::new(),
    };
    HydratedRecord::from_parts(
        id,
        string_field(doc, "title"),
        string_field(doc, "url"),
        string_field(doc, "text"),
        source_type,
    )
}

fn string_field(doc: &Document, key: &str) -> Option<String> {
    doc.get_str(key).ok().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    #[test]
    fn full_document_maps_fields() {
        let d = doc! {
            "_id": "ato-tr-2021-1",
            "title": "TR 2021/1 Income tax: when a provision is a deduction",
            "url": "https://www.ato.gov.au/law/view/document?docid=TXR/TR20211",
            "text": "This Ruling explains...",
            "scraped_at": "2024-11-02",
        };
        let record = record_from_document(&d, SourceType::Document);
        assert_eq!(record.id, "ato-tr-2021-1");
        assert!(record.title.starts_with("TR 2021/1"));
        assert!(record.url.contains("TXR/TR20211"));
        assert_eq!(record.text, "This Ruling explains...");
        assert_eq!(record.source_type, SourceType::Document);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let d = doc! { "_id": "bare" };
        let record = record_from_document(&d, SourceType::Legislation);
        assert_eq!(record.title, "Untitled");
        assert_eq!(record.url, "No URL available");
        assert_eq!(record.text, "No text available");
    }

    #[test]
    fn non_string_fields_treated_as_missing() {
        let d = doc! { "_id": "odd", "title": 42, "url": Bson::Null };
        let record = record_from_document(&d, SourceType::Document);
        assert_eq!(record.title, "Untitled");
        assert_eq!(record.url, "No URL available");
    }

    #[test]
    fn object_id_rendered_as_hex() {
        let oid = ObjectId::parse_str("65f1a2b3c4d5e6f708192a3b").unwrap();
        let d = doc! { "_id": oid, "title": "x" };
        let record = record_from_document(&d, SourceType::Document);
        assert_eq!(record.id, "65f1a2b3c4d5e6f708192a3b");
    }
}
