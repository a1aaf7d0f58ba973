//! DuckDB document store for running against a local Parquet export.
//!
//! Holds a single `documents` table with columns
//! `(id, title, url, text, source_type)`. One connection can serve both
//! sources: [`for_source`](DuckDocumentStore::for_source) hands out views that
//! share it and filter on `source_type`.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use arrow::array::{Array, Int64Array, LargeStringArray, StringArray};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use duckdb::Connection;
use taxaumate_core::{HydratedRecord, SourceType};
use tracing::{debug, info};

use crate::{DocumentStore, StoreError};

/// DuckDB-backed [`DocumentStore`].
///
/// Supports both in-memory (ephemeral) and persistent (file-backed) modes.
/// The connection sits behind a mutex; lookups are short and run inline.
pub struct DuckDocumentStore {
    conn: Arc<Mutex<Connection>>,
    source_type: SourceType,
}

impl DuckDocumentStore {
    /// Open an in-memory database serving `source_type`.
    pub fn open(source_type: SourceType) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::from_connection(conn, source_type))
    }

    /// Open or create a persistent database at the given path.
    ///
    /// If the file already holds a `documents` table it is usable immediately;
    /// check with [`has_documents`](Self::has_documents).
    pub fn open_persistent(path: &Path, source_type: SourceType) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Ok(Self::from_connection(conn, source_type))
    }

    fn from_connection(conn: Connection, source_type: SourceType) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            source_type,
        }
    }

    /// A view of the same database that serves another source.
    pub fn for_source(&self, source_type: SourceType) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
            source_type,
        }
    }

    /// Load a Parquet export into the `documents` table, replacing it.
    pub fn load_documents(&self, path: &Path) -> Result<(), StoreError> {
        if !path.exists() {
            return Err(StoreError::ParquetNotFound(path.to_path_buf()));
        }
        let sql = format!(
            "CREATE OR REPLACE TABLE documents AS SELECT * FROM read_parquet('{}')",
            path.display().to_string().replace('\'', "''")
        );
        self.lock()?.execute_batch(&sql)?;
        let count = self.documents_count()?;
        info!(count, path = %path.display(), "loaded documents table");
        Ok(())
    }

    /// Number of rows in the `documents` table, across all sources.
    pub fn documents_count(&self) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT count(*)::BIGINT AS cnt FROM documents")?;
        let batches: Vec<RecordBatch> = stmt.query_arrow([])?.collect();
        let batch = batches.first().ok_or(StoreError::NoResults)?;
        let col = batch
            .column(0)
            .as_any()
            .downcast_ref::<Int64Array>()
            .ok_or_else(|| StoreError::Other("count column not i64".into()))?;
        Ok(col.value(0) as usize)
    }

    /// Whether a `documents` table exists.
    pub fn has_documents(&self) -> bool {
        self.documents_count().is_ok()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Other(format!("mutex poisoned: {e}")))
    }

    fn fetch_blocking(&self, ids: &[String]) -> Result<Vec<HydratedRecord>, StoreError> {
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT id, title, url, text FROM documents \
             WHERE source_type = ? AND id IN ({placeholders})"
        );
        let mut params: Vec<&str> = Vec::with_capacity(ids.len() + 1);
        params.push(self.source_type.as_str());
        params.extend(ids.iter().map(String::as_str));

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let batches: Vec<RecordBatch> = stmt
            .query_arrow(duckdb::params_from_iter(params))?
            .collect();

        let mut records = Vec::with_capacity(ids.len());
        for batch in &batches {
            for row in 0..batch.num_rows() {
                let Some(id) = col_str(batch.column(0).as_ref(), row) else {
                    continue;
                };
                records.push(HydratedRecord::from_parts(
                    id,
                    col_str(batch.column(1).as_ref(), row).map(str::to_string),
                    col_str(batch.column(2).as_ref(), row).map(str::to_string),
                    col_str(batch.column(3).as_ref(), row).map(str::to_string),
                    self.source_type,
                ));
            }
        }
        Ok(records)
    }
}

#[async_trait]
impl DocumentStore for DuckDocumentStore {
    fn source_type(&self) -> SourceType {
        self.source_type
    }

    async fn fetch(&self, ids: &[String]) -> Result<Vec<HydratedRecord>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let records = self.fetch_blocking(ids)?;
        debug!(
            source = %self.source_type,
            requested = ids.len(),
            returned = records.len(),
            "duckdb lookup"
        );
        Ok(records)
    }
}

/// Get a string value from a column that might be Utf8 or LargeUtf8.
fn col_str(col: &dyn Array, i: usize) -> Option<&str> {
    if col.is_null(i) {
        return None;
    }
    if let Some(arr) = col.as_any().downcast_ref::<StringArray>() {
        return Some(arr.value(i));
    }
    if let Some(arr) = col.as_any().downcast_ref::<LargeStringArray>() {
        return Some(arr.value(i));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SEED: &str = "
        CREATE TABLE documents (id VARCHAR, title VARCHAR, url VARCHAR, text VARCHAR, source_type VARCHAR);
        INSERT INTO documents VALUES
            ('d1', 'Income tax rates', 'https://www.ato.gov.au/rates', 'Resident rates...', 'document'),
            ('d2', 'Work-related deductions', 'https://www.ato.gov.au/deductions', 'You can claim...', 'document'),
            ('d3', NULL, NULL, NULL, 'document'),
            ('l1', 'ITAA 1997 s 8-1', 'https://www.legislation.gov.au/C2004A05138', 'General deductions', 'legislation');
    ";

    fn seeded() -> DuckDocumentStore {
        let store = DuckDocumentStore::open(SourceType::Document).unwrap();
        store.lock().unwrap().execute_batch(SEED).unwrap();
        store
    }

    fn ids(records: &[HydratedRecord]) -> Vec<&str> {
        let mut out: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        out.sort();
        out
    }

    #[tokio::test]
    async fn fetch_by_ids() {
        let store = seeded();
        let records = store.fetch(&["d2".into(), "d1".into()]).await.unwrap();
        assert_eq!(ids(&records), vec!["d1", "d2"]);
        let d2 = records.iter().find(|r| r.id == "d2").unwrap();
        assert_eq!(d2.title, "Work-related deductions");
        assert_eq!(d2.source_type, SourceType::Document);
    }

    #[tokio::test]
    async fn unknown_ids_absent() {
        let store = seeded();
        let records = store.fetch(&["nope".into(), "d1".into()]).await.unwrap();
        assert_eq!(ids(&records), vec!["d1"]);
    }

    #[tokio::test]
    async fn null_fields_use_defaults() {
        let store = seeded();
        let records = store.fetch(&["d3".into()]).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Untitled");
        assert_eq!(records[0].url, "No URL available");
        assert_eq!(records[0].text, "No text available");
    }

    #[tokio::test]
    async fn views_filter_by_source() {
        let documents = seeded();
        let legislation = documents.for_source(SourceType::Legislation);

        let from_docs = documents.fetch(&["l1".into()]).await.unwrap();
        assert!(from_docs.is_empty());

        let from_leg = legislation.fetch(&["l1".into(), "d1".into()]).await.unwrap();
        assert_eq!(ids(&from_leg), vec!["l1"]);
        assert_eq!(from_leg[0].source_type, SourceType::Legislation);
    }

    #[tokio::test]
    async fn empty_ids_skip_query() {
        // No table exists; an empty lookup must not touch the database.
        let store = DuckDocumentStore::open(SourceType::Document).unwrap();
        let records = store.fetch(&[]).await.unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn count_and_has_documents() {
        let empty = DuckDocumentStore::open(SourceType::Document).unwrap();
        assert!(!empty.has_documents());

        let store = seeded();
        assert!(store.has_documents());
        assert_eq!(store.documents_count().unwrap(), 4);
    }

    #[test]
    fn load_missing_file_errors() {
        let store = DuckDocumentStore::open(SourceType::Document).unwrap();
        let result = store.load_documents(Path::new("/nonexistent/documents.parquet"));
        assert!(matches!(result, Err(StoreError::ParquetNotFound(_))));
    }

    #[tokio::test]
    async fn load_parquet_export() {
        let tmp = TempDir::new().unwrap();
        let parquet = tmp.path().join("documents.parquet");

        let source = seeded();
        let copy = format!(
            "COPY documents TO '{}' (FORMAT PARQUET)",
            parquet.display()
        );
        source.lock().unwrap().execute_batch(&copy).unwrap();

        let store = DuckDocumentStore::open(SourceType::Legislation).unwrap();
        store.load_documents(&parquet).unwrap();
        assert_eq!(store.documents_count().unwrap(), 4);

        let records = store.fetch(&["l1".into()]).await.unwrap();
        assert_eq!(records[0].title, "ITAA 1997 s 8-1");
    }

    #[test]
    fn persistent_reopen_keeps_table() {
        let tmp = TempDir::new().unwrap();
        let db_path = tmp.path().join("documents.duckdb");

        let store = DuckDocumentStore::open_persistent(&db_path, SourceType::Document).unwrap();
        assert!(!store.has_documents());
        store.lock().unwrap().execute_batch(SEED).unwrap();
        drop(store);

        let store = DuckDocumentStore::open_persistent(&db_path, SourceType::Document).unwrap();
        assert!(store.has_documents());
        assert_eq!(store.documents_count().unwrap(), 4);
    }
}
