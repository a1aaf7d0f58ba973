//! Id hydration across per-source document stores.
//!
//! Merged candidates are grouped by source, each store is asked once for its
//! whole id set, and the records are then laid back out in merge order. Store
//! return order never reaches the caller.

use std::collections::{BTreeMap, HashMap};

use taxaumate_core::{HydratedRecord, MatchCandidate, SourceType};
use tracing::{debug, warn};

use crate::{DocumentStore, StoreError};

/// Document stores keyed by the source they serve.
#[derive(Default)]
pub struct DocumentStores {
    stores: BTreeMap<SourceType, Box<dyn DocumentStore>>,
}

impl DocumentStores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a store under its own source type, replacing any previous one.
    pub fn insert(&mut self, store: Box<dyn DocumentStore>) {
        self.stores.insert(store.source_type(), store);
    }

    pub fn with(mut self, store: Box<dyn DocumentStore>) -> Self {
        self.insert(store);
        self
    }

    pub fn get(&self, source_type: SourceType) -> Option<&dyn DocumentStore> {
        self.stores.get(&source_type).map(|s| s.as_ref())
    }
}

/// Resolve merged candidates to full records, preserving candidate order.
///
/// Ids the store does not know are dropped. A source with no registered store
/// contributes nothing. The first store error aborts the whole hydration.
pub async fn hydrate(
    candidates: &[MatchCandidate],
    stores: &DocumentStores,
) -> Result<Vec<HydratedRecord>, StoreError> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let mut by_source: BTreeMap<SourceType, Vec<String>> = BTreeMap::new();
    for candidate in candidates {
        by_source
            .entry(candidate.source_type)
            .or_default()
            .push(candidate.id.clone());
    }

    let mut found: HashMap<(SourceType, String), HydratedRecord> =
        HashMap::with_capacity(candidates.len());
    for (source_type, ids) in &by_source {
        let Some(store) = stores.get(*source_type) else {
            warn!(source = %source_type, ids = ids.len(), "no document store for source");
            continue;
        };
        let records = store.fetch(ids).await?;
        debug!(
            source = %source_type,
            requested = ids.len(),
            returned = records.len(),
            "fetched records"
        );
        for record in records {
            found.insert((*source_type, record.id.clone()), record);
        }
    }

    let hydrated: Vec<HydratedRecord> = candidates
        .iter()
        .filter_map(|c| found.remove(&(c.source_type, c.id.clone())))
        .collect();

    if hydrated.len() < candidates.len() {
        debug!(
            missing = candidates.len() - hydrated.len(),
            "candidates without a stored record"
        );
    }
    Ok(hydrated)
}
