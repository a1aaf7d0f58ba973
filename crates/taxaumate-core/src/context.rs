//! Rendering hydrated records into the context block handed to the model.

use std::fmt::Write;

use crate::types::{HydratedRecord, SourceRef};

/// Serialise records into delimited blocks, in the order given.
///
/// No length budgeting happens here: record text is passed through whole, so
/// upstream stores are expected to hold bounded passages.
pub fn format_context(records: &[HydratedRecord]) -> String {
    let mut out = String::new();
    for record in records {
        // Writing to a String cannot fail.
        let _ = write!(
            out,
            "---\nSource: {}\nTitle: {}\nURL: {}\nText: {}\n---\n\n",
            record.source_type.label(),
            record.title,
            record.url,
            record.text,
        );
    }
    out
}

/// Titles and links for the retrieved-sources panel, in record order.
pub fn source_refs(records: &[HydratedRecord]) -> Vec<SourceRef> {
    records.iter().map(SourceRef::from).collect()
}
