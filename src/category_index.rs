//! The derived category index: a weighted frequency table of every category
//! value in a collection.
//!
//! The index is fully recomputed after each save: a two-phase job where the
//! map phase emits `(value, 1)` per entry of each document's category array
//! and the reduce phase sums per distinct value. The output replaces the
//! derived collection named by [`index_collection_name`] in a single commit,
//! so readers see either the previous rebuild or the new one. There is no
//! incremental maintenance.

use std::collections::BTreeMap;

use tracing::debug;

use crate::{
    error::{Error, Result},
    index_name::index_collection_name,
    model::ModelConfig,
    store::{DocumentStore, fields},
};

/// Post-save hook: recompute the model's category index.
///
/// No-op when indexing is disabled for the model. A failed rebuild surfaces
/// as [`Error::IndexRecomputation`]; the triggering document write is already
/// committed and stays committed. Callers get "document saved, index stale",
/// never a rolled-back save.
pub fn on_document_saved(store: &DocumentStore, config: &ModelConfig) -> Result<()> {
    if !config.categories_index_enabled() {
        return Ok(());
    }

    rebuild(store, config.collection()).map_err(|source| Error::IndexRecomputation {
        collection: config.collection().to_string(),
        source: Box::new(source),
    })
}

/// Recompute the derived index from every document in the collection.
///
/// Duplicate values within one document's array each count toward the
/// weight, matching the codec's no-deduplication contract.
pub fn rebuild(store: &DocumentStore, collection: &str) -> Result<()> {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for (_id, values) in store.labels(collection, fields::CATEGORIES)? {
        for value in values {
            *counts.entry(value).or_insert(0) += 1;
        }
    }

    let entries: Vec<(String, u64)> = counts.into_iter().collect();
    debug!(collection, distinct = entries.len(), "rebuilt category index");
    store.replace_index_collection(&index_collection_name(collection), &entries)
}

/// The distinct category values across the collection, ascending
/// lexicographic. Empty if the index was never computed.
pub fn categories(store: &DocumentStore, collection: &str) -> Result<Vec<String>> {
    Ok(categories_with_weight(store, collection)?
        .into_iter()
        .map(|(value, _)| value)
        .collect())
}

/// The distinct category values with their weights, in the same order as
/// [`categories`]. Useful for category clouds.
pub fn categories_with_weight(
    store: &DocumentStore,
    collection: &str,
) -> Result<Vec<(String, u64)>> {
    store.read_index_collection(&index_collection_name(collection))
}
