use std::{collections::BTreeSet, path::Path};

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, TableError};
use tracing::debug;

use crate::{error::Result, label_query::LabelQuery};

const DOCUMENTS: TableDefinition<(&str, u64), &[u8]> =
    TableDefinition::new("documents");
const DOC_LABELS: TableDefinition<(&str, &str, u64), &[u8]> =
    TableDefinition::new("document_labels");
const LABEL_INDEX: TableDefinition<(&str, &str, &str, u64), ()> =
    TableDefinition::new("label_index");

/// Label field names used in the label tables.
pub mod fields {
    pub const TAGS: &str = "tags";
    pub const CATEGORIES: &str = "categories";
}

/// Embedded document store with a secondary index over label arrays.
///
/// Documents are opaque payload bytes keyed by `(collection, id)`. Alongside
/// each document the store keeps its label arrays (`document_labels`) and a
/// non-unique inverted index over them (`label_index`), both maintained in
/// the same transaction as the document write. Derived index collections
/// (see [`category_index`](crate::category_index)) live in dynamically named
/// tables so they are addressable by name.
pub struct DocumentStore {
    db: Database,
}

impl DocumentStore {
    /// Open or create a document store at the given path.
    ///
    /// # Examples
    ///
    /// ```
    /// # let tmp = tempfile::tempdir().unwrap();
    /// use doctag::DocumentStore;
    ///
    /// let store = DocumentStore::open(&tmp.path().join("docs.redb")).unwrap();
    /// assert!(store.list_ids("articles").unwrap().is_empty());
    /// ```
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::create(path)?;

        let txn = db.begin_write()?;
        txn.open_table(DOCUMENTS)?;
        txn.open_table(DOC_LABELS)?;
        txn.open_table(LABEL_INDEX)?;
        txn.commit()?;

        debug!(path = %path.display(), "opened document store");
        Ok(Self { db })
    }

    /// Insert or replace a document along with its label arrays.
    ///
    /// The payload, the label arrays, and the inverted index entries are
    /// written in a single transaction; stale index entries from a previous
    /// version of the document are removed first.
    pub fn put(
        &self,
        collection: &str,
        id: u64,
        payload: &[u8],
        tags: &[String],
        categories: &[String],
    ) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            let mut documents = txn.open_table(DOCUMENTS)?;
            let mut doc_labels = txn.open_table(DOC_LABELS)?;
            let mut label_index = txn.open_table(LABEL_INDEX)?;

            for (field, labels) in
                [(fields::TAGS, tags), (fields::CATEGORIES, categories)]
            {
                let old = doc_labels
                    .get((collection, field, id))?
                    .map(|guard| guard.value().to_vec());
                if let Some(bytes) = old {
                    for label in decode_labels(&bytes)? {
                        label_index
                            .remove((collection, field, label.as_str(), id))?;
                    }
                }

                doc_labels.insert(
                    (collection, field, id),
                    encode_labels(labels)?.as_slice(),
                )?;
                for label in labels {
                    label_index
                        .insert((collection, field, label.as_str(), id), ())?;
                }
            }

            documents.insert((collection, id), payload)?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Retrieve a document's payload bytes.
    pub fn get(&self, collection: &str, id: u64) -> Result<Option<Vec<u8>>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(DOCUMENTS)?;
        Ok(table.get((collection, id))?.map(|guard| guard.value().to_vec()))
    }

    /// Remove a document and all of its label state.
    pub fn remove(&self, collection: &str, id: u64) -> Result<bool> {
        let txn = self.db.begin_write()?;
        let removed = {
            let mut documents = txn.open_table(DOCUMENTS)?;
            let mut doc_labels = txn.open_table(DOC_LABELS)?;
            let mut label_index = txn.open_table(LABEL_INDEX)?;

            for field in [fields::TAGS, fields::CATEGORIES] {
                let old = doc_labels
                    .remove((collection, field, id))?
                    .map(|guard| guard.value().to_vec());
                if let Some(bytes) = old {
                    for label in decode_labels(&bytes)? {
                        label_index
                            .remove((collection, field, label.as_str(), id))?;
                    }
                }
            }

            documents.remove((collection, id))?.is_some()
        };
        txn.commit()?;
        Ok(removed)
    }

    /// List all document IDs in a collection, ascending.
    pub fn list_ids(&self, collection: &str) -> Result<Vec<u64>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(DOCUMENTS)?;
        let mut ids = Vec::new();
        for entry in table.range((collection, 0u64)..)? {
            let (key, _) = entry?;
            let (coll, id) = key.value();
            if coll != collection {
                break;
            }
            ids.push(id);
        }
        Ok(ids)
    }

    /// Number of documents in a collection.
    pub fn count(&self, collection: &str) -> Result<u64> {
        Ok(self.list_ids(collection)?.len() as u64)
    }

    /// A single document's labels for one field. Missing documents read as
    /// an empty list.
    pub fn labels_of(
        &self,
        collection: &str,
        field: &str,
        id: u64,
    ) -> Result<Vec<String>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(DOC_LABELS)?;
        match table.get((collection, field, id))? {
            Some(guard) => decode_labels(guard.value()),
            None => Ok(Vec::new()),
        }
    }

    /// All `(id, labels)` pairs for one field across a collection, ascending
    /// by id. This is the aggregation input for the category index.
    pub fn labels(
        &self,
        collection: &str,
        field: &str,
    ) -> Result<Vec<(u64, Vec<String>)>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(DOC_LABELS)?;
        let mut result = Vec::new();
        for entry in table.range((collection, field, 0u64)..)? {
            let (key, value) = entry?;
            let (coll, f, id) = key.value();
            if coll != collection || f != field {
                break;
            }
            result.push((id, decode_labels(value.value())?));
        }
        Ok(result)
    }

    /// Execute a label query against the inverted index.
    ///
    /// Returns matching document IDs ascending. A query with zero values
    /// returns an empty set, never the whole collection.
    pub fn find_labeled(
        &self,
        collection: &str,
        field: &str,
        query: &LabelQuery,
    ) -> Result<Vec<u64>> {
        if query.values().is_empty() {
            return Ok(Vec::new());
        }

        let txn = self.db.begin_read()?;
        let index = txn.open_table(LABEL_INDEX)?;

        match query {
            LabelQuery::Any(values) => {
                let mut ids = BTreeSet::new();
                for value in values {
                    for entry in index.range(
                        (collection, field, value.as_str(), 0u64)
                            ..=(collection, field, value.as_str(), u64::MAX),
                    )? {
                        let (key, _) = entry?;
                        ids.insert(key.value().3);
                    }
                }
                Ok(ids.into_iter().collect())
            }
            LabelQuery::All(values) => {
                // Candidates come from the first value's postings; each is
                // verified against the document's full label array.
                let doc_labels = txn.open_table(DOC_LABELS)?;
                let first = values[0].as_str();
                let mut ids = Vec::new();
                for entry in index.range(
                    (collection, field, first, 0u64)
                        ..=(collection, field, first, u64::MAX),
                )? {
                    let (key, _) = entry?;
                    let id = key.value().3;
                    let labels = match doc_labels.get((collection, field, id))? {
                        Some(guard) => decode_labels(guard.value())?,
                        None => Vec::new(),
                    };
                    if query.matches(&labels) {
                        ids.push(id);
                    }
                }
                Ok(ids)
            }
        }
    }

    /// Replace the contents of a derived index collection.
    ///
    /// The old table is dropped and the new entries are written in a single
    /// commit, so readers observe either the previous output or the new one,
    /// never a partial rebuild.
    pub fn replace_index_collection(
        &self,
        name: &str,
        entries: &[(String, u64)],
    ) -> Result<()> {
        let definition: TableDefinition<&str, u64> = TableDefinition::new(name);
        let txn = self.db.begin_write()?;
        txn.delete_table(definition)?;
        {
            let mut table = txn.open_table(definition)?;
            for (value, weight) in entries {
                table.insert(value.as_str(), *weight)?;
            }
        }
        txn.commit()?;
        Ok(())
    }

    /// Read a derived index collection in key order (ascending lexicographic
    /// by value). A collection that was never written reads as empty.
    pub fn read_index_collection(
        &self,
        name: &str,
    ) -> Result<Vec<(String, u64)>> {
        let definition: TableDefinition<&str, u64> = TableDefinition::new(name);
        let txn = self.db.begin_read()?;
        let table = match txn.open_table(definition) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut entries = Vec::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            entries.push((key.value().to_string(), value.value()));
        }
        Ok(entries)
    }
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore").finish_non_exhaustive()
    }
}

fn encode_labels(labels: &[String]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(labels)?)
}

fn decode_labels(bytes: &[u8]) -> Result<Vec<String>> {
    Ok(serde_json::from_slice(bytes)?)
}
