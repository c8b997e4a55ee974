//! Per-model-type configuration and the typed model handle.

use std::marker::PhantomData;

use serde::{Serialize, de::DeserializeOwned};

use crate::{
    category_index,
    document::{Categorizable, Taggable},
    error::Result,
    index_name::index_collection_name,
    label_codec,
    label_query::LabelQuery,
    store::{DocumentStore, fields},
};

/// Per-model-type configuration: the collection name, the label separators,
/// and the category index toggle.
///
/// Owned by the [`Model`] handle; there is no process-global registry. None
/// of it is persisted, and changing a separator affects subsequent
/// conversions only; stored arrays are never rewritten.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    collection: String,
    tags_separator: String,
    categories_separator: String,
    categories_index_enabled: bool,
}

impl ModelConfig {
    /// Defaults: `","` for both separators, category indexing enabled.
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            tags_separator: label_codec::DEFAULT_SEPARATOR.to_string(),
            categories_separator: label_codec::DEFAULT_SEPARATOR.to_string(),
            categories_index_enabled: true,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn tags_separator(&self) -> &str {
        &self.tags_separator
    }

    pub fn set_tags_separator(&mut self, separator: impl Into<String>) {
        self.tags_separator = separator.into();
    }

    pub fn categories_separator(&self) -> &str {
        &self.categories_separator
    }

    pub fn set_categories_separator(&mut self, separator: impl Into<String>) {
        self.categories_separator = separator.into();
    }

    pub fn categories_index_enabled(&self) -> bool {
        self.categories_index_enabled
    }

    /// Idempotent; takes effect on the next save, never retroactively.
    pub fn enable_categories_index(&mut self) {
        self.categories_index_enabled = true;
    }

    /// Idempotent; already-computed index output is left in place.
    pub fn disable_categories_index(&mut self) {
        self.categories_index_enabled = false;
    }

    /// Name of this model's derived category index collection.
    pub fn categories_index_collection(&self) -> String {
        index_collection_name(&self.collection)
    }
}

/// Typed handle binding a document type to its collection and configuration.
///
/// Saving goes through the store in one transaction and then synchronously
/// recomputes the category index (when enabled): the save is not complete
/// until the index reflects it. Queries run against the store's label index
/// and never read the derived collection; `categories*` reads go the other
/// way and never scan documents.
pub struct Model<'a, T> {
    store: &'a DocumentStore,
    config: ModelConfig,
    _doc: PhantomData<fn() -> T>,
}

impl<'a, T> Model<'a, T> {
    /// A model over `collection` with default configuration.
    pub fn new(store: &'a DocumentStore, collection: impl Into<String>) -> Self {
        Self::with_config(store, ModelConfig::new(collection))
    }

    /// A model with explicit configuration.
    pub fn with_config(store: &'a DocumentStore, config: ModelConfig) -> Self {
        Self {
            store,
            config,
            _doc: PhantomData,
        }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn collection(&self) -> &str {
        self.config.collection()
    }

    pub fn tags_separator(&self) -> &str {
        self.config.tags_separator()
    }

    pub fn set_tags_separator(&mut self, separator: impl Into<String>) {
        self.config.set_tags_separator(separator);
    }

    pub fn categories_separator(&self) -> &str {
        self.config.categories_separator()
    }

    pub fn set_categories_separator(&mut self, separator: impl Into<String>) {
        self.config.set_categories_separator(separator);
    }

    pub fn enable_categories_index(&mut self) {
        self.config.enable_categories_index();
    }

    pub fn disable_categories_index(&mut self) {
        self.config.disable_categories_index();
    }

    pub fn categories_index_collection(&self) -> String {
        self.config.categories_index_collection()
    }

    /// Distinct category values across the collection, ascending
    /// lexicographic. Empty if the index was never computed.
    pub fn categories(&self) -> Result<Vec<String>> {
        category_index::categories(self.store, self.config.collection())
    }

    /// Category values paired with their weights, in [`categories`] order.
    ///
    /// [`categories`]: Model::categories
    pub fn categories_with_weight(&self) -> Result<Vec<(String, u64)>> {
        category_index::categories_with_weight(self.store, self.config.collection())
    }

    /// Remove a document and its label state. Like the original post-save
    /// trigger, removal does not recompute the index; it catches up on the
    /// next save.
    pub fn remove(&self, id: u64) -> Result<bool> {
        self.store.remove(self.config.collection(), id)
    }

    pub fn count(&self) -> Result<u64> {
        self.store.count(self.config.collection())
    }
}

impl<T> Model<'_, T>
where
    T: Serialize + Taggable + Categorizable,
{
    /// Persist a document, then synchronously recompute the category index.
    ///
    /// The document commit and the recomputation are separate steps: an
    /// [`IndexRecomputation`](crate::Error::IndexRecomputation) error means
    /// the document is saved and only the index is stale.
    pub fn save(&self, id: u64, doc: &T) -> Result<()> {
        let payload = serde_json::to_vec(doc)?;
        self.store.put(
            self.config.collection(),
            id,
            &payload,
            doc.tags_array(),
            doc.categories_array(),
        )?;
        category_index::on_document_saved(self.store, &self.config)
    }
}

impl<T> Model<'_, T>
where
    T: DeserializeOwned,
{
    pub fn get(&self, id: u64) -> Result<Option<T>> {
        match self.store.get(self.config.collection(), id)? {
            Some(payload) => Ok(Some(serde_json::from_slice(&payload)?)),
            None => Ok(None),
        }
    }

    /// Documents tagged with the given value.
    pub fn tagged_with(&self, value: impl Into<String>) -> Result<Vec<(u64, T)>> {
        self.find(fields::TAGS, &LabelQuery::one(value))
    }

    /// Documents carrying every one of the given tags.
    pub fn tagged_with_all<I, S>(&self, values: I) -> Result<Vec<(u64, T)>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.find(fields::TAGS, &LabelQuery::all(values))
    }

    /// Documents carrying at least one of the given tags.
    pub fn tagged_with_any<I, S>(&self, values: I) -> Result<Vec<(u64, T)>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.find(fields::TAGS, &LabelQuery::any(values))
    }

    /// Documents categorized with the given value.
    pub fn categorized_with(&self, value: impl Into<String>) -> Result<Vec<(u64, T)>> {
        self.find(fields::CATEGORIES, &LabelQuery::one(value))
    }

    /// Documents carrying every one of the given categories.
    pub fn categorized_with_all<I, S>(&self, values: I) -> Result<Vec<(u64, T)>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.find(fields::CATEGORIES, &LabelQuery::all(values))
    }

    /// Documents carrying at least one of the given categories.
    pub fn categorized_with_any<I, S>(&self, values: I) -> Result<Vec<(u64, T)>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.find(fields::CATEGORIES, &LabelQuery::any(values))
    }

    fn find(&self, field: &str, query: &LabelQuery) -> Result<Vec<(u64, T)>> {
        let ids = self
            .store
            .find_labeled(self.config.collection(), field, query)?;
        let mut docs = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(payload) = self.store.get(self.config.collection(), id)? {
                docs.push((id, serde_json::from_slice(&payload)?));
            }
        }
        Ok(docs)
    }
}

impl<T: Taggable> Model<'_, T> {
    /// The document's tags as a string, joined with this model's separator.
    pub fn tags_text(&self, doc: &T) -> String {
        doc.tags_text(self.config.tags_separator())
    }

    /// Set the document's tags from a string split on this model's separator.
    pub fn set_tags_text(&self, doc: &mut T, text: &str) {
        doc.set_tags_text(text, self.config.tags_separator());
    }
}

impl<T: Categorizable> Model<'_, T> {
    /// The document's categories as a string, joined with this model's
    /// separator.
    pub fn categories_text(&self, doc: &T) -> String {
        doc.categories_text(self.config.categories_separator())
    }

    /// Set the document's categories from a string split on this model's
    /// separator.
    pub fn set_categories_text(&self, doc: &mut T, text: &str) {
        doc.set_categories_text(text, self.config.categories_separator());
    }
}

impl<T> std::fmt::Debug for Model<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    struct MyModel {
        tags: Vec<String>,
        categories: Vec<String>,
    }

    impl Taggable for MyModel {
        fn tags_array(&self) -> &[String] {
            &self.tags
        }

        fn set_tags_array(&mut self, tags: Vec<String>) {
            self.tags = tags;
        }
    }

    impl Categorizable for MyModel {
        fn categories_array(&self) -> &[String] {
            &self.categories
        }

        fn set_categories_array(&mut self, categories: Vec<String>) {
            self.categories = categories;
        }
    }

    fn test_store() -> (tempfile::TempDir, DocumentStore) {
        let tmp = tempfile::tempdir().unwrap();
        let store = DocumentStore::open(&tmp.path().join("docs.redb")).unwrap();
        (tmp, store)
    }

    fn categorized(model: &Model<MyModel>, text: &str) -> MyModel {
        let mut doc = MyModel::default();
        model.set_categories_text(&mut doc, text);
        doc
    }

    #[test]
    fn save_and_get_round_trip() {
        let (_tmp, store) = test_store();
        let model: Model<MyModel> = Model::new(&store, "my_models");

        let mut doc = MyModel::default();
        model.set_tags_text(&mut doc, "interesting,stuff");
        model.save(1, &doc).unwrap();

        assert_eq!(model.get(1).unwrap().unwrap(), doc);
        assert!(model.get(2).unwrap().is_none());
        assert_eq!(model.count().unwrap(), 1);
    }

    #[test]
    fn config_defaults() {
        let (_tmp, store) = test_store();
        let model: Model<MyModel> = Model::new(&store, "my_models");

        assert_eq!(model.collection(), "my_models");
        assert_eq!(model.tags_separator(), ",");
        assert_eq!(model.categories_separator(), ",");
        assert!(model.config().categories_index_enabled());
    }

    #[test]
    fn index_collection_name_from_model() {
        let (_tmp, store) = test_store();
        let model: Model<MyModel> = Model::new(&store, "my_models");
        assert_eq!(
            model.categories_index_collection(),
            "my_models_categories_index"
        );
    }

    #[test]
    fn tag_queries() {
        let (_tmp, store) = test_store();
        let model: Model<MyModel> = Model::new(&store, "my_models");

        let mut doc = MyModel::default();
        model.set_tags_text(&mut doc, "interesting,stuff,good,bad");
        model.save(1, &doc).unwrap();

        assert_eq!(model.tagged_with("interesting").unwrap().len(), 1);
        assert_eq!(model.tagged_with_all(["interesting", "good"]).unwrap().len(), 1);
        assert!(
            model
                .tagged_with_all(["interesting", "good", "mcdonalds"])
                .unwrap()
                .is_empty()
        );
        assert_eq!(
            model
                .tagged_with_any(["interesting", "mcdonalds"])
                .unwrap()
                .len(),
            1
        );
        assert!(
            model
                .tagged_with_any(["hardees", "wendys", "mcdonalds"])
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn category_queries() {
        let (_tmp, store) = test_store();
        let model: Model<MyModel> = Model::new(&store, "my_models");

        model.save(1, &categorized(&model, "interesting,stuff,good,bad")).unwrap();

        assert_eq!(model.categorized_with("interesting").unwrap().len(), 1);
        assert_eq!(
            model
                .categorized_with_all(["interesting", "good"])
                .unwrap()
                .len(),
            1
        );
        assert!(
            model
                .categorized_with_any(["hardees", "wendys"])
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn save_recomputes_weighted_index() {
        let (_tmp, store) = test_store();
        let model: Model<MyModel> = Model::new(&store, "my_models");

        model.save(1, &categorized(&model, "food,ant,bee")).unwrap();
        model.save(2, &categorized(&model, "juice,food,bee,zip")).unwrap();
        model.save(3, &categorized(&model, "honey,strip,food")).unwrap();

        assert_eq!(
            model.categories().unwrap(),
            vec!["ant", "bee", "food", "honey", "juice", "strip", "zip"]
        );
        assert_eq!(
            model.categories_with_weight().unwrap(),
            vec![
                ("ant".to_string(), 1),
                ("bee".to_string(), 2),
                ("food".to_string(), 3),
                ("honey".to_string(), 1),
                ("juice".to_string(), 1),
                ("strip".to_string(), 1),
                ("zip".to_string(), 1),
            ]
        );
    }

    #[test]
    fn disabled_index_skips_recomputation() {
        let (_tmp, store) = test_store();
        let mut model: Model<MyModel> = Model::new(&store, "my_models");

        model.disable_categories_index();
        model.save(1, &categorized(&model, "sample,categories")).unwrap();
        assert!(model.categories().unwrap().is_empty());

        // Re-enabling catches up on the next save.
        model.enable_categories_index();
        model.save(2, &categorized(&model, "more")).unwrap();
        assert_eq!(
            model.categories().unwrap(),
            vec!["categories", "more", "sample"]
        );
    }

    #[test]
    fn custom_separator_applies_to_text_accessors() {
        let (_tmp, store) = test_store();
        let mut model: Model<MyModel> = Model::new(&store, "my_models");
        model.set_categories_separator(";");

        let mut doc = MyModel::default();
        model.set_categories_text(&mut doc, "some;other;separator");
        assert_eq!(doc.categories_array(), &["some", "other", "separator"]);
        assert_eq!(model.categories_text(&doc), "some;other;separator");
    }

    #[test]
    fn remove_leaves_index_until_next_save() {
        let (_tmp, store) = test_store();
        let model: Model<MyModel> = Model::new(&store, "my_models");

        model.save(1, &categorized(&model, "old")).unwrap();
        model.remove(1).unwrap();
        // Stale until a save triggers the next rebuild.
        assert_eq!(model.categories().unwrap(), vec!["old"]);

        model.save(2, &categorized(&model, "new")).unwrap();
        assert_eq!(model.categories().unwrap(), vec!["new"]);
    }

    #[test]
    fn resaving_updates_index_entries() {
        let (_tmp, store) = test_store();
        let model: Model<MyModel> = Model::new(&store, "my_models");

        model.save(1, &categorized(&model, "food,food")).unwrap();
        assert_eq!(
            model.categories_with_weight().unwrap(),
            vec![("food".to_string(), 2)]
        );

        model.save(1, &categorized(&model, "drink")).unwrap();
        assert_eq!(
            model.categories_with_weight().unwrap(),
            vec![("drink".to_string(), 1)]
        );
    }
}
