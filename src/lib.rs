//! doctag - tagging and categorization for documents in an embedded store.
//!
//! Document types opt into the [`Taggable`] and [`Categorizable`] capabilities
//! at definition time; a [`Model`] handle binds a document type to its
//! collection, separators, and category index toggle. Tags and categories are
//! ordered label arrays with delimited-string accessors and multi-value
//! queries; categories additionally feed a derived, fully recomputed
//! frequency index for "category cloud" style reporting.
//!
//! # Quick start
//!
//! ```no_run
//! use std::path::Path;
//!
//! use doctag::{Categorizable, DocumentStore, Model, Taggable};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Default, Serialize, Deserialize)]
//! struct Article {
//!     title: String,
//!     tags: Vec<String>,
//!     categories: Vec<String>,
//! }
//!
//! impl Taggable for Article {
//!     fn tags_array(&self) -> &[String] { &self.tags }
//!     fn set_tags_array(&mut self, tags: Vec<String>) { self.tags = tags; }
//! }
//!
//! impl Categorizable for Article {
//!     fn categories_array(&self) -> &[String] { &self.categories }
//!     fn set_categories_array(&mut self, categories: Vec<String>) {
//!         self.categories = categories;
//!     }
//! }
//!
//! let store = DocumentStore::open(Path::new("articles.redb")).unwrap();
//! let model: Model<Article> = Model::new(&store, "articles");
//!
//! let mut article = Article::default();
//! model.set_categories_text(&mut article, "food,ant,bee");
//! model.save(1, &article).unwrap();
//!
//! for (value, weight) in model.categories_with_weight().unwrap() {
//!     println!("{value}: {weight}");
//! }
//! ```

pub mod category_index;
pub mod document;
pub mod error;
pub mod index_name;
pub mod label_codec;
pub mod label_query;
pub mod model;
pub mod store;

pub use document::{Categorizable, Taggable};
pub use error::{Error, Result};
pub use index_name::index_collection_name;
pub use label_query::LabelQuery;
pub use model::{Model, ModelConfig};
pub use store::DocumentStore;
