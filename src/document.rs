//! Capability traits a document type implements to opt into tagging and
//! categorization.
//!
//! Composition is static: a type implements [`Taggable`], [`Categorizable`],
//! or both at definition time. The required methods expose the raw storage
//! array; the provided `_text` methods convert through the label codec with
//! an explicit separator (the [`Model`](crate::Model) handle wraps them with
//! its configured separator).

use crate::label_codec;

/// Free-text tagging over an ordered array of labels.
pub trait Taggable {
    fn tags_array(&self) -> &[String];

    fn set_tags_array(&mut self, tags: Vec<String>);

    /// The tags joined into a single delimited string.
    fn tags_text(&self, separator: &str) -> String {
        label_codec::encode(self.tags_array(), separator)
    }

    /// Replace the tags from a delimited string, trimming each token and
    /// dropping empty ones.
    fn set_tags_text(&mut self, text: &str, separator: &str) {
        self.set_tags_array(label_codec::decode(Some(text), separator));
    }
}

/// Categorization over an ordered array of labels.
///
/// Unlike tags, category values additionally feed the per-collection
/// weighted index (see [`category_index`](crate::category_index)).
pub trait Categorizable {
    fn categories_array(&self) -> &[String];

    fn set_categories_array(&mut self, categories: Vec<String>);

    /// The categories joined into a single delimited string.
    fn categories_text(&self, separator: &str) -> String {
        label_codec::encode(self.categories_array(), separator)
    }

    /// Replace the categories from a delimited string, trimming each token
    /// and dropping empty ones.
    fn set_categories_text(&mut self, text: &str, separator: &str) {
        self.set_categories_array(label_codec::decode(Some(text), separator));
    }
}
