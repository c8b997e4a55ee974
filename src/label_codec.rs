//! Conversion between a delimited string and an ordered list of labels.
//!
//! Both the tagging and categorization accessors go through this codec. The
//! separator is not escaped: a label containing the separator will split on
//! the next decode, so callers must pick a separator absent from label
//! content.

/// Default label separator for both tags and categories.
pub const DEFAULT_SEPARATOR: &str = ",";

/// Join labels into a single delimited string, preserving order.
pub fn encode(labels: &[String], separator: &str) -> String {
    labels.join(separator)
}

/// Split `text` on `separator` into trimmed, non-empty labels.
///
/// Surrounding whitespace is stripped from every token and tokens that are
/// empty after trimming are dropped. Relative order is preserved and
/// duplicates are kept. `None` decodes to an empty list.
pub fn decode(text: Option<&str>, separator: &str) -> Vec<String> {
    let Some(text) = text else {
        return Vec::new();
    };

    text.split(separator)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
