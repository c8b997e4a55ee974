//! Multi-value query combinators over a label array attribute.

/// A query against an array-valued label attribute.
///
/// Constructors accept any iterator of string-likes, so callers can pass
/// slices, arrays, or `Vec`s; nested collections should be flattened before
/// construction. A query with zero values deterministically matches nothing,
/// never everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelQuery {
    /// Matches documents whose labels intersect the requested values.
    Any(Vec<String>),
    /// Matches documents whose labels contain every requested value, in any
    /// order, with extra labels allowed.
    All(Vec<String>),
}

impl LabelQuery {
    /// "Contains at least one of" over the given values.
    pub fn any<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Any(values.into_iter().map(Into::into).collect())
    }

    /// "Contains all of" over the given values.
    pub fn all<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::All(values.into_iter().map(Into::into).collect())
    }

    /// Single-value convenience form of [`LabelQuery::any`].
    pub fn one(value: impl Into<String>) -> Self {
        Self::Any(vec![value.into()])
    }

    /// The requested values, regardless of combinator.
    pub fn values(&self) -> &[String] {
        match self {
            Self::Any(values) | Self::All(values) => values,
        }
    }

    /// Evaluate the query against a document's label array.
    pub fn matches(&self, labels: &[String]) -> bool {
        match self {
            Self::Any(values) => !values.is_empty() && values.iter().any(|v| labels.contains(v)),
            Self::All(values) => !values.is_empty() && values.iter().all(|v| labels.contains(v)),
        }
    }
}
