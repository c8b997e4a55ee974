/// Derive the name of the derived category index collection for a model.
///
/// Deterministic and stable: the index for a collection always lives under
/// `"{collection}_categories_index"`. No collision handling is done; model
/// types must not share a base collection name.
pub fn index_collection_name(collection: &str) -> String {
    format!("{collection}_categories_index")
}
