//! Case folding for text search.

/// Unicode lowercase form stored next to searchable text and applied to
/// queries, so matching is case-insensitive beyond ASCII.
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}
