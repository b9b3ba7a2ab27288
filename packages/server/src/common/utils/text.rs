/// Normalize free-text location input into a cache key.
///
/// Normalization rules:
/// - Trim leading/trailing whitespace
/// - Collapse runs of whitespace into single spaces
/// - Convert to lowercase
///
/// Punctuation is kept: "London, KY" and "London KY" are different queries
/// to a geocoder.
pub fn normalize_query(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
