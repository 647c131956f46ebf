use serde::{Deserialize, Deserializer};
use serde_json::Value;
use unicode_normalization::UnicodeNormalization;

/// NFKC fold, trim, lowercase. Shared by every token normalization path so
/// candidate and posting fields compare symmetrically.
pub fn nfkc_lower_trim(input: &str) -> String {
    input.nfkc().collect::<String>().trim().to_lowercase()
}

/// Clean a flat list of strings: trim + lowercase each entry, drop empties,
/// dedupe while preserving first-occurrence order.
pub fn normalize_strings(values: &[String]) -> Vec<String> {
    dedupe_cleaned(values.iter().map(|s| nfkc_lower_trim(s)))
}

/// Clean an arbitrarily shaped JSON value: a string, an array, or nested
/// arrays of strings. Non-string leaves are discarded; malformed input
/// degrades to an empty list rather than an error.
pub fn normalize_values(value: &Value) -> Vec<String> {
    let mut flat = Vec::new();
    flatten_into(value, &mut flat);
    dedupe_cleaned(flat.into_iter())
}

fn flatten_into(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.push(nfkc_lower_trim(s)),
        Value::Array(items) => {
            for item in items {
                flatten_into(item, out);
            }
        }
        _ => {}
    }
}

fn dedupe_cleaned(values: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for value in values {
        if value.is_empty() {
            continue;
        }
        if seen.insert(value.clone()) {
            out.push(value);
        }
    }
    out
}

/// Serde adapter so list fields on [`crate::Candidate`] / [`crate::Posting`]
/// accept nested arrays straight from the wire.
pub fn flattened_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(normalize_values(&value))
}
