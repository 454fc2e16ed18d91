// src/transform/columns.rs
use unicode_normalization::UnicodeNormalization;

/// Canonicalize one header: NFKD-decompose, keep only ASCII characters (which
/// drops the decomposed combining marks), then lowercase. "COMBUSTÍVEL"
/// becomes "combustivel".
pub fn normalize_column(header: &str) -> String {
    header
        .nfkd()
        .filter(char::is_ascii)
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Canonicalize a whole header row. Length-preserving.
pub fn normalize_columns(headers: &[String]) -> Vec<String> {
    headers.iter().map(|h| normalize_column(h)).collect()
}
