//! Text normalization shared by titles and quote bodies

/// Trim and collapse every whitespace run to a single space
pub fn normalize_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Case-folded form stored in the `*_key` columns backing the unique indexes
///
/// SQLite's `lower()` only folds ASCII, so the key is computed here.
pub fn match_key(text: &str) -> String {
    normalize_spaces(text).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_runs() {
        assert_eq!(normalize_spaces("  Hello \t\n  world  "), "Hello world");
        assert_eq!(normalize_spaces(""), "");
        assert_eq!(normalize_spaces("   "), "");
    }

    #[test]
    fn test_match_key_is_case_insensitive() {
        assert_eq!(match_key("Fight  Club"), match_key("fight club"));
        assert_eq!(match_key("ПРИВЕТ мир"), "привет мир");
    }
}
