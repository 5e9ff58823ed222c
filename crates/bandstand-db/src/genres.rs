//! Genre tag normalization.
//!
//! Genre input arrives in several historical shapes: a brace-wrapped
//! list literal (`{Rock,Jazz}`), plain comma-separated text
//! (`Rock, Jazz`), or an already-split list. Everything is normalized
//! to an ordered list of trimmed, non-empty tokens; storage is always a
//! JSON string array.

use serde_json::{json, Value};

/// Parse free-form genre text into an ordered list of genre tokens.
///
/// Accepts brace-wrapped list literals and raw comma-separated text.
/// Tokens are trimmed, stripped of stray quotes, and empty entries are
/// dropped. Input order is preserved.
pub fn parse(input: &str) -> Vec<String> {
    let trimmed = input.trim();
    let inner = trimmed
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .unwrap_or(trimmed);

    inner
        .split(',')
        .map(|token| token.trim().trim_matches('"').trim())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Decode a stored genre column into a genre list.
///
/// The column is a JSON string array, but legacy rows may hold a single
/// JSON string in one of the text shapes `parse` understands.
pub fn from_stored(stored: Option<&Value>) -> Vec<String> {
    match stored {
        None => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(text)) => parse(text),
        Some(_) => Vec::new(),
    }
}

/// Encode a genre list for storage.
pub fn to_stored(genres: &[String]) -> Value {
    json!(genres)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_comma_separated() {
        assert_eq!(parse("Rock, Jazz, Folk"), vec!["Rock", "Jazz", "Folk"]);
    }

    #[test]
    fn test_parse_brace_literal() {
        assert_eq!(parse("{Rock,Jazz}"), vec!["Rock", "Jazz"]);
    }

    #[test]
    fn test_parse_brace_literal_with_quotes() {
        assert_eq!(
            parse(r#"{"Hip-Hop","R&B"}"#),
            vec!["Hip-Hop", "R&B"]
        );
    }

    #[test]
    fn test_parse_preserves_order() {
        assert_eq!(parse("Jazz,Classical,Rock"), vec!["Jazz", "Classical", "Rock"]);
    }

    #[test]
    fn test_parse_drops_empty_tokens() {
        assert_eq!(parse("Rock,,  ,Jazz,"), vec!["Rock", "Jazz"]);
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse("").is_empty());
        assert!(parse("{}").is_empty());
        assert!(parse("   ").is_empty());
    }

    #[test]
    fn test_parse_single_token() {
        assert_eq!(parse("Alternative"), vec!["Alternative"]);
    }

    #[test]
    fn test_from_stored_array() {
        let value = json!(["Rock", " Jazz ", ""]);
        assert_eq!(from_stored(Some(&value)), vec!["Rock", "Jazz"]);
    }

    #[test]
    fn test_from_stored_legacy_string() {
        let value = json!("{Rock,Jazz}");
        assert_eq!(from_stored(Some(&value)), vec!["Rock", "Jazz"]);
    }

    #[test]
    fn test_from_stored_none() {
        assert!(from_stored(None).is_empty());
    }

    #[test]
    fn test_from_stored_non_string_items_skipped() {
        let value = json!(["Rock", 7, null]);
        assert_eq!(from_stored(Some(&value)), vec!["Rock"]);
    }

    #[test]
    fn test_stored_round_trip() {
        let genres = vec!["Rock".to_string(), "Jazz".to_string()];
        let stored = to_stored(&genres);
        assert_eq!(from_stored(Some(&stored)), genres);
    }
}
