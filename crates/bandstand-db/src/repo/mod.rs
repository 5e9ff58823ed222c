//! Repository layer: all persistence access goes through these modules.
//!
//! Read operations take any [`ConnectionTrait`] handle; mutating
//! operations take a [`TransactionTrait`] handle and run inside a
//! single transaction scope (rollback on any failure, nothing partial
//! persists).

pub mod artists;
pub mod shows;
pub mod venues;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// Search outcome: hit count plus one summary row per hit.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults<T> {
    pub count: usize,
    pub data: Vec<T>,
}

/// A show is upcoming iff it starts strictly after `now`.
pub fn is_upcoming(start_time: DateTime<FixedOffset>, now: DateTime<FixedOffset>) -> bool {
    start_time > now
}

/// Escape SQL LIKE wildcards in a user-supplied term and wrap it for
/// substring matching. An empty term yields `%%`, which matches all rows.
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term.trim().replace('%', "\\%").replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_like_pattern_plain() {
        assert_eq!(like_pattern("Hop"), "%Hop%");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("100%_fun"), "%100\\%\\_fun%");
    }

    #[test]
    fn test_like_pattern_empty_matches_all() {
        assert_eq!(like_pattern(""), "%%");
        assert_eq!(like_pattern("   "), "%%");
    }

    #[test]
    fn test_is_upcoming_strict() {
        let now = chrono::FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
            .unwrap();
        let later = now + chrono::Duration::seconds(1);
        let earlier = now - chrono::Duration::seconds(1);
        assert!(is_upcoming(later, now));
        assert!(!is_upcoming(earlier, now));
        // Boundary: a show starting exactly now is not upcoming
        assert!(!is_upcoming(now, now));
    }
}
