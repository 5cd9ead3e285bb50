//! Substring search helpers shared by the directories

/// Results returned by a search when the caller gives no limit.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Case-insensitive substring match.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Keep the first `limit` rows for which any of `fields` contains `query`.
pub fn filter_matching<T, F>(rows: Vec<T>, query: &str, limit: usize, fields: F) -> Vec<T>
where
    F: Fn(&T) -> Vec<&str>,
{
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    rows.into_iter()
        .filter(|row| fields(row).into_iter().any(|f| contains_ignore_case(f, query)))
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_ignores_case() {
        assert!(contains_ignore_case("Maria Silva", "silva"));
        assert!(contains_ignore_case("maria@salao.com", "SALAO"));
        assert!(!contains_ignore_case("Ana", "maria"));
    }

    #[test]
    fn empty_query_matches_nothing() {
        let rows = vec!["a", "b"];
        assert!(filter_matching(rows, "  ", 10, |r| vec![*r]).is_empty());
    }

    #[test]
    fn limit_caps_results() {
        let rows = vec!["ana", "anabela", "mariana", "julia"];
        let found = filter_matching(rows, "ana", 2, |r| vec![*r]);
        assert_eq!(found, vec!["ana", "anabela"]);
    }
}
