//! Fuzzy term matching for the full-text index.
//!
//! FTS5 has no edit-distance operator, so each query token is expanded
//! against the indexed vocabulary: candidates must share the token's first
//! `prefix_length` characters and lie within `max_edits` Levenshtein edits.

/// Lowercased alphanumeric tokens, first occurrence order, no duplicates.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let token = word.to_lowercase();
        if !tokens.contains(&token) {
            tokens.push(token);
        }
    }
    tokens
}

/// The leading characters a candidate term must share with `token`.
pub(crate) fn exact_prefix(token: &str, prefix_length: usize) -> String {
    token.chars().take(prefix_length).collect()
}

/// Whether `a` and `b` are within `max_edits` insertions, deletions or substitutions.
pub(crate) fn within_edits(a: &str, b: &str, max_edits: usize) -> bool {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.len().abs_diff(b.len()) > max_edits {
        return false;
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        let mut row_min = curr[0];
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
            row_min = row_min.min(curr[j + 1]);
        }
        if row_min > max_edits {
            return false;
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()] <= max_edits
}

/// OR together quoted terms into an FTS5 MATCH expression.
pub(crate) fn match_expression(terms: &[String]) -> Option<String> {
    if terms.is_empty() {
        return None;
    }
    Some(
        terms
            .iter()
            .map(|t| format!("\"{}\"", t.replace('"', "\"\"")))
            .collect::<Vec<_>>()
            .join(" OR "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("Clash Royale: currencies, clash!"),
            vec!["clash", "royale", "currencies"]
        );
        assert!(tokenize("  ?! ").is_empty());
    }

    #[test]
    fn test_exact_prefix() {
        assert_eq!(exact_prefix("currency", 3), "cur");
        assert_eq!(exact_prefix("go", 3), "go");
        assert_eq!(exact_prefix("élixir", 2), "él");
    }

    #[test]
    fn test_within_edits() {
        assert!(within_edits("chest", "chest", 0));
        assert!(within_edits("chest", "chests", 1));
        assert!(within_edits("legendery", "legendary", 1));
        assert!(within_edits("skelton", "skeleton", 2));
        assert!(within_edits("gems", "gem", 2));
        assert!(!within_edits("chest", "cheese", 1));
        assert!(!within_edits("card", "cardboard", 2));
    }

    #[test]
    fn test_within_edits_empty() {
        assert!(within_edits("", "ab", 2));
        assert!(!within_edits("", "abc", 2));
    }

    #[test]
    fn test_match_expression() {
        let terms = vec!["gem".to_string(), "gems".to_string()];
        assert_eq!(match_expression(&terms).unwrap(), "\"gem\" OR \"gems\"");
        assert!(match_expression(&[]).is_none());
    }

    #[test]
    fn test_match_expression_escapes_quotes() {
        let terms = vec!["a\"b".to_string()];
        assert_eq!(match_expression(&terms).unwrap(), "\"a\"\"b\"");
    }
}
