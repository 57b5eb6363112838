//! Commit-message similarity search

use crate::commit::Commit;
use skein_core::lcs_len;
use std::collections::{HashMap, HashSet};

/// Scores below this are dropped from search results
pub const MATCH_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SimilarityMetric {
    /// `1 - distance / max_len`
    Levenshtein,
    /// Cosine of the character-bigram count vectors
    Cosine,
    /// `|shared bigrams| / |all bigrams|`
    Jaccard,
    /// `2 * lcs_len / (len_a + len_b)`
    #[default]
    Lcs,
}

/// Similarity in `[0, 1]` over chars; two empty strings score 1
pub fn similarity(a: &str, b: &str, metric: SimilarityMetric) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }

    match metric {
        SimilarityMetric::Levenshtein => {
            let max_len = a.len().max(b.len()) as f64;
            1.0 - levenshtein(&a, &b) as f64 / max_len
        }
        SimilarityMetric::Cosine => cosine(&bigrams(&a), &bigrams(&b)),
        SimilarityMetric::Jaccard => jaccard(&bigrams(&a), &bigrams(&b)),
        SimilarityMetric::Lcs => 2.0 * lcs_len(&a, &b) as f64 / (a.len() + b.len()) as f64,
    }
}

/// Character bigram counts; a single char is its own shingle
fn bigrams(chars: &[char]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    if chars.len() == 1 {
        counts.insert(chars[0].to_string(), 1);
        return counts;
    }
    for pair in chars.windows(2) {
        *counts.entry(pair.iter().collect::<String>()).or_insert(0) += 1;
    }
    counts
}

fn cosine(a: &HashMap<String, usize>, b: &HashMap<String, usize>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let dot: usize = a
        .iter()
        .filter_map(|(gram, n)| b.get(gram).map(|m| n * m))
        .sum();
    let norm = |v: &HashMap<String, usize>| (v.values().map(|n| (n * n) as f64).sum::<f64>()).sqrt();
    dot as f64 / (norm(a) * norm(b))
}

fn jaccard(a: &HashMap<String, usize>, b: &HashMap<String, usize>) -> f64 {
    let a: HashSet<&String> = a.keys().collect();
    let b: HashSet<&String> = b.keys().collect();
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

/// Edit distance with a two-row table
fn levenshtein(a: &[char], b: &[char]) -> usize {
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Commits whose message scores at least [`MATCH_THRESHOLD`] against
/// `query`, best first (ties keep input order)
pub fn search_commits(commits: Vec<Commit>, query: &str, metric: SimilarityMetric) -> Vec<(f64, Commit)> {
    let mut scored: Vec<(f64, Commit)> = commits
        .into_iter()
        .map(|c| (similarity(&c.message, query, metric), c))
        .filter(|(score, _)| *score >= MATCH_THRESHOLD)
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use skein_core::hash_bytes;

    fn commit(message: &str) -> Commit {
        Commit {
            user: "u".to_string(),
            hash: hash_bytes(message.as_bytes()),
            objects: vec![],
            parents: vec![],
            timestamp: 0,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_levenshtein_distance() {
        let chars = |s: &str| s.chars().collect::<Vec<_>>();
        assert_eq!(levenshtein(&chars("kitten"), &chars("sitting")), 3);
        assert_eq!(levenshtein(&chars(""), &chars("abc")), 3);
        assert_eq!(levenshtein(&chars("same"), &chars("same")), 0);
    }

    #[test]
    fn test_similarity_bounds() {
        for metric in [
            SimilarityMetric::Levenshtein,
            SimilarityMetric::Cosine,
            SimilarityMetric::Jaccard,
            SimilarityMetric::Lcs,
        ] {
            assert_eq!(similarity("merge", "merge", metric), 1.0);
            assert_eq!(similarity("abc", "xyz", metric), 0.0);
            assert_eq!(similarity("", "", metric), 1.0);
        }
        assert!((similarity("kitten", "sitting", SimilarityMetric::Levenshtein) - (1.0 - 3.0 / 7.0)).abs() < 1e-9);
        assert!((similarity("abcd", "abxd", SimilarityMetric::Lcs) - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_over_bigrams() {
        // "abab": ab x2, ba x1; "ab": ab x1 -> 2 / (sqrt(5) * 1)
        let score = similarity("abab", "ab", SimilarityMetric::Cosine);
        assert!((score - 2.0 / 5f64.sqrt()).abs() < 1e-9);
        assert_eq!(similarity("a", "a", SimilarityMetric::Cosine), 1.0);
        assert_eq!(similarity("abc", "", SimilarityMetric::Cosine), 0.0);
    }

    #[test]
    fn test_jaccard_over_bigrams() {
        // {ab, bc} vs {ab, bd}: 1 shared of 3
        let score = similarity("abc", "abd", SimilarityMetric::Jaccard);
        assert!((score - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(similarity("abab", "ba", SimilarityMetric::Jaccard), 0.5);
    }

    #[test]
    fn test_search_with_set_metrics() {
        for metric in [SimilarityMetric::Cosine, SimilarityMetric::Jaccard] {
            let results = search_commits(
                vec![commit("fix parser bug"), commit("update docs")],
                "fix parser bug",
                metric,
            );
            let messages: Vec<&str> = results.iter().map(|(_, c)| c.message.as_str()).collect();
            assert_eq!(messages, vec!["fix parser bug"], "{:?}", metric);
        }
    }

    #[test]
    fn test_search_filters_and_orders() {
        let commits = vec![
            commit("fix parser"),
            commit("completely unrelated"),
            commit("fix the parser"),
            commit("fix parser"),
        ];

        let results = search_commits(commits, "fix parser", SimilarityMetric::Lcs);
        let messages: Vec<&str> = results.iter().map(|(_, c)| c.message.as_str()).collect();

        assert_eq!(messages, vec!["fix parser", "fix parser", "fix the parser"]);
        assert!(results.iter().all(|(score, _)| *score >= MATCH_THRESHOLD));
    }

    #[test]
    fn test_search_empty_when_nothing_close() {
        let results = search_commits(vec![commit("aaaa")], "zzzz", SimilarityMetric::Levenshtein);
        assert!(results.is_empty());
    }
}
