//! Fuzzy term matching.
//!
//! Scores are Ratcliff/Obershelp ratios: repeatedly take the longest common
//! substring of the two strings, recurse on the fragments left and right of
//! it, and divide twice the total matched length by the combined length.
//! This rewards long shared blocks rather than penalizing edits, which suits
//! near-miss spellings of multi-word medical terms.

use std::collections::HashMap;

/// Keys scoring at or below this are not considered matches.
pub const SIMILARITY_THRESHOLD: f64 = 0.6;

/// Similarity ratio in [0, 1] between two strings, by character.
/// Two empty strings are identical, hence 1.0.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    (2 * matched_len(&a, &b)) as f64 / total as f64
}

/// Ranks `keys` against a lower-cased, trimmed query. Only keys strictly
/// above [`SIMILARITY_THRESHOLD`] qualify; descending by score, ties keeping
/// the iteration order of `keys`, truncated to `limit`.
pub fn rank<'a, I>(query: &str, keys: I, limit: usize) -> Vec<(String, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let query = query.trim().to_lowercase();
    let mut matches: Vec<(String, f64)> = keys
        .into_iter()
        .map(|key| (key.to_string(), ratio(&query, key)))
        .filter(|(_, score)| *score > SIMILARITY_THRESHOLD)
        .collect();
    matches.sort_by(|x, y| y.1.partial_cmp(&x.1).unwrap_or(std::cmp::Ordering::Equal));
    matches.truncate(limit);
    matches
}

/// Total length of all matched blocks between `a` and `b`.
fn matched_len(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(a, b, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        total += size;
        pending.push((alo, i, blo, j));
        pending.push((i + size, ahi, j + size, bhi));
    }
    total
}

/// Longest block of equal characters within `a[alo..ahi]` and `b[blo..bhi]`,
/// returned as (start in a, start in b, length). Ties go to the
/// earliest-starting block.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let mut best = (alo, blo, 0);
    // run lengths of common suffixes ending at each j, for the previous i
    let mut run_lengths: HashMap<usize, usize> = HashMap::new();
    for i in alo..ahi {
        let mut next_runs = HashMap::new();
        for j in blo..bhi {
            if b[j] == a[i] {
                let len = j
                    .checked_sub(1)
                    .and_then(|prev| run_lengths.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next_runs.insert(j, len);
                if len > best.2 {
                    best = (i + 1 - len, j + 1 - len, len);
                }
            }
        }
        run_lengths = next_runs;
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_score_one() {
        assert_eq!(ratio("headache", "headache"), 1.0);
        assert_eq!(ratio("", ""), 1.0);
    }

    #[test]
    fn disjoint_strings_score_zero() {
        assert_eq!(ratio("abc", "xyz"), 0.0);
    }

    #[test]
    fn ratio_counts_all_matched_blocks() {
        // "hadache" vs "headache": blocks "adache" + "h" -> 2*7/15
        let score = ratio("hadache", "headache");
        assert!((score - 14.0 / 15.0).abs() < 1e-9);
    }

    #[test]
    fn rank_filters_below_threshold_and_orders_descending() {
        let keys = ["headache", "heartache", "stomach"];
        let ranked = rank("hadache", keys, 5);

        assert_eq!(ranked[0].0, "headache");
        assert!(ranked.iter().all(|(_, s)| *s > SIMILARITY_THRESHOLD));
        for pair in ranked.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
    }

    #[test]
    fn rank_returns_empty_for_dissimilar_query() {
        let keys = ["headache", "heartache", "stomach"];
        assert!(rank("xyz123", keys, 5).is_empty());
    }

    #[test]
    fn rank_lowercases_and_trims_the_query() {
        let keys = ["headache"];
        let ranked = rank("  HEADACHE ", keys, 5);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].1, 1.0);
    }

    #[test]
    fn rank_respects_the_limit() {
        let keys = ["term a", "term b", "term c", "term d", "term e", "term f"];
        let ranked = rank("term a", keys, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].0, "term a");
    }
}
