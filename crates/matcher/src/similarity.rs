//! Character-bigram Dice similarity.

use std::collections::HashMap;

use canonical::normalize_name;

/// Multiset Dice coefficient over character bigrams of the normalized names.
///
/// `2 * |A ∩ B| / (|A| + |B|)` where `A` and `B` are bigram multisets taken
/// over the normalized string, inner spaces included. Returns `0.0` when
/// either side normalizes to fewer than two characters.
pub fn bigram_similarity(a: &str, b: &str) -> f64 {
    let a = normalize_name(a);
    let b = normalize_name(b);
    let a_grams = bigrams(&a);
    let b_grams = bigrams(&b);
    let total: usize = a_grams.values().sum::<usize>() + b_grams.values().sum::<usize>();
    if a_grams.is_empty() || b_grams.is_empty() {
        return 0.0;
    }

    let shared: usize = a_grams
        .iter()
        .map(|(gram, count)| (*count).min(b_grams.get(gram).copied().unwrap_or(0)))
        .sum();
    (2 * shared) as f64 / total as f64
}

fn bigrams(text: &str) -> HashMap<(char, char), usize> {
    let chars: Vec<char> = text.chars().collect();
    let mut counts = HashMap::new();
    for pair in chars.windows(2) {
        *counts.entry((pair[0], pair[1])).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_names_score_one() {
        assert_eq!(bigram_similarity("RAMOS OCHOA", "Ramos Ochoa"), 1.0);
        assert_eq!(bigram_similarity("Peña", "PENA"), 1.0);
    }

    #[test]
    fn short_or_empty_names_score_zero() {
        assert_eq!(bigram_similarity("", "ramos"), 0.0);
        assert_eq!(bigram_similarity("a", "a"), 0.0);
        assert_eq!(bigram_similarity("  ", "  "), 0.0);
    }

    #[test]
    fn multiset_counts_repeated_bigrams() {
        // "aaa" -> {aa:2}, "aa" -> {aa:1}: 2*1 / (2+1)
        let score = bigram_similarity("aaa", "aa");
        assert!((score - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn symmetric_and_bounded() {
        let pairs = [("gomez", "gomes"), ("luz deisy", "luz daisy"), ("ana", "maria")];
        for (a, b) in pairs {
            let ab = bigram_similarity(a, b);
            let ba = bigram_similarity(b, a);
            assert_eq!(ab, ba);
            assert!((0.0..=1.0).contains(&ab));
        }
    }

    #[test]
    fn known_value() {
        // night/nacht share only "ht": 2*1 / (4+4)
        assert!((bigram_similarity("night", "nacht") - 0.25).abs() < 1e-12);
    }
}
