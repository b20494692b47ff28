//! Character bigram similarity (Dice coefficient)

/// Overlapping two-character windows of `text`, in order and with repetition
pub fn bigrams(text: &str) -> Vec<(char, char)> {
    let chars: Vec<char> = text.chars().collect();
    chars.windows(2).map(|w| (w[0], w[1])).collect()
}

/// Dice coefficient over the bigrams of `a` and `b`.
///
/// Each bigram of `a` counts once for every occurrence in `a` if it appears
/// anywhere in `b`; this is a membership test, not a multiset intersection.
/// Returns 0.0 when neither string has a bigram.
pub fn dice_coefficient(a: &str, b: &str) -> f64 {
    let first = bigrams(a);
    let second = bigrams(b);

    let denominator = first.len() + second.len();
    if denominator == 0 {
        return 0.0;
    }

    let matched = first.iter().filter(|bigram| second.contains(bigram)).count();
    (2.0 * matched as f64) / denominator as f64
}

/// Case-insensitive Dice coefficient
pub fn similarity(a: &str, b: &str) -> f64 {
    dice_coefficient(&a.to_lowercase(), &b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_bigrams() {
        assert_eq!(bigrams("abc"), vec![('a', 'b'), ('b', 'c')]);
        assert_eq!(bigrams("aaa"), vec![('a', 'a'), ('a', 'a')]);
        assert!(bigrams("a").is_empty());
        assert!(bigrams("").is_empty());
    }

    #[test]
    fn test_identical_and_empty() {
        assert_eq!(similarity("Apply the patch", "Apply the patch"), 1.0);
        assert_eq!(similarity("", "anything"), 0.0);
        assert_eq!(similarity("", ""), 0.0);
        assert_eq!(similarity("a", "a"), 0.0);
    }

    #[test]
    fn test_case_folding() {
        assert_eq!(similarity("NIGHT", "night"), 1.0);
        assert!(dice_coefficient("NIGHT", "night") < 1.0);
    }

    #[test]
    fn test_membership_is_asymmetric() {
        // "aaa" -> [aa, aa], "aab" -> [aa, ab]; both "aa" of the first count
        assert_eq!(dice_coefficient("aaa", "aab"), 2.0 * 2.0 / 4.0);
        // the other way round only "aa" is found
        assert_eq!(dice_coefficient("aab", "aaa"), 2.0 * 1.0 / 4.0);
    }

    #[test]
    fn test_score_can_exceed_one() {
        // [aa, aa, aa] against [aa]
        assert_eq!(dice_coefficient("aaaa", "aa"), 1.5);
    }

    #[test]
    fn test_partial_overlap() {
        // night: ni ig gh ht / nacht: na ac ch ht
        assert_eq!(dice_coefficient("night", "nacht"), 0.25);
    }

    proptest! {
        #[test]
        fn prop_self_similarity_is_one(s in "[a-z ]{2,40}") {
            prop_assert_eq!(similarity(&s, &s), 1.0);
        }

        // repeated bigrams in the first string can push the score above 1.0
        #[test]
        fn prop_similarity_is_finite(a in ".{0,30}", b in ".{0,30}") {
            let score = similarity(&a, &b);
            prop_assert!(score.is_finite() && score >= 0.0);
        }
    }
}
