//! Fuzzy text similarity between statement notes and ledger notes.
//!
//! Scores are on a 0-100 scale. The full-string ratio rewards near-equal
//! texts; the partial ratio catches a statement note embedded in a longer
//! ledger note and is slightly discounted so exact matches still win.

use rapidfuzz::fuzz;

/// Weight applied to the best-substring score.
const PARTIAL_WEIGHT: f64 = 0.9;

fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Similarity between two notes texts, 0.0 to 100.0.
pub fn score(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let full = fuzz::ratio(a.chars(), b.chars());
    let partial = fuzz::partial_ratio(a.chars(), b.chars());
    full.max(partial * PARTIAL_WEIGHT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_text_scores_full() {
        assert_eq!(score("Paid rent", "Paid rent"), 100.0);
    }

    #[test]
    fn case_and_spacing_are_ignored() {
        assert_eq!(score("PAID  RENT", "paid rent"), 100.0);
    }

    #[test]
    fn substring_scores_below_exact() {
        let s = score("Paid", "Paid rent");
        assert!(s > 80.0 && s < 100.0, "got {s}");
    }

    #[test]
    fn unrelated_text_scores_low() {
        assert!(score("Groceries", "Salary August") < 50.0);
    }

    #[test]
    fn empty_text_scores_zero() {
        assert_eq!(score("", "anything"), 0.0);
        assert_eq!(score("anything", "  "), 0.0);
    }
}
