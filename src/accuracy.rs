//! Alignment-based transcription accuracy metrics.
//!
//! Scores a hypothesis transcript against a reference by computing a
//! minimum-edit-operation alignment between the two token sequences, then
//! deriving the usual rates from the operation counts:
//!
//! - WER, word error rate: `(S + D + I) / N` over word tokens, where `N` is
//!   the reference length
//! - MER, match error rate: `(S + D + I) / (S + D + I + M)`
//! - CER, character error rate: the WER formula over character tokens
//!
//! The scalar edit distance alone is not enough for MER, so [`align`]
//! backtracks through the full dynamic-programming table to recover how many
//! substitutions, deletions, insertions, and matches the optimal alignment
//! contains. Ties between equal-cost paths are broken in a fixed order
//! (match, then substitution, then deletion, then insertion), so repeated
//! runs on the same input always produce the same breakdown.

use serde::Serialize;
use thiserror::Error;

use crate::text::{self, NormalizeOptions};

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Operation counts of a minimum-cost alignment.
///
/// Produced once per (reference, hypothesis) pair and immutable afterwards.
/// The counts always satisfy `S + D + M == reference length` and
/// `S + I + M == hypothesis length`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Measures {
    pub substitutions: usize,
    pub deletions: usize,
    pub insertions: usize,
    pub matches: usize,
}

impl Measures {
    /// Length of the reference sequence the alignment consumed.
    pub fn reference_len(&self) -> usize {
        self.substitutions + self.deletions + self.matches
    }

    /// Length of the hypothesis sequence the alignment consumed.
    pub fn hypothesis_len(&self) -> usize {
        self.substitutions + self.insertions + self.matches
    }

    /// Total edit operations, `S + D + I`. Symmetric in the two inputs.
    pub fn total_edits(&self) -> usize {
        self.substitutions + self.deletions + self.insertions
    }

    /// Edit operations normalized by reference length: WER over word tokens,
    /// CER over character tokens.
    ///
    /// The formula divides by the reference length, which is undefined for
    /// an empty reference. Boundary policy: with an empty reference the rate
    /// is the raw insertion count (every hypothesis token is an insertion),
    /// and 0.0 when both sides are empty.
    pub fn error_rate(&self) -> f64 {
        let reference_len = self.reference_len();
        if reference_len == 0 {
            return self.insertions as f64;
        }
        self.total_edits() as f64 / reference_len as f64
    }

    /// Edit operations normalized by all aligned operations including
    /// matches. Stays within [0, 1] even when the hypothesis is longer than
    /// the reference; 0.0 when both sides are empty.
    pub fn match_error_rate(&self) -> f64 {
        let total = self.total_edits() + self.matches;
        if total == 0 {
            return 0.0;
        }
        self.total_edits() as f64 / total as f64
    }
}

/// Align a hypothesis token sequence against a reference and count the
/// operations of a minimum-cost edit script.
///
/// Standard Levenshtein dynamic programming over the two sequences:
/// `dp[i][j]` is the minimum number of operations turning the first `i`
/// reference tokens into the first `j` hypothesis tokens. The whole table is
/// kept so the backtracking pass can recover the S/D/I/M breakdown; at each
/// step it prefers, in order, match, substitution, deletion, insertion.
///
/// Generic over the token type: words for WER/MER, chars for CER.
///
/// # Errors
///
/// `ScoreError::InvalidInput` when the table for the two sequence lengths
/// would overflow addressable memory. Empty sequences are not errors.
pub fn align<T: PartialEq>(reference: &[T], hypothesis: &[T]) -> Result<Measures, ScoreError> {
    let n = reference.len();
    let m = hypothesis.len();
    let width = m + 1;
    let cells = (n + 1).checked_mul(width).ok_or_else(|| {
        ScoreError::InvalidInput(format!(
            "alignment table for {n} x {m} tokens overflows addressable memory"
        ))
    })?;

    // Row-major (n+1) x (m+1) cost table.
    let mut dp = vec![0usize; cells];
    for j in 0..=m {
        dp[j] = j;
    }
    for i in 1..=n {
        dp[i * width] = i;
        for j in 1..=m {
            let idx = i * width + j;
            if reference[i - 1] == hypothesis[j - 1] {
                dp[idx] = dp[idx - width - 1];
            } else {
                let substitute = dp[idx - width - 1];
                let delete = dp[idx - width];
                let insert = dp[idx - 1];
                dp[idx] = substitute.min(delete).min(insert) + 1;
            }
        }
    }

    // Walk back from dp[n][m] to dp[0][0], attributing one operation per
    // step. The fixed preference order keeps the breakdown deterministic
    // when several minimum-cost paths exist.
    let mut measures = Measures::default();
    let (mut i, mut j) = (n, m);
    while i > 0 || j > 0 {
        let idx = i * width + j;
        if i > 0
            && j > 0
            && reference[i - 1] == hypothesis[j - 1]
            && dp[idx] == dp[idx - width - 1]
        {
            measures.matches += 1;
            i -= 1;
            j -= 1;
        } else if i > 0 && j > 0 && dp[idx] == dp[idx - width - 1] + 1 {
            measures.substitutions += 1;
            i -= 1;
            j -= 1;
        } else if i > 0 && dp[idx] == dp[idx - width] + 1 {
            measures.deletions += 1;
            i -= 1;
        } else {
            measures.insertions += 1;
            j -= 1;
        }
    }

    Ok(measures)
}

/// Word-level alignment of two raw transcripts after normalization.
pub fn word_measures(
    reference: &str,
    hypothesis: &str,
    options: &NormalizeOptions,
) -> Result<Measures, ScoreError> {
    let reference = text::normalize(reference, options);
    let hypothesis = text::normalize(hypothesis, options);
    align(&text::words(&reference), &text::words(&hypothesis))
}

/// Character-level alignment of two raw transcripts after normalization.
/// Single separating spaces count as characters, so word boundaries matter.
pub fn char_measures(
    reference: &str,
    hypothesis: &str,
    options: &NormalizeOptions,
) -> Result<Measures, ScoreError> {
    let reference = text::normalize(reference, options);
    let hypothesis = text::normalize(hypothesis, options);
    align(&text::chars(&reference), &text::chars(&hypothesis))
}

/// Word error rate with default normalization.
pub fn wer(reference: &str, hypothesis: &str) -> Result<f64, ScoreError> {
    word_measures(reference, hypothesis, &NormalizeOptions::default()).map(|m| m.error_rate())
}

/// Match error rate with default normalization.
pub fn mer(reference: &str, hypothesis: &str) -> Result<f64, ScoreError> {
    word_measures(reference, hypothesis, &NormalizeOptions::default())
        .map(|m| m.match_error_rate())
}

/// Character error rate with default normalization.
pub fn cer(reference: &str, hypothesis: &str) -> Result<f64, ScoreError> {
    char_measures(reference, hypothesis, &NormalizeOptions::default()).map(|m| m.error_rate())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(reference: &[&str], hypothesis: &[&str]) -> Measures {
        align(reference, hypothesis).unwrap()
    }

    #[test]
    fn identity_alignment_is_all_matches() {
        let tokens = ["she", "had", "your", "dark", "suit"];
        let measures = score(&tokens, &tokens);
        assert_eq!(measures.matches, 5);
        assert_eq!(measures.total_edits(), 0);
        assert_eq!(measures.error_rate(), 0.0);
        assert_eq!(measures.match_error_rate(), 0.0);
    }

    #[test]
    fn single_substitution() {
        let measures = score(&["a", "b", "c"], &["a", "x", "c"]);
        assert_eq!(measures.substitutions, 1);
        assert_eq!(measures.deletions, 0);
        assert_eq!(measures.insertions, 0);
        assert_eq!(measures.matches, 2);
        assert!((measures.error_rate() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn single_deletion() {
        let measures = score(&["a", "b", "c"], &["a", "b"]);
        assert_eq!(measures.deletions, 1);
        assert_eq!(measures.substitutions, 0);
        assert_eq!(measures.matches, 2);
        assert!((measures.error_rate() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn single_insertion() {
        let measures = score(&["a", "c"], &["a", "b", "c"]);
        assert_eq!(measures.insertions, 1);
        assert_eq!(measures.matches, 2);
        assert!((measures.error_rate() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn count_invariants_hold() {
        let reference = ["the", "quick", "brown", "fox", "jumps"];
        let hypothesis = ["the", "quack", "fox", "jumped", "high"];
        let measures = score(&reference, &hypothesis);
        assert_eq!(measures.reference_len(), reference.len());
        assert_eq!(measures.hypothesis_len(), hypothesis.len());
    }

    #[test]
    fn total_edits_are_symmetric() {
        let a = ["a", "b", "c", "d"];
        let b = ["b", "c", "e"];
        assert_eq!(score(&a, &b).total_edits(), score(&b, &a).total_edits());
    }

    #[test]
    fn empty_reference_counts_insertions() {
        let measures = score(&[], &["a", "b"]);
        assert_eq!(measures.insertions, 2);
        assert_eq!(measures.error_rate(), 2.0);
        assert_eq!(measures.match_error_rate(), 1.0);
    }

    #[test]
    fn both_empty_is_zero() {
        let measures = score(&[], &[]);
        assert_eq!(measures, Measures::default());
        assert_eq!(measures.error_rate(), 0.0);
        assert_eq!(measures.match_error_rate(), 0.0);
    }

    #[test]
    fn empty_hypothesis_is_all_deletions() {
        let measures = score(&["a", "b", "c"], &[]);
        assert_eq!(measures.deletions, 3);
        assert_eq!(measures.error_rate(), 1.0);
        assert_eq!(measures.match_error_rate(), 1.0);
    }

    #[test]
    fn swapped_tokens_resolve_as_substitutions() {
        // "ab" vs "ba" has several minimum-cost alignments; the fixed
        // tie-break order settles on two substitutions.
        let measures = score(&["a", "b"], &["b", "a"]);
        assert_eq!(measures.substitutions, 2);
        assert_eq!(measures.deletions, 0);
        assert_eq!(measures.insertions, 0);
        assert_eq!(measures.total_edits(), 2);
    }

    #[test]
    fn breakdown_is_deterministic() {
        let reference = ["a", "b", "c", "a", "b"];
        let hypothesis = ["b", "a", "c", "b"];
        let first = score(&reference, &hypothesis);
        for _ in 0..10 {
            assert_eq!(score(&reference, &hypothesis), first);
        }
    }

    #[test]
    fn char_tokens_reuse_the_same_alignment() {
        let reference: Vec<char> = "abc".chars().collect();
        let hypothesis: Vec<char> = "abd".chars().collect();
        let measures = align(&reference, &hypothesis).unwrap();
        assert_eq!(measures.substitutions, 1);
        assert!((measures.error_rate() - 1.0 / 3.0).abs() < 1e-12);
    }
}
