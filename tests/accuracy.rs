use stt_bench::accuracy::{cer, mer, wer, word_measures};
use stt_bench::text::{CaseFold, NormalizeOptions};

const HARVARD_REFERENCE: &str = "she had your dark suit in greasy wash water all year";

#[test]
fn perfect_transcript_scores_zero() {
    let hypothesis = "She had your dark suit in greasy wash water all year.";
    assert_eq!(wer(HARVARD_REFERENCE, hypothesis).unwrap(), 0.0);
    assert_eq!(mer(HARVARD_REFERENCE, hypothesis).unwrap(), 0.0);
    assert_eq!(cer(HARVARD_REFERENCE, hypothesis).unwrap(), 0.0);
}

#[test]
fn one_substituted_word() {
    let measures = word_measures("a b c", "a x c", &NormalizeOptions::default()).unwrap();
    assert_eq!(measures.substitutions, 1);
    assert_eq!(measures.insertions, 0);
    assert_eq!(measures.deletions, 0);
    assert_eq!(measures.matches, 2);
    assert!((measures.error_rate() - 1.0 / 3.0).abs() < 1e-12);
}

#[test]
fn one_dropped_word() {
    let measures = word_measures("a b c", "a b", &NormalizeOptions::default()).unwrap();
    assert_eq!(measures.deletions, 1);
    assert_eq!(measures.substitutions, 0);
    assert_eq!(measures.matches, 2);
    assert!((measures.error_rate() - 1.0 / 3.0).abs() < 1e-12);
}

#[test]
fn count_invariants_hold_for_raw_transcripts() {
    let reference = "the stale smell of old beer lingers";
    let hypothesis = "the stale smells of beer linger today";
    let measures = word_measures(reference, hypothesis, &NormalizeOptions::default()).unwrap();
    assert_eq!(measures.reference_len(), 7);
    assert_eq!(measures.hypothesis_len(), 7);
}

#[test]
fn total_edit_count_is_symmetric_but_wer_is_not() {
    let a = "it takes heat to bring out the odor";
    let b = "it takes heat to bring the odor out quickly";
    let forward = word_measures(a, b, &NormalizeOptions::default()).unwrap();
    let backward = word_measures(b, a, &NormalizeOptions::default()).unwrap();
    assert_eq!(forward.total_edits(), backward.total_edits());
    // Different reference lengths, so the normalized rates differ.
    assert!(forward.error_rate() > backward.error_rate());
}

#[test]
fn empty_reference_boundary_policy() {
    let options = NormalizeOptions::default();
    let empty_vs_empty = word_measures("", "", &options).unwrap();
    assert_eq!(empty_vs_empty.error_rate(), 0.0);

    let empty_vs_two = word_measures("", "a b", &options).unwrap();
    assert_eq!(empty_vs_two.insertions, 2);
    assert_eq!(empty_vs_two.error_rate(), 2.0);
    assert_eq!(empty_vs_two.match_error_rate(), 1.0);
}

#[test]
fn mer_stays_bounded_when_hypothesis_is_longer() {
    let reference = "one two";
    let hypothesis = "one two three four five six";
    assert!(wer(reference, hypothesis).unwrap() > 1.0);
    let mer = mer(reference, hypothesis).unwrap();
    assert!(mer > 0.0 && mer <= 1.0);
}

#[test]
fn default_normalization_ignores_case_and_punctuation() {
    assert_eq!(wer("Hello World", "hello world").unwrap(), 0.0);
    assert_eq!(wer("Hello, world!", "hello world").unwrap(), 0.0);
}

#[test]
fn preserved_punctuation_counts_as_a_difference() {
    let options = NormalizeOptions {
        case_fold: CaseFold::Lower,
        strip_punctuation: false,
    };
    let measures = word_measures("hello, world", "hello world", &options).unwrap();
    assert_eq!(measures.substitutions, 1);
    assert!((measures.error_rate() - 0.5).abs() < 1e-12);
}

#[test]
fn preserved_case_counts_as_a_difference() {
    let options = NormalizeOptions {
        case_fold: CaseFold::Preserve,
        strip_punctuation: true,
    };
    let measures = word_measures("Hello world", "hello world", &options).unwrap();
    assert_eq!(measures.substitutions, 1);
}

#[test]
fn cer_is_character_level() {
    assert!((cer("abc", "abd").unwrap() - 1.0 / 3.0).abs() < 1e-12);
    // Word boundaries count: "ab c" and "abc" differ by the space.
    assert!(cer("ab c", "abc").unwrap() > 0.0);
}

#[test]
fn repeated_scoring_is_deterministic() {
    let reference = "a b c a b";
    let hypothesis = "b a c b";
    let first = word_measures(reference, hypothesis, &NormalizeOptions::default()).unwrap();
    for _ in 0..5 {
        let again = word_measures(reference, hypothesis, &NormalizeOptions::default()).unwrap();
        assert_eq!(again, first);
    }
}
