//! Transcript normalization and tokenization.
//!
//! Engines disagree about casing and punctuation ("Hello, world!" vs
//! "hello world"), so both sides of a comparison are pushed through the same
//! normalization before scoring. The scorer itself compares tokens by exact
//! equality and applies no normalization of its own.

use once_cell::sync::Lazy;
use regex::Regex;

/// Everything that is not a letter, digit, whitespace, or apostrophe.
/// Apostrophes survive so contractions ("it's") stay one word.
static PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\p{L}\p{N}\s']+").unwrap());

/// How letter case is handled before comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseFold {
    /// Lowercase both sides (default; transcription casing is arbitrary).
    #[default]
    Lower,
    /// Compare case-sensitively.
    Preserve,
}

/// Normalization applied to both transcripts before tokenization.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    pub case_fold: CaseFold,
    pub strip_punctuation: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            case_fold: CaseFold::Lower,
            strip_punctuation: true,
        }
    }
}

/// Normalize a transcript: optional case fold, optional punctuation
/// stripping, whitespace collapsed to single spaces.
pub fn normalize(text: &str, options: &NormalizeOptions) -> String {
    let folded = match options.case_fold {
        CaseFold::Lower => text.to_lowercase(),
        CaseFold::Preserve => text.to_string(),
    };

    let stripped = if options.strip_punctuation {
        PUNCTUATION.replace_all(&folded, " ").into_owned()
    } else {
        folded
    };

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split an already-normalized transcript into word tokens.
pub fn words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Split an already-normalized transcript into character tokens.
///
/// The single separating spaces left by [`normalize`] are kept, so word
/// boundaries still count toward character error rate.
pub fn chars(text: &str) -> Vec<char> {
    text.chars().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation_and_lowercases() {
        let options = NormalizeOptions::default();
        assert_eq!(normalize("Hello, World!", &options), "hello world");
        assert_eq!(
            normalize("Hello,  World!  How  Are You?", &options),
            "hello world how are you"
        );
    }

    #[test]
    fn keeps_apostrophes_inside_words() {
        let options = NormalizeOptions::default();
        assert_eq!(normalize("it's  OK.", &options), "it's ok");
    }

    #[test]
    fn preserve_case_keeps_casing() {
        let options = NormalizeOptions {
            case_fold: CaseFold::Preserve,
            strip_punctuation: true,
        };
        assert_eq!(normalize("Hello, World!", &options), "Hello World");
    }

    #[test]
    fn punctuation_can_be_kept() {
        let options = NormalizeOptions {
            case_fold: CaseFold::Lower,
            strip_punctuation: false,
        };
        assert_eq!(normalize("Hello, World!", &options), "hello, world!");
    }

    #[test]
    fn non_ascii_letters_survive() {
        let options = NormalizeOptions::default();
        assert_eq!(normalize("Österreich: 25°C!", &options), "österreich 25 c");
    }

    #[test]
    fn tokenizers_split_words_and_chars() {
        assert_eq!(words("she had your"), vec!["she", "had", "your"]);
        assert!(words("").is_empty());
        assert_eq!(chars("ab c"), vec!['a', 'b', ' ', 'c']);
    }
}
