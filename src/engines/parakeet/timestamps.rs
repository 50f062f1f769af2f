use super::model::TimestampedResult;
use crate::TranscriptionSegment;

/// Granularity of the segments produced from token-level timestamps.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TimestampGranularity {
    /// One segment per emitted token (most detailed, default).
    #[default]
    Token,
    /// Tokens grouped into words at SentencePiece word boundaries.
    Word,
    /// A single segment spanning the whole utterance.
    Segment,
}

/// Convert a timestamped recognition result into transcript segments.
///
/// Each token's end time is the next token's start; the final token gets a
/// zero-length segment since the model reports starts only.
pub fn convert_timestamps(
    result: &TimestampedResult,
    granularity: TimestampGranularity,
) -> Vec<TranscriptionSegment> {
    match granularity {
        TimestampGranularity::Token => token_segments(result),
        TimestampGranularity::Word => word_segments(result),
        TimestampGranularity::Segment => utterance_segment(result),
    }
}

fn token_segments(result: &TimestampedResult) -> Vec<TranscriptionSegment> {
    result
        .tokens
        .iter()
        .zip(result.timestamps.iter())
        .enumerate()
        .map(|(i, (token, &start))| {
            let end = result.timestamps.get(i + 1).copied().unwrap_or(start);
            TranscriptionSegment {
                start,
                end,
                text: token.clone(),
            }
        })
        .collect()
}

fn word_segments(result: &TimestampedResult) -> Vec<TranscriptionSegment> {
    let mut segments = Vec::new();
    let mut word = String::new();
    let mut word_start = 0.0f32;
    let mut word_end = 0.0f32;

    for (i, (token, &start)) in result
        .tokens
        .iter()
        .zip(result.timestamps.iter())
        .enumerate()
    {
        // Word-initial tokens carry the leading space mapped from \u{2581}.
        if token.starts_with(' ') {
            flush_word(&mut segments, &mut word, word_start, word_end);
        }
        if word.is_empty() {
            word_start = start;
        }
        word.push_str(token);
        word_end = result.timestamps.get(i + 1).copied().unwrap_or(start);
    }
    flush_word(&mut segments, &mut word, word_start, word_end);

    segments
}

fn flush_word(segments: &mut Vec<TranscriptionSegment>, word: &mut String, start: f32, end: f32) {
    let trimmed = word.trim();
    if !trimmed.is_empty() {
        segments.push(TranscriptionSegment {
            start,
            end,
            text: trimmed.to_string(),
        });
    }
    word.clear();
}

fn utterance_segment(result: &TimestampedResult) -> Vec<TranscriptionSegment> {
    if result.tokens.is_empty() {
        return Vec::new();
    }
    let start = result.timestamps.first().copied().unwrap_or(0.0);
    let end = result.timestamps.last().copied().unwrap_or(start);
    vec![TranscriptionSegment {
        start,
        end,
        text: result.text.trim().to_string(),
    }]
}
