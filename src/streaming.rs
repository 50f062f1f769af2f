use serde::Serialize;
use std::error::Error;

use crate::{TranscriptionResult, TranscriptionSegment};

/// Transcript segment carried by a streaming update.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct StreamSegment {
    pub start: f32,
    pub end: f32,
    pub text: String,
}

impl From<&TranscriptionSegment> for StreamSegment {
    fn from(value: &TranscriptionSegment) -> Self {
        Self {
            start: value.start,
            end: value.end,
            text: value.text.clone(),
        }
    }
}

/// Incremental transcript emitted while audio is still arriving.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TranscriptUpdate {
    pub text: String,
    pub segments: Vec<StreamSegment>,
}

/// Minimal interface the streaming session needs from an engine.
pub trait StreamTranscriber {
    /// Generate a transcript for the provided audio samples.
    fn transcribe(
        &mut self,
        samples: Vec<f32>,
        language: Option<&str>,
    ) -> Result<TranscriptionResult, Box<dyn Error>>;
}

/// Stateful helper that aggregates audio chunks and produces transcript
/// updates as recognition results change.
///
/// The buffered audio grows with every chunk and the whole buffer is
/// re-transcribed each time, so the transcript may be revised as more
/// context arrives. An update is only emitted when the text or segments
/// actually changed.
pub struct StreamingSession<T: StreamTranscriber> {
    transcriber: T,
    language: Option<String>,
    samples: Vec<f32>,
    last_text: String,
    last_segments: Vec<StreamSegment>,
}

impl<T: StreamTranscriber> StreamingSession<T> {
    /// Create a new session around the provided transcriber implementation.
    pub fn new(transcriber: T, language: Option<String>) -> Self {
        Self {
            transcriber,
            language,
            samples: Vec::new(),
            last_text: String::new(),
            last_segments: Vec::new(),
        }
    }

    /// Append a chunk of audio and re-transcribe the accumulated buffer.
    ///
    /// Returns `Ok(Some(update))` when the transcript changed,
    /// `Ok(None)` for empty chunks or unchanged transcripts. Transcription
    /// failures propagate as errors.
    pub fn push_chunk(
        &mut self,
        chunk: &[f32],
    ) -> Result<Option<TranscriptUpdate>, Box<dyn Error>> {
        if chunk.is_empty() {
            return Ok(None);
        }
        self.samples.extend_from_slice(chunk);

        let result = self
            .transcriber
            .transcribe(self.samples.clone(), self.language.as_deref())?;

        let segments: Vec<StreamSegment> =
            result.segments.iter().map(StreamSegment::from).collect();

        if result.text != self.last_text || segments != self.last_segments {
            self.last_text = result.text.clone();
            self.last_segments = segments.clone();
            Ok(Some(TranscriptUpdate {
                text: result.text,
                segments,
            }))
        } else {
            Ok(None)
        }
    }

    /// Most recent transcript regardless of change tracking, or `None` when
    /// nothing has been recognized yet.
    pub fn flush(&self) -> Option<TranscriptUpdate> {
        if self.last_text.is_empty() && self.last_segments.is_empty() {
            return None;
        }
        Some(TranscriptUpdate {
            text: self.last_text.clone(),
            segments: self.last_segments.clone(),
        })
    }

    /// Clear accumulated samples and recognition state.
    pub fn reset(&mut self) {
        self.samples.clear();
        self.last_text.clear();
        self.last_segments.clear();
    }

    /// Returns the currently buffered samples, primarily for inspection in tests.
    pub fn buffered_samples(&self) -> &[f32] {
        &self.samples
    }
}
