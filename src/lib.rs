//! Benchmarking toolkit for pre-built speech-to-text engines.
//!
//! This crate runs fixed audio samples through existing transcription
//! engines and reports what the run cost: wall-clock time for model load and
//! inference, process memory deltas, model size on disk, and accuracy
//! against a hand-supplied reference transcript.
//!
//! Accuracy is computed by the crate's own alignment-based scorer (see
//! [`accuracy`]): word error rate, match error rate, and character error
//! rate, all derived from a single edit-distance alignment with the full
//! substitution/deletion/insertion/match breakdown.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use stt_bench::{bench, engines::whisper::{WhisperEngine, WhisperModelParams}};
//!
//! let mut engine = WhisperEngine::new();
//! let mut report = bench::run_benchmark(
//!     &mut engine,
//!     Path::new("models/whisper-medium-q4_1.bin"),
//!     WhisperModelParams::default(),
//!     None,
//!     Path::new("samples/harvard.wav"),
//! )?;
//! report.accuracy = Some(bench::score_transcript(
//!     "she had your dark suit in greasy wash water all year",
//!     &report.transcript,
//!     &Default::default(),
//! )?);
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod accuracy;
pub mod audio;
pub mod bench;
pub mod engines;
pub mod streaming;
pub mod text;

use std::path::Path;

#[derive(Debug, Clone)]
pub struct TranscriptionResult {
    pub text: String,
    pub segments: Vec<TranscriptionSegment>,
}

#[derive(Debug, Clone)]
pub struct TranscriptionSegment {
    pub start: f32,
    pub end: f32,
    pub text: String,
}

/// Common surface for the benchmarked engines.
///
/// Engines differ in how models are packaged (a single GGML file for
/// whisper, an ONNX directory for parakeet) and which knobs their runtimes
/// expose, so load-time and inference parameters are associated types.
pub trait TranscriptionEngine {
    type ModelParams: Default;
    type InferenceParams;

    /// Short engine label used in benchmark reports.
    fn name(&self) -> &'static str;

    /// Load a model with default parameters.
    fn load_model(&mut self, model_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        self.load_model_with_params(model_path, Self::ModelParams::default())
    }

    fn load_model_with_params(
        &mut self,
        model_path: &Path,
        params: Self::ModelParams,
    ) -> Result<(), Box<dyn std::error::Error>>;

    fn unload_model(&mut self);

    fn transcribe_samples(
        &mut self,
        samples: Vec<f32>,
        params: Option<Self::InferenceParams>,
    ) -> Result<TranscriptionResult, Box<dyn std::error::Error>>;

    fn transcribe_file(
        &mut self,
        wav_path: &Path,
        params: Option<Self::InferenceParams>,
    ) -> Result<TranscriptionResult, Box<dyn std::error::Error>> {
        let samples = audio::read_wav_samples(wav_path)?;
        self.transcribe_samples(samples, params)
    }
}
