//! Measurement harness: wall-clock timing, process memory deltas, model
//! size on disk, and accuracy reports for a single engine/audio/reference
//! combination.

use std::error::Error;
use std::fs;
use std::io;
use std::path::Path;
use std::time::Instant;

use serde::Serialize;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::accuracy::{self, ScoreError};
use crate::streaming::{StreamTranscriber, StreamingSession};
use crate::text::NormalizeOptions;
use crate::{audio, TranscriptionEngine};

/// Process-RSS sampler with a construction-time baseline.
///
/// Resident set size is a coarse signal (the allocator rarely returns pages
/// to the OS), but deltas across model load and inference are exactly what
/// the benchmark reports.
pub struct MemoryProbe {
    system: System,
    pid: Pid,
    baseline_bytes: u64,
}

impl MemoryProbe {
    pub fn new() -> Self {
        let mut system = System::new_all();
        let pid = Pid::from_u32(std::process::id());
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]), false);
        let baseline_bytes = system.process(pid).map(|p| p.memory()).unwrap_or(0);
        Self {
            system,
            pid,
            baseline_bytes,
        }
    }

    /// Current resident set size of this process in bytes.
    pub fn rss_bytes(&mut self) -> u64 {
        self.system
            .refresh_processes(ProcessesToUpdate::Some(&[self.pid]), false);
        self.system
            .process(self.pid)
            .map(|p| p.memory())
            .unwrap_or(0)
    }

    /// RSS growth since the probe was created, in megabytes.
    pub fn delta_mb(&mut self) -> f64 {
        let rss = self.rss_bytes();
        bytes_to_mb(rss.saturating_sub(self.baseline_bytes))
    }
}

impl Default for MemoryProbe {
    fn default() -> Self {
        Self::new()
    }
}

pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

/// On-disk size of a model: the file's length, or the summed length of
/// every file under a model directory (parakeet models are directories).
pub fn model_size_bytes(path: &Path) -> io::Result<u64> {
    let metadata = fs::metadata(path)?;
    if metadata.is_file() {
        return Ok(metadata.len());
    }
    let mut total = 0u64;
    for entry in fs::read_dir(path)? {
        total += model_size_bytes(&entry?.path())?;
    }
    Ok(total)
}

/// Accuracy of one hypothesis transcript against a reference.
///
/// `wer`, `mer`, and the S/D/I/M counts come from the word-level alignment;
/// `cer` from a separate character-level alignment of the same strings.
#[derive(Debug, Clone, Serialize)]
pub struct AccuracyReport {
    pub wer: f64,
    pub mer: f64,
    pub cer: f64,
    pub substitutions: usize,
    pub deletions: usize,
    pub insertions: usize,
    pub matches: usize,
}

/// Score a transcript against a reference with the given normalization.
pub fn score_transcript(
    reference: &str,
    hypothesis: &str,
    options: &NormalizeOptions,
) -> Result<AccuracyReport, ScoreError> {
    let words = accuracy::word_measures(reference, hypothesis, options)?;
    let chars = accuracy::char_measures(reference, hypothesis, options)?;
    Ok(AccuracyReport {
        wer: words.error_rate(),
        mer: words.match_error_rate(),
        cer: chars.error_rate(),
        substitutions: words.substitutions,
        deletions: words.deletions,
        insertions: words.insertions,
        matches: words.matches,
    })
}

/// Everything one batch benchmark run produced.
#[derive(Debug, Serialize)]
pub struct BenchmarkReport {
    pub engine: String,
    pub transcript: String,
    pub audio_seconds: f64,
    pub load_seconds: f64,
    pub transcribe_seconds: f64,
    /// Real-time speedup: audio duration over transcription time.
    pub speedup: f64,
    pub model_size_mb: f64,
    /// RSS growth across model load.
    pub model_ram_mb: f64,
    /// RSS growth across the whole run (load + transcription).
    pub total_memory_mb: f64,
    pub accuracy: Option<AccuracyReport>,
}

/// Load a model and transcribe one audio file, measuring as we go.
///
/// Scoring is left to the caller (see [`score_transcript`]): the reference
/// transcript is hand-supplied and not every benchmark run has one.
pub fn run_benchmark<E: TranscriptionEngine>(
    engine: &mut E,
    model_path: &Path,
    model_params: E::ModelParams,
    inference_params: Option<E::InferenceParams>,
    wav_path: &Path,
) -> Result<BenchmarkReport, Box<dyn Error>> {
    let audio_seconds = audio::duration_seconds(wav_path)?;
    let model_size_mb = bytes_to_mb(model_size_bytes(model_path)?);
    let mut probe = MemoryProbe::new();

    log::info!(
        "loading {} model from {}",
        engine.name(),
        model_path.display()
    );
    let load_start = Instant::now();
    engine.load_model_with_params(model_path, model_params)?;
    let load_seconds = load_start.elapsed().as_secs_f64();
    let model_ram_mb = probe.delta_mb();

    log::info!("transcribing {}", wav_path.display());
    let transcribe_start = Instant::now();
    let result = engine.transcribe_file(wav_path, inference_params)?;
    let transcribe_seconds = transcribe_start.elapsed().as_secs_f64();
    let total_memory_mb = probe.delta_mb();

    let speedup = if transcribe_seconds > 0.0 {
        audio_seconds / transcribe_seconds
    } else {
        0.0
    };

    Ok(BenchmarkReport {
        engine: engine.name().to_string(),
        transcript: result.text,
        audio_seconds,
        load_seconds,
        transcribe_seconds,
        speedup,
        model_size_mb,
        model_ram_mb,
        total_memory_mb,
        accuracy: None,
    })
}

/// Everything one streaming benchmark run produced.
#[derive(Debug, Serialize)]
pub struct StreamingReport {
    pub transcript: String,
    pub chunks: usize,
    /// How many chunks changed the transcript.
    pub updates: usize,
    pub audio_seconds: f64,
    pub total_seconds: f64,
    pub mean_chunk_seconds: f64,
    pub max_chunk_seconds: f64,
    pub accuracy: Option<AccuracyReport>,
}

/// Feed a WAV file through a streaming session in fixed-size chunks,
/// timing each chunk. The model must already be loaded.
pub fn run_streaming_benchmark<T: StreamTranscriber>(
    transcriber: T,
    language: Option<String>,
    wav_path: &Path,
    chunk_samples: usize,
) -> Result<StreamingReport, Box<dyn Error>> {
    if chunk_samples == 0 {
        return Err("chunk size must be at least one sample".into());
    }

    let samples = audio::read_wav_samples(wav_path)?;
    let audio_seconds = audio::duration_seconds(wav_path)?;
    let mut session = StreamingSession::new(transcriber, language);

    let mut chunks = 0usize;
    let mut updates = 0usize;
    let mut max_chunk_seconds = 0.0f64;
    let start = Instant::now();

    for chunk in samples.chunks(chunk_samples) {
        let chunk_start = Instant::now();
        if session.push_chunk(chunk)?.is_some() {
            updates += 1;
        }
        max_chunk_seconds = max_chunk_seconds.max(chunk_start.elapsed().as_secs_f64());
        chunks += 1;
    }

    let total_seconds = start.elapsed().as_secs_f64();
    let transcript = session.flush().map(|update| update.text).unwrap_or_default();
    let mean_chunk_seconds = if chunks == 0 {
        0.0
    } else {
        total_seconds / chunks as f64
    };

    log::info!(
        "streamed {} chunks ({} transcript updates) in {:.2}s",
        chunks,
        updates,
        total_seconds
    );

    Ok(StreamingReport {
        transcript,
        chunks,
        updates,
        audio_seconds,
        total_seconds,
        mean_chunk_seconds,
        max_chunk_seconds,
        accuracy: None,
    })
}
