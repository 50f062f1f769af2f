use std::error::Error;
use std::fs;
use std::path::Path;

use stt_bench::bench::{
    bytes_to_mb, model_size_bytes, run_streaming_benchmark, score_transcript,
};
use stt_bench::streaming::StreamTranscriber;
use stt_bench::text::NormalizeOptions;
use stt_bench::TranscriptionResult;

/// Returns a scripted transcript per call, holding the last one afterwards.
struct ScriptedTranscriber {
    responses: Vec<&'static str>,
    calls: usize,
}

impl ScriptedTranscriber {
    fn new(responses: Vec<&'static str>) -> Self {
        Self { responses, calls: 0 }
    }
}

impl StreamTranscriber for ScriptedTranscriber {
    fn transcribe(
        &mut self,
        _samples: Vec<f32>,
        _language: Option<&str>,
    ) -> Result<TranscriptionResult, Box<dyn Error>> {
        let index = self.calls.min(self.responses.len().saturating_sub(1));
        self.calls += 1;
        Ok(TranscriptionResult {
            text: self.responses.get(index).unwrap_or(&"").to_string(),
            segments: Vec::new(),
        })
    }
}

fn write_silence_wav(path: &Path, samples: usize) -> Result<(), Box<dyn Error>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for _ in 0..samples {
        writer.write_sample(0i16)?;
    }
    writer.finalize()?;
    Ok(())
}

#[test]
fn model_size_of_a_single_file() -> Result<(), Box<dyn Error>> {
    let temp_dir = tempfile::tempdir()?;
    let model = temp_dir.path().join("model.bin");
    fs::write(&model, vec![0u8; 2048])?;

    assert_eq!(model_size_bytes(&model)?, 2048);
    Ok(())
}

#[test]
fn model_size_sums_a_directory_recursively() -> Result<(), Box<dyn Error>> {
    let temp_dir = tempfile::tempdir()?;
    let model_dir = temp_dir.path().join("parakeet-v0.3");
    fs::create_dir_all(model_dir.join("extras"))?;
    fs::write(model_dir.join("encoder-model.int8.onnx"), vec![0u8; 1000])?;
    fs::write(model_dir.join("vocab.txt"), vec![0u8; 24])?;
    fs::write(model_dir.join("extras").join("config.json"), vec![0u8; 76])?;

    assert_eq!(model_size_bytes(&model_dir)?, 1100);
    Ok(())
}

#[test]
fn megabyte_conversion() {
    assert_eq!(bytes_to_mb(0), 0.0);
    assert_eq!(bytes_to_mb(1024 * 1024), 1.0);
    assert!((bytes_to_mb(1536 * 1024) - 1.5).abs() < 1e-12);
}

#[test]
fn score_transcript_reports_all_metrics() -> Result<(), Box<dyn Error>> {
    let report = score_transcript(
        "the cat sat",
        "The cat sat on!",
        &NormalizeOptions::default(),
    )?;

    assert_eq!(report.insertions, 1);
    assert_eq!(report.substitutions, 0);
    assert_eq!(report.deletions, 0);
    assert_eq!(report.matches, 3);
    assert!((report.wer - 1.0 / 3.0).abs() < 1e-12);
    assert!((report.mer - 0.25).abs() < 1e-12);
    assert!(report.cer > 0.0);
    Ok(())
}

#[test]
fn streaming_benchmark_chunks_and_scores() -> Result<(), Box<dyn Error>> {
    let temp_dir = tempfile::tempdir()?;
    let wav_path = temp_dir.path().join("half_second.wav");
    write_silence_wav(&wav_path, 8000)?;

    let transcriber = ScriptedTranscriber::new(vec!["she had", "she had your dark suit"]);
    let mut report = run_streaming_benchmark(transcriber, None, &wav_path, 4000)?;

    assert_eq!(report.chunks, 2);
    assert_eq!(report.updates, 2);
    assert_eq!(report.transcript, "she had your dark suit");
    assert!((report.audio_seconds - 0.5).abs() < 1e-9);
    assert!(report.total_seconds >= 0.0);
    assert!(report.max_chunk_seconds >= 0.0);

    report.accuracy = Some(score_transcript(
        "she had your dark suit",
        &report.transcript,
        &NormalizeOptions::default(),
    )?);
    assert_eq!(report.accuracy.as_ref().unwrap().wer, 0.0);
    Ok(())
}

#[test]
fn streaming_benchmark_counts_updates_not_chunks() -> Result<(), Box<dyn Error>> {
    let temp_dir = tempfile::tempdir()?;
    let wav_path = temp_dir.path().join("short.wav");
    write_silence_wav(&wav_path, 12000)?;

    // Transcript settles after the first chunk.
    let transcriber = ScriptedTranscriber::new(vec!["done"]);
    let report = run_streaming_benchmark(transcriber, None, &wav_path, 4000)?;

    assert_eq!(report.chunks, 3);
    assert_eq!(report.updates, 1);
    assert_eq!(report.transcript, "done");
    Ok(())
}

#[test]
fn zero_chunk_size_is_rejected() -> Result<(), Box<dyn Error>> {
    let temp_dir = tempfile::tempdir()?;
    let wav_path = temp_dir.path().join("any.wav");
    write_silence_wav(&wav_path, 100)?;

    let transcriber = ScriptedTranscriber::new(vec!["x"]);
    let err = run_streaming_benchmark(transcriber, None, &wav_path, 0)
        .expect_err("zero-sample chunks make no progress");
    assert!(err.to_string().contains("chunk size"));
    Ok(())
}
