use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, ValueEnum};
#[cfg(feature = "parakeet")]
use stt_bench::engines::parakeet::{
    ParakeetEngine, ParakeetInferenceParams, ParakeetModelParams,
};
use stt_bench::{
    bench::{self, AccuracyReport},
    engines::whisper::{WhisperEngine, WhisperInferenceParams, WhisperModelParams},
    streaming::StreamTranscriber,
    text::{CaseFold, NormalizeOptions},
    TranscriptionEngine, TranscriptionResult,
};

#[derive(Parser, Debug)]
#[command(
    about = "Benchmark a speech-to-text engine on one audio sample",
    version
)]
struct Args {
    /// Which engine to benchmark
    #[arg(long, value_enum, default_value_t = EngineChoice::Whisper)]
    engine: EngineChoice,

    /// Path to the model file (Whisper) or directory (Parakeet)
    #[arg(long)]
    model_path: PathBuf,

    /// WAV file to transcribe (16kHz, 16-bit, mono PCM)
    #[arg(long)]
    audio: PathBuf,

    /// Reference transcript to score the output against
    #[arg(long, conflicts_with = "reference_file")]
    reference: Option<String>,

    /// File containing the reference transcript
    #[arg(long)]
    reference_file: Option<PathBuf>,

    /// Optional forced language code passed to Whisper (e.g. "en")
    #[arg(long)]
    language: Option<String>,

    /// Parakeet quantization
    #[cfg(feature = "parakeet")]
    #[arg(long, value_enum, default_value_t = QuantizationChoice::Int8)]
    quantization: QuantizationChoice,

    /// Feed the audio through the engine in fixed-size streaming chunks
    #[arg(long)]
    streaming: bool,

    /// Chunk size in samples for streaming mode (4000 = 250ms at 16kHz)
    #[arg(long, default_value_t = 4000)]
    chunk_samples: usize,

    /// Compare case-sensitively when scoring
    #[arg(long)]
    keep_case: bool,

    /// Keep punctuation when scoring
    #[arg(long)]
    keep_punctuation: bool,

    /// Emit the report as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum EngineChoice {
    Whisper,
    #[cfg(feature = "parakeet")]
    Parakeet,
}

#[cfg(feature = "parakeet")]
#[derive(Copy, Clone, Debug, ValueEnum)]
enum QuantizationChoice {
    Fp32,
    Int8,
}

#[cfg(feature = "parakeet")]
impl QuantizationChoice {
    fn model_params(self) -> ParakeetModelParams {
        match self {
            QuantizationChoice::Fp32 => ParakeetModelParams::fp32(),
            QuantizationChoice::Int8 => ParakeetModelParams::int8(),
        }
    }
}

enum EngineWrapper {
    Whisper(WhisperEngine),
    #[cfg(feature = "parakeet")]
    Parakeet(ParakeetEngine),
}

impl EngineWrapper {
    fn create(choice: EngineChoice) -> Self {
        match choice {
            EngineChoice::Whisper => EngineWrapper::Whisper(WhisperEngine::new()),
            #[cfg(feature = "parakeet")]
            EngineChoice::Parakeet => EngineWrapper::Parakeet(ParakeetEngine::new()),
        }
    }

    fn load_model(&mut self, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
        match self {
            EngineWrapper::Whisper(engine) => engine.load_model(&args.model_path),
            #[cfg(feature = "parakeet")]
            EngineWrapper::Parakeet(engine) => {
                engine.load_model_with_params(&args.model_path, args.quantization.model_params())
            }
        }
    }
}

impl StreamTranscriber for EngineWrapper {
    fn transcribe(
        &mut self,
        samples: Vec<f32>,
        language: Option<&str>,
    ) -> Result<TranscriptionResult, Box<dyn std::error::Error>> {
        match self {
            EngineWrapper::Whisper(engine) => {
                let mut params = WhisperInferenceParams::default();
                if let Some(code) = language {
                    params.language = Some(code.to_string());
                }
                engine.transcribe_samples(samples, Some(params))
            }
            #[cfg(feature = "parakeet")]
            EngineWrapper::Parakeet(engine) => {
                engine.transcribe_samples(samples, Some(ParakeetInferenceParams::default()))
            }
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let reference = load_reference(&args)?;
    let normalize = NormalizeOptions {
        case_fold: if args.keep_case {
            CaseFold::Preserve
        } else {
            CaseFold::Lower
        },
        strip_punctuation: !args.keep_punctuation,
    };

    if args.streaming {
        run_streaming(&args, reference.as_deref(), &normalize)
    } else {
        run_batch(&args, reference.as_deref(), &normalize)
    }
}

fn run_batch(
    args: &Args,
    reference: Option<&str>,
    normalize: &NormalizeOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut report = match args.engine {
        EngineChoice::Whisper => {
            let mut engine = WhisperEngine::new();
            let inference = args.language.clone().map(|code| WhisperInferenceParams {
                language: Some(code),
                ..Default::default()
            });
            bench::run_benchmark(
                &mut engine,
                &args.model_path,
                WhisperModelParams::default(),
                inference,
                &args.audio,
            )?
        }
        #[cfg(feature = "parakeet")]
        EngineChoice::Parakeet => {
            let mut engine = ParakeetEngine::new();
            bench::run_benchmark(
                &mut engine,
                &args.model_path,
                args.quantization.model_params(),
                None,
                &args.audio,
            )?
        }
    };

    if let Some(reference) = reference {
        report.accuracy = Some(bench::score_transcript(
            reference,
            &report.transcript,
            normalize,
        )?);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Transcription: {}", report.transcript);
    println!(
        "Time Taken: {:.2} seconds (load {:.2}s, transcribe {:.2}s)",
        report.load_seconds + report.transcribe_seconds,
        report.load_seconds,
        report.transcribe_seconds
    );
    println!("Real-time Speedup: {:.2}x", report.speedup);
    println!("Model Size: {:.2} MB", report.model_size_mb);
    println!("Model RAM Size: {:.2} MB", report.model_ram_mb);
    println!("Total Memory Used: {:.2} MB", report.total_memory_mb);
    print_accuracy(report.accuracy.as_ref());
    Ok(())
}

fn run_streaming(
    args: &Args,
    reference: Option<&str>,
    normalize: &NormalizeOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = EngineWrapper::create(args.engine);

    let load_start = Instant::now();
    engine.load_model(args)?;
    log::info!("model loaded in {:.2?}", load_start.elapsed());

    let mut report = bench::run_streaming_benchmark(
        engine,
        args.language.clone(),
        &args.audio,
        args.chunk_samples,
    )?;

    if let Some(reference) = reference {
        report.accuracy = Some(bench::score_transcript(
            reference,
            &report.transcript,
            normalize,
        )?);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Transcription: {}", report.transcript);
    println!(
        "Chunks: {} ({} transcript updates)",
        report.chunks, report.updates
    );
    println!(
        "Time Taken: {:.2} seconds for {:.2} seconds of audio",
        report.total_seconds, report.audio_seconds
    );
    println!(
        "Chunk Latency: mean {:.3}s, max {:.3}s",
        report.mean_chunk_seconds, report.max_chunk_seconds
    );
    print_accuracy(report.accuracy.as_ref());
    Ok(())
}

fn load_reference(args: &Args) -> Result<Option<String>, Box<dyn std::error::Error>> {
    if let Some(text) = &args.reference {
        return Ok(Some(text.clone()));
    }
    if let Some(path) = &args.reference_file {
        return Ok(Some(fs::read_to_string(path)?.trim().to_string()));
    }
    Ok(None)
}

fn print_accuracy(accuracy: Option<&AccuracyReport>) {
    let Some(accuracy) = accuracy else {
        return;
    };
    println!(
        "WER: {:.3} MER: {:.3} CER: {:.3}",
        accuracy.wer, accuracy.mer, accuracy.cer
    );
    println!(
        "Substitutions: {} Deletions: {} Insertions: {} Matches: {}",
        accuracy.substitutions, accuracy.deletions, accuracy.insertions, accuracy.matches
    );
}
