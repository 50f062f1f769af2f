//! Audio input for the benchmark harness.
//!
//! Every benchmarked engine consumes the same sample format, so WAV decoding
//! lives here rather than in any engine.

use std::path::Path;

const SAMPLE_RATE: u32 = 16_000;
const BITS_PER_SAMPLE: u16 = 16;

/// Read a WAV file into the sample format the engines expect.
///
/// # Returns
///
/// A vector of f32 samples normalized to the range [-1.0, 1.0].
///
/// # Errors
///
/// Fails when the file cannot be opened or read, or when its format is not
/// 16kHz, 16-bit, mono, integer PCM. No resampling or channel mixing is
/// attempted: benchmark inputs are fixed files prepared in the right format,
/// and silently converting them would skew timing results.
///
/// # Examples
///
/// ```rust,no_run
/// use stt_bench::audio::read_wav_samples;
/// use std::path::Path;
///
/// let samples = read_wav_samples(Path::new("samples/harvard.wav"))?;
/// println!("Loaded {} samples", samples.len());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn read_wav_samples(wav_path: &Path) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
    let mut reader = hound::WavReader::open(wav_path)?;
    let spec = reader.spec();

    if spec.channels != 1 {
        return Err(format!("Expected mono audio, found {} channels", spec.channels).into());
    }
    if spec.sample_rate != SAMPLE_RATE {
        return Err(format!(
            "Expected {} Hz sample rate, found {} Hz",
            SAMPLE_RATE, spec.sample_rate
        )
        .into());
    }
    if spec.bits_per_sample != BITS_PER_SAMPLE {
        return Err(format!(
            "Expected {} bits per sample, found {}",
            BITS_PER_SAMPLE, spec.bits_per_sample
        )
        .into());
    }
    if spec.sample_format != hound::SampleFormat::Int {
        return Err(format!("Expected Int sample format, found {:?}", spec.sample_format).into());
    }

    let samples: Result<Vec<f32>, _> = reader
        .samples::<i16>()
        .map(|sample| sample.map(|s| s as f32 / i16::MAX as f32))
        .collect();

    Ok(samples?)
}

/// Duration of a WAV file in seconds, used for real-time-factor reporting.
pub fn duration_seconds(wav_path: &Path) -> Result<f64, Box<dyn std::error::Error>> {
    let reader = hound::WavReader::open(wav_path)?;
    let spec = reader.spec();
    Ok(reader.duration() as f64 / spec.sample_rate as f64)
}
