//! Parakeet (NeMo) speech recognition engine.
//!
//! The lightweight embedded recognizer in the benchmark lineup: an ONNX
//! model directory run through `ort` on CPU, with Int8 quantization
//! available for the embedded-scale configuration.
//!
//! # Model Format
//!
//! A Parakeet model is a directory, typically structured like:
//! ```text
//! parakeet-v0.3/
//! ├── encoder-model.onnx            # Encoder (FP32)
//! ├── encoder-model.int8.onnx       # Encoder (Int8 quantized)
//! ├── decoder_joint-model.onnx      # Decoder/joint (FP32)
//! ├── decoder_joint-model.int8.onnx # Decoder/joint (Int8 quantized)
//! ├── nemo128.onnx                  # Audio preprocessor
//! └── vocab.txt                     # Vocabulary
//! ```
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::path::Path;
//! use stt_bench::{TranscriptionEngine, engines::parakeet::{ParakeetEngine, ParakeetModelParams}};
//!
//! let mut engine = ParakeetEngine::new();
//! engine.load_model_with_params(
//!     Path::new("models/parakeet-v0.3"),
//!     ParakeetModelParams::int8(),
//! )?;
//! let result = engine.transcribe_file(Path::new("samples/harvard.wav"), None)?;
//! println!("{}", result.text);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::path::{Path, PathBuf};

use super::model::ParakeetModel;
use super::timestamps::{convert_timestamps, TimestampGranularity};
use crate::{TranscriptionEngine, TranscriptionResult};

/// Precision/performance trade-off for the loaded model.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum QuantizationType {
    /// Full precision (32-bit floating point, default).
    #[default]
    FP32,
    /// 8-bit integer quantization (faster, slightly lower accuracy).
    Int8,
}

/// Parameters for Parakeet model loading.
#[derive(Debug, Clone, Default)]
pub struct ParakeetModelParams {
    pub quantization: QuantizationType,
}

impl ParakeetModelParams {
    pub fn fp32() -> Self {
        Self {
            quantization: QuantizationType::FP32,
        }
    }

    pub fn int8() -> Self {
        Self {
            quantization: QuantizationType::Int8,
        }
    }
}

/// Parameters for Parakeet inference behavior.
#[derive(Debug, Clone, Default)]
pub struct ParakeetInferenceParams {
    pub timestamp_granularity: TimestampGranularity,
}

pub struct ParakeetEngine {
    loaded_model_path: Option<PathBuf>,
    model: Option<ParakeetModel>,
}

impl ParakeetEngine {
    pub fn new() -> Self {
        Self {
            loaded_model_path: None,
            model: None,
        }
    }
}

impl Default for ParakeetEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ParakeetEngine {
    fn drop(&mut self) {
        self.unload_model();
    }
}

impl TranscriptionEngine for ParakeetEngine {
    type ModelParams = ParakeetModelParams;
    type InferenceParams = ParakeetInferenceParams;

    fn name(&self) -> &'static str {
        "parakeet"
    }

    fn load_model_with_params(
        &mut self,
        model_path: &Path,
        params: Self::ModelParams,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let quantized = params.quantization == QuantizationType::Int8;
        let model = ParakeetModel::new(model_path, quantized)?;

        self.model = Some(model);
        self.loaded_model_path = Some(model_path.to_path_buf());
        Ok(())
    }

    fn unload_model(&mut self) {
        self.loaded_model_path = None;
        self.model = None;
    }

    fn transcribe_samples(
        &mut self,
        samples: Vec<f32>,
        params: Option<Self::InferenceParams>,
    ) -> Result<TranscriptionResult, Box<dyn std::error::Error>> {
        let model = self
            .model
            .as_mut()
            .ok_or("Model not loaded. Call load_model() first.")?;

        let parakeet_params = params.unwrap_or_default();

        let timestamped = model.transcribe_samples(samples)?;
        let segments = convert_timestamps(&timestamped, parakeet_params.timestamp_granularity);

        Ok(TranscriptionResult {
            text: timestamped.text.trim().to_string(),
            segments,
        })
    }
}
