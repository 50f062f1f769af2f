//! The speech recognition engines under benchmark.
//!
//! Two engine classes are wired up, matching the two model packaging styles
//! the harness measures:
//!
//! ## Whisper Engine
//!
//! OpenAI's Whisper family via `whisper-rs`, the large neural transcription
//! model:
//! - **Model Format**: single GGML file (`.bin`)
//! - **Models**: tiny through large variants, quantized or not
//! - **Example**: `whisper-medium-q4_1.bin`
//!
//! ## Parakeet Engine
//!
//! NVIDIA NeMo Parakeet via ONNX Runtime, the lightweight embedded
//! recognizer (feature `parakeet`):
//! - **Model Format**: directory of ONNX files plus vocabulary
//! - **Quantization**: FP32 or Int8, selected at load time
//! - **Example**: `parakeet-v0.3/` directory
//!
//! Either engine can additionally be driven in streaming mode through
//! [`crate::streaming::StreamingSession`], which is how the harness
//! benchmarks streaming recognition.

#[cfg(feature = "parakeet")]
pub mod parakeet;
pub mod whisper;
