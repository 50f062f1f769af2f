use ndarray::{Array, Array1, Array2, Array3, ArrayD, ArrayViewD, IxDyn};
use ort::execution_providers::CPUExecutionProvider;
use ort::inputs;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::TensorRef;
use regex::Regex;

use std::fs;
use std::path::Path;

/// Decoder LSTM state carried across decode steps.
pub type DecoderState = (Array3<f32>, Array3<f32>);

// Encoder frames are 10ms feature windows subsampled 8x.
const SUBSAMPLING_FACTOR: usize = 8;
const WINDOW_SIZE: f32 = 0.01;

/// Raw recognition output: the detokenized text plus per-token start times.
#[derive(Debug, Clone, Default)]
pub struct TimestampedResult {
    pub text: String,
    pub timestamps: Vec<f32>,
    pub tokens: Vec<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum ParakeetError {
    #[error("onnx runtime error: {0}")]
    Ort(#[from] ort::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("tensor shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
    #[error("malformed vocabulary: {0}")]
    Vocab(String),
    #[error("model output `{0}` missing")]
    MissingOutput(&'static str),
}

/// The three ONNX sessions of a Parakeet model directory plus its
/// vocabulary, with greedy transducer decoding on top.
pub struct ParakeetModel {
    encoder: Session,
    decoder_joint: Session,
    preprocessor: Session,
    vocab: Vec<String>,
    blank_idx: i32,
    vocab_size: usize,
    max_tokens_per_step: usize,
    detokenize_pattern: Regex,
}

impl ParakeetModel {
    /// Open a model directory, selecting the Int8 or FP32 graph files.
    pub fn new<P: AsRef<Path>>(model_dir: P, quantized: bool) -> Result<Self, ParakeetError> {
        let model_dir = model_dir.as_ref();
        let suffix = if quantized { ".int8.onnx" } else { ".onnx" };

        let encoder = Self::init_session(model_dir, &format!("encoder-model{suffix}"))?;
        let decoder_joint = Self::init_session(model_dir, &format!("decoder_joint-model{suffix}"))?;
        let preprocessor = Self::init_session(model_dir, "nemo128.onnx")?;

        let (vocab, blank_idx) = Self::load_vocab(model_dir)?;
        let vocab_size = vocab.len();
        log::info!(
            "loaded vocabulary with {} tokens, blank_idx={}",
            vocab_size,
            blank_idx
        );

        Ok(Self {
            encoder,
            decoder_joint,
            preprocessor,
            vocab,
            blank_idx,
            vocab_size,
            max_tokens_per_step: 10,
            detokenize_pattern: Regex::new(r"\A\s|\s\B|(\s)\b").expect("static pattern"),
        })
    }

    fn init_session(model_dir: &Path, file_name: &str) -> Result<Session, ParakeetError> {
        log::info!("loading onnx session from {}...", file_name);
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_execution_providers(vec![CPUExecutionProvider::default().build()])?
            .with_parallel_execution(true)?
            .with_intra_threads(4)?
            .with_inter_threads(4)?
            .commit_from_file(model_dir.join(file_name))?;

        for input in &session.inputs {
            log::debug!(
                "{} input: name={}, type={:?}",
                file_name,
                input.name,
                input.input_type
            );
        }

        Ok(session)
    }

    fn load_vocab(model_dir: &Path) -> Result<(Vec<String>, i32), ParakeetError> {
        let content = fs::read_to_string(model_dir.join("vocab.txt"))?;

        let mut max_id = 0usize;
        let mut tokens_with_ids: Vec<(String, usize)> = Vec::new();
        let mut blank_idx: Option<usize> = None;

        for line in content.lines() {
            let mut parts = line.split(' ');
            let (Some(token), Some(id)) = (parts.next(), parts.next()) else {
                continue;
            };
            let Ok(id) = id.parse::<usize>() else {
                continue;
            };
            if token == "<blk>" {
                blank_idx = Some(id);
            }
            max_id = max_id.max(id);
            tokens_with_ids.push((token.to_string(), id));
        }

        // SentencePiece marks word starts with \u{2581}; map it to a space.
        let mut vocab = vec![String::new(); max_id + 1];
        for (token, id) in tokens_with_ids {
            vocab[id] = token.replace('\u{2581}', " ");
        }

        let blank_idx = blank_idx
            .ok_or_else(|| ParakeetError::Vocab("missing <blk> token".to_string()))?
            as i32;

        Ok((vocab, blank_idx))
    }

    fn preprocess(
        &mut self,
        waveforms: &ArrayViewD<f32>,
        waveforms_lens: &ArrayViewD<i64>,
    ) -> Result<(ArrayD<f32>, ArrayD<i64>), ParakeetError> {
        log::trace!("running preprocessor inference...");
        let inputs = inputs![
            "waveforms" => TensorRef::from_array_view(waveforms.view())?,
            "waveforms_lens" => TensorRef::from_array_view(waveforms_lens.view())?,
        ];
        let outputs = self.preprocessor.run(inputs)?;

        let features = outputs
            .get("features")
            .ok_or(ParakeetError::MissingOutput("features"))?
            .try_extract_array()?;
        let features_lens = outputs
            .get("features_lens")
            .ok_or(ParakeetError::MissingOutput("features_lens"))?
            .try_extract_array()?;

        Ok((features.to_owned(), features_lens.to_owned()))
    }

    fn encode(
        &mut self,
        audio_signal: &ArrayViewD<f32>,
        length: &ArrayViewD<i64>,
    ) -> Result<(ArrayD<f32>, ArrayD<i64>), ParakeetError> {
        log::trace!("running encoder inference...");
        let inputs = inputs![
            "audio_signal" => TensorRef::from_array_view(audio_signal.view())?,
            "length" => TensorRef::from_array_view(length.view())?,
        ];
        let outputs = self.encoder.run(inputs)?;

        let encoder_output = outputs
            .get("outputs")
            .ok_or(ParakeetError::MissingOutput("outputs"))?
            .try_extract_array()?;
        let encoded_lengths = outputs
            .get("encoded_lengths")
            .ok_or(ParakeetError::MissingOutput("encoded_lengths"))?
            .try_extract_array()?;

        // [batch, features, time] -> [batch, time, features]
        let encoder_output = encoder_output.permuted_axes(IxDyn(&[0, 2, 1]));

        Ok((encoder_output.to_owned(), encoded_lengths.to_owned()))
    }

    fn create_decoder_state(&self) -> Result<DecoderState, ParakeetError> {
        let state_dim = |input_name: &'static str| -> Result<(usize, usize), ParakeetError> {
            let shape = self
                .decoder_joint
                .inputs
                .iter()
                .find(|input| input.name == input_name)
                .ok_or(ParakeetError::MissingOutput(input_name))?
                .input_type
                .tensor_shape()
                .ok_or(ParakeetError::MissingOutput(input_name))?;
            Ok((shape[0] as usize, shape[2] as usize))
        };

        // Declared shapes are [layers, -1, hidden]; batch size is 1 here.
        let (layers1, hidden1) = state_dim("input_states_1")?;
        let (layers2, hidden2) = state_dim("input_states_2")?;

        Ok((
            Array::zeros((layers1, 1, hidden1)),
            Array::zeros((layers2, 1, hidden2)),
        ))
    }

    fn decode_step(
        &mut self,
        prev_tokens: &[i32],
        prev_state: DecoderState,
        encoder_step: &ArrayViewD<f32>,
    ) -> Result<(ArrayD<f32>, DecoderState), ParakeetError> {
        log::trace!("running decoder inference...");

        let target_token = prev_tokens.last().copied().unwrap_or(self.blank_idx);

        // encoder_step [features] -> [1, features, 1]
        let encoder_outputs = encoder_step
            .to_owned()
            .insert_axis(ndarray::Axis(0))
            .insert_axis(ndarray::Axis(2));
        let targets = Array2::from_shape_vec((1, 1), vec![target_token])?;
        let target_length = Array1::from_vec(vec![1i32]);

        let inputs = inputs![
            "encoder_outputs" => TensorRef::from_array_view(encoder_outputs.view())?,
            "targets" => TensorRef::from_array_view(targets.view())?,
            "target_length" => TensorRef::from_array_view(target_length.view())?,
            "input_states_1" => TensorRef::from_array_view(prev_state.0.view())?,
            "input_states_2" => TensorRef::from_array_view(prev_state.1.view())?,
        ];

        let outputs = self.decoder_joint.run(inputs)?;

        let logits = outputs
            .get("outputs")
            .ok_or(ParakeetError::MissingOutput("outputs"))?
            .try_extract_array()?;
        let state1 = outputs
            .get("output_states_1")
            .ok_or(ParakeetError::MissingOutput("output_states_1"))?
            .try_extract_array()?;
        let state2 = outputs
            .get("output_states_2")
            .ok_or(ParakeetError::MissingOutput("output_states_2"))?
            .try_extract_array()?;

        let logits = logits.remove_axis(ndarray::Axis(0));
        let state1 = state1.to_owned().into_dimensionality::<ndarray::Ix3>()?;
        let state2 = state2.to_owned().into_dimensionality::<ndarray::Ix3>()?;

        Ok((logits.to_owned(), (state1, state2)))
    }

    fn decode_sequence(
        &mut self,
        encodings: &ArrayViewD<f32>,
        encodings_len: usize,
    ) -> Result<(Vec<i32>, Vec<usize>), ParakeetError> {
        let mut prev_state = self.create_decoder_state()?;
        let mut tokens: Vec<i32> = Vec::new();
        let mut timestamps: Vec<usize> = Vec::new();

        let mut t = 0;
        let mut emitted_at_step = 0;

        while t < encodings_len {
            let encoder_step = encodings.slice(ndarray::s![t, ..]).to_owned().into_dyn();
            let (logits, new_state) =
                self.decode_step(&tokens, prev_state.clone(), &encoder_step.view())?;

            let logits = logits
                .as_slice()
                .ok_or(ParakeetError::MissingOutput("outputs"))?;
            // TDT graphs append duration logits after the vocabulary block;
            // greedy decoding only looks at the vocabulary part.
            let vocab_logits = if logits.len() > self.vocab_size {
                &logits[..self.vocab_size]
            } else {
                logits
            };

            let token = vocab_logits
                .iter()
                .enumerate()
                .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
                .map(|(idx, _)| idx as i32)
                .unwrap_or(self.blank_idx);

            if token != self.blank_idx {
                prev_state = new_state;
                tokens.push(token);
                timestamps.push(t);
                emitted_at_step += 1;
            }

            // Advance on blank, or when the per-frame emission cap is hit.
            if token == self.blank_idx || emitted_at_step == self.max_tokens_per_step {
                t += 1;
                emitted_at_step = 0;
            }
        }

        Ok((tokens, timestamps))
    }

    fn detokenize(&self, ids: Vec<i32>, timestamps: Vec<usize>) -> TimestampedResult {
        let tokens: Vec<String> = ids
            .iter()
            .filter_map(|&id| self.vocab.get(id as usize).cloned())
            .collect();

        let text = self
            .detokenize_pattern
            .replace_all(&tokens.join(""), |caps: &regex::Captures| {
                if caps.get(1).is_some() {
                    " "
                } else {
                    ""
                }
            })
            .to_string();

        let frame_seconds = WINDOW_SIZE * SUBSAMPLING_FACTOR as f32;
        let timestamps = timestamps
            .iter()
            .map(|&t| frame_seconds * t as f32)
            .collect();

        TimestampedResult {
            text,
            timestamps,
            tokens,
        }
    }

    /// Run recognition over one buffer of 16kHz mono samples.
    pub fn transcribe_samples(
        &mut self,
        samples: Vec<f32>,
    ) -> Result<TimestampedResult, ParakeetError> {
        let samples_len = samples.len();
        let waveforms = Array2::from_shape_vec((1, samples_len), samples)?.into_dyn();
        let waveforms_lens = Array1::from_vec(vec![samples_len as i64]).into_dyn();

        let (features, features_lens) =
            self.preprocess(&waveforms.view(), &waveforms_lens.view())?;
        let (encoder_out, encoder_out_lens) =
            self.encode(&features.view(), &features_lens.view())?;

        let mut results = Vec::new();
        for (encodings, &encodings_len) in encoder_out.outer_iter().zip(encoder_out_lens.iter()) {
            let encodings = encodings.to_owned().into_dyn();
            let (tokens, timestamps) =
                self.decode_sequence(&encodings.view(), encodings_len as usize)?;
            results.push(self.detokenize(tokens, timestamps));
        }

        Ok(results.into_iter().next().unwrap_or_default())
    }
}
