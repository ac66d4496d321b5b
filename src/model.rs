//! VITS vocoder runner.
//!
//! Uses [`ort`] (ONNX Runtime Rust bindings) for inference.
//! The four model inputs are:
//!
//! | Name            | Shape    | dtype   |
//! |-----------------|----------|---------|
//! | `input`         | `[1, N]` | int64   |
//! | `input_lengths` | `[1]`    | int64   |
//! | `scales`        | `[3]`    | float32 |
//! | `sid`           | `[1]`    | int64   |
//!
//! The single output is the waveform, float32 `[1, 1, samples]`; the first
//! batch element's only channel is returned as-is — the pipeline never
//! resamples.

use std::{path::Path, sync::Mutex};

use ort::{session::Session, value::Tensor};

use crate::error::{Result, TtsError};

/// The vocoder inference engine, behind a trait so tests can synthesize
/// deterministic waveforms without a model file.
pub trait VocoderModel: Send + Sync {
    fn run(&self, ids: &[i64], scales: [f32; 3], sid: i64) -> Result<Vec<f32>>;
}

/// ONNX-backed vocoder. Owns its session exclusively; dropped once on
/// shutdown regardless of exit path.
pub struct OrtVocoderModel {
    session: Mutex<Session>,
}

impl OrtVocoderModel {
    pub fn load(path: &Path) -> Result<Self> {
        let session = Session::builder()
            .map_err(TtsError::SynthesizerInit)?
            .commit_from_file(path)
            .map_err(TtsError::SynthesizerInit)?;
        Ok(Self { session: Mutex::new(session) })
    }
}

impl VocoderModel for OrtVocoderModel {
    fn run(&self, ids: &[i64], scales: [f32; 3], sid: i64) -> Result<Vec<f32>> {
        let n = ids.len();
        let t_input = Tensor::<i64>::from_array(([1usize, n], ids.to_vec()))?;
        let t_lengths = Tensor::<i64>::from_array(([1usize], vec![n as i64]))?;
        let t_scales = Tensor::<f32>::from_array(([3usize], scales.to_vec()))?;
        let t_sid = Tensor::<i64>::from_array(([1usize], vec![sid]))?;

        let mut session = self.session.lock().expect("ORT session mutex poisoned");
        let outputs = session.run(ort::inputs![
            "input" => t_input,
            "input_lengths" => t_lengths,
            "scales" => t_scales,
            "sid" => t_sid
        ])?;

        // Output contract: float tensor [1, 1, samples].
        let (shape, samples) = outputs[0].try_extract_tensor::<f32>()?;
        if shape.len() != 3 || shape[0] != 1 || shape[1] != 1 {
            return Err(TtsError::Output(format!(
                "vocoder returned shape {shape:?}, expected [1, 1, samples]"
            )));
        }
        Ok(samples.to_vec())
    }
}

/// One-chunk synthesizer: id sequence in, waveform out.
pub struct Synthesizer {
    model: Box<dyn VocoderModel>,
    scales: [f32; 3],
    sample_rate: u32,
}

impl Synthesizer {
    pub fn new(model: Box<dyn VocoderModel>, scales: [f32; 3], sample_rate: u32) -> Self {
        Self { model, scales, sample_rate }
    }

    /// Sample rate of every waveform this synthesizer produces.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Synthesize one chunk from a prepared id sequence and a model-facing
    /// speaker embedding index. Engine errors propagate as
    /// [`TtsError::Synthesis`]; there is no retry.
    pub fn synthesize(&self, ids: &[i64], sid: i64) -> Result<Vec<f32>> {
        self.model
            .run(ids, self.scales, sid)
            .map_err(|e| TtsError::Synthesis(Box::new(e)))
    }
}
