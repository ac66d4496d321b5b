//! Word-level phoneme inference and sentence combination.
//!
//! Each word is tokenized (language id, every mapped character three times,
//! end id), zero-padded to `max_seq_len`, and run through the phoneme model.
//! The model's per-frame class distributions are decoded by arg-max; per-word
//! results are memoized in a concurrent cache, then combined into one
//! sentence-level sequence with separator insertion, duplicate removal, and
//! boundary interleaving.
//!
//! The control constants are part of the paired model's training contract
//! and cannot be changed without retraining:
//! * the character repetition factor 3 matches the model's temporal
//!   resolution,
//! * class 0 means "no emission" and is dropped during decoding,
//! * class 3 ends decoding and doubles as the boundary marker interleaved
//!   into the combined sequence,
//! * id 2 separates words and is exempt from duplicate removal.

use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use dashmap::DashMap;
use ort::{session::Session, value::Tensor};

use crate::config::PipelineConfig;
use crate::error::{Result, TtsError};
use crate::vocab::Vocab;

/// Word separator inserted between per-word sequences.
pub const SEPARATOR_ID: i64 = 2;

/// Boundary marker: ends decoding and brackets every combined element.
pub const BOUNDARY_ID: i64 = 3;

// ─────────────────────────────────────────────────────────────────────────────
// Model seam
// ─────────────────────────────────────────────────────────────────────────────

/// Per-frame class scores produced by one phoneme model invocation,
/// row-major `[frames, classes]` with the batch dimension already stripped.
#[derive(Debug, Clone)]
pub struct ScoredFrames {
    pub frames: usize,
    pub classes: usize,
    pub scores: Vec<f32>,
}

impl ScoredFrames {
    pub fn row(&self, frame: usize) -> &[f32] {
        &self.scores[frame * self.classes..(frame + 1) * self.classes]
    }
}

/// The phoneme inference engine, behind a trait so tests can count calls
/// and feed synthetic score frames.
pub trait PhonemeModel: Send + Sync {
    /// Run the model on one zero-padded token sequence.
    fn run(&self, input: &[i64]) -> Result<ScoredFrames>;
}

/// ONNX-backed phoneme model. Owns its session exclusively; the session is
/// released when the value drops, on success and error paths alike.
pub struct OrtPhonemeModel {
    session: Mutex<Session>,
}

impl OrtPhonemeModel {
    pub fn load(path: &Path) -> Result<Self> {
        let session = Session::builder()
            .map_err(TtsError::PhonemizerInit)?
            .commit_from_file(path)
            .map_err(TtsError::PhonemizerInit)?;
        Ok(Self { session: Mutex::new(session) })
    }
}

impl PhonemeModel for OrtPhonemeModel {
    fn run(&self, input: &[i64]) -> Result<ScoredFrames> {
        let tensor = Tensor::<i64>::from_array(([1usize, input.len()], input.to_vec()))?;

        let mut session = self.session.lock().expect("ORT session mutex poisoned");
        let outputs = session.run(ort::inputs!["input" => tensor])?;

        // Output contract: one float tensor [1, frames, classes].
        let (shape, scores) = outputs[0].try_extract_tensor::<f32>()?;
        if shape.len() != 3 || shape[0] != 1 {
            return Err(TtsError::Output(format!(
                "phoneme model returned shape {shape:?}, expected [1, frames, classes]"
            )));
        }
        Ok(ScoredFrames {
            frames: shape[1] as usize,
            classes: shape[2] as usize,
            scores: scores.to_vec(),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Decoding and combination
// ─────────────────────────────────────────────────────────────────────────────

/// Index of the first maximal score (ties resolve to the earliest class).
fn argmax(row: &[f32]) -> usize {
    let mut best = 0;
    for (i, &score) in row.iter().enumerate().skip(1) {
        if score > row[best] {
            best = i;
        }
    }
    best
}

/// Decode score frames to phoneme ids.
///
/// Frame 0 is skipped, decoding stops at the first frame whose arg-max is
/// the boundary class, and "no emission" frames (arg-max 0) are dropped.
fn decode_frames(frames: &ScoredFrames) -> Vec<i64> {
    let mut decoded = Vec::new();
    for frame in 1..frames.frames {
        let class = argmax(frames.row(frame));
        if class as i64 == BOUNDARY_ID {
            break;
        }
        if class != 0 {
            decoded.push(class as i64);
        }
    }
    decoded
}

/// Join per-word sequences with separators, drop consecutive duplicates
/// (separators are always kept), and bracket every element with boundary
/// ids: `3, x1, 3, x2, 3, …, xn, 3`.
fn combine_word_outputs(word_outputs: &[Vec<i64>]) -> Vec<i64> {
    let mut combined = Vec::new();
    for (i, output) in word_outputs.iter().enumerate() {
        if i > 0 {
            combined.push(SEPARATOR_ID);
        }
        combined.extend_from_slice(output);
    }

    let mut deduped: Vec<i64> = Vec::with_capacity(combined.len());
    for id in combined {
        if deduped.last() != Some(&id) || id == SEPARATOR_ID {
            deduped.push(id);
        }
    }

    let mut wrapped = Vec::with_capacity(deduped.len() * 2 + 1);
    wrapped.push(BOUNDARY_ID);
    for id in deduped {
        wrapped.push(id);
        wrapped.push(BOUNDARY_ID);
    }
    wrapped
}

// ─────────────────────────────────────────────────────────────────────────────
// Phonemizer
// ─────────────────────────────────────────────────────────────────────────────

pub struct Phonemizer {
    model: Box<dyn PhonemeModel>,
    vocab: Arc<Vocab>,
    /// Word → decoded phoneme sequence. Pure memoization: a hit is
    /// byte-identical to fresh inference. Grows with observed vocabulary;
    /// never invalidated. A lost insert race costs one duplicate inference,
    /// nothing else.
    cache: DashMap<String, Vec<i64>>,
    max_seq_len: usize,
    lowercase: bool,
    language_id: i64,
    end_id: i64,
}

impl Phonemizer {
    pub fn new(
        model: Box<dyn PhonemeModel>,
        vocab: Arc<Vocab>,
        config: &PipelineConfig,
    ) -> Result<Self> {
        let language_id = vocab.token_id(&config.language_code_en).ok_or_else(|| {
            TtsError::Config(format!(
                "language_code_en {:?} not in vocabulary",
                config.language_code_en
            ))
        })?;
        let end_id = vocab.token_id(&config.end_token).ok_or_else(|| {
            TtsError::Config(format!("end_token {:?} not in vocabulary", config.end_token))
        })?;
        Ok(Self {
            model,
            vocab,
            cache: DashMap::new(),
            max_seq_len: config.max_seq_len,
            lowercase: config.lowercase,
            language_id,
            end_id,
        })
    }

    /// Tokenize one word: language id, each mapped character's id three
    /// times, end id. Characters outside the vocabulary are skipped.
    pub fn tokenize(&self, word: &str) -> Vec<i64> {
        let word = if self.lowercase { word.to_lowercase() } else { word.to_string() };

        let mut tokens = vec![self.language_id];
        for ch in word.chars() {
            if let Some(id) = self.vocab.char_id(ch) {
                tokens.extend([id; 3]);
            }
        }
        tokens.push(self.end_id);
        tokens
    }

    /// Phoneme sequence for one word, memoized by the raw word string.
    pub fn infer_word(&self, word: &str) -> Result<Vec<i64>> {
        if let Some(hit) = self.cache.get(word) {
            return Ok(hit.clone());
        }
        let decoded = self.run_inference(word)?;
        self.cache.insert(word.to_string(), decoded.clone());
        Ok(decoded)
    }

    fn run_inference(&self, word: &str) -> Result<Vec<i64>> {
        let mut input = self.tokenize(word);
        input.truncate(self.max_seq_len);
        input.resize(self.max_seq_len, 0);

        let frames = self.model.run(&input).map_err(|e| TtsError::PhonemizerInference {
            word: word.to_string(),
            source: Box::new(e),
        })?;
        Ok(decode_frames(&frames))
    }

    /// Sentence-level phoneme sequence: per-word inference, separator
    /// insertion, duplicate removal, boundary interleaving. A failed word
    /// aborts the whole sentence.
    pub fn infer(&self, sentence: &str) -> Result<Vec<i64>> {
        let mut word_outputs = Vec::new();
        for word in sentence.split_whitespace() {
            word_outputs.push(self.infer_word(word)?);
        }
        Ok(combine_word_outputs(&word_outputs))
    }

    /// Number of distinct words inferred so far.
    pub fn cached_words(&self) -> usize {
        self.cache.len()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
